//! French (constant-payment) amortisation schedule with prepayments.
//!
//! Each period accrues interest on the balance, applies the scheduled
//! principal, applies any prepayment returned by the policy, and optionally
//! recasts the payment over the remaining term. The loop stops as soon as the
//! balance is extinguished.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::time_value::{annuity_payment, monthly_rate, RateConvention};
use crate::types::*;
use crate::MortgageResult;

use super::policy::{PrepaymentPolicy, PrepaymentRule};

/// Balances at or below this are treated as fully repaid.
pub const DEFAULT_BALANCE_EPSILON: Decimal = dec!(0.01);

/// Longest accepted term: 100 years of monthly periods.
pub const MAX_PERIODS: u32 = 1200;

/// Immutable loan contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Annual rate in percent (6 = 6%).
    pub annual_rate_pct: Decimal,
    /// Term in months.
    pub total_periods: u32,
    /// Date of disbursement; period `p` falls due `p` months later.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// When in the period a prepayment is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepaymentTiming {
    /// After the scheduled principal: the policy sees, and is clamped to, the
    /// balance left once the regular payment has been applied.
    #[default]
    EndOfPeriod,
    /// Before interest accrues: the policy sees, and is clamped to, the
    /// opening balance, and the period's interest is charged on what remains.
    StartOfPeriod,
}

/// Engine switches. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rate_convention: RateConvention,
    /// Recast the payment over the remaining term after each prepayment
    /// (term preserved, payment drops). When false the payment stays fixed and
    /// the term shortens.
    pub recompute_on_prepayment: bool,
    pub prepayment_timing: PrepaymentTiming,
    pub balance_epsilon: Money,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rate_convention: RateConvention::Effective,
            recompute_on_prepayment: true,
            prepayment_timing: PrepaymentTiming::EndOfPeriod,
            balance_epsilon: DEFAULT_BALANCE_EPSILON,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> MortgageResult<()> {
        if self.balance_epsilon < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "config.balance_epsilon",
                "Balance epsilon cannot be negative",
            ));
        }
        Ok(())
    }
}

/// One row of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// 1-based period number.
    pub period: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub opening_balance: Money,
    /// Regular payment actually due this period (interest + principal).
    pub scheduled_payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub prepayment: Money,
    /// `scheduled_payment + prepayment`
    pub total_payment: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
}

/// Full schedule plus aggregate metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub periods: Vec<PeriodRecord>,
    pub periodic_rate: Rate,
    /// Payment at origination, before any recast.
    pub initial_payment: Money,
    pub total_interest: Money,
    /// Scheduled principal plus prepayments.
    pub total_principal_paid: Money,
    pub total_prepaid: Money,
    pub final_period_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
}

impl ScheduleResult {
    /// Balance after `period` periods; the original principal for period 0 and
    /// zero once the schedule has ended.
    pub fn balance_after(&self, period: u32, principal: Money) -> Money {
        if period == 0 {
            return principal;
        }
        self.periods
            .get(period as usize - 1)
            .map(|p| p.ending_balance)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Input for a single schedule run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub terms: LoanTerms,
    #[serde(default)]
    pub policy: PrepaymentPolicy,
    #[serde(default)]
    pub config: EngineConfig,
}

/// Validate, run the schedule, and wrap it in the standard envelope.
pub fn generate_schedule(
    input: &ScheduleInput,
) -> MortgageResult<ComputationOutput<ScheduleResult>> {
    let start = Instant::now();
    validate_terms(&input.terms)?;
    input.policy.validate()?;
    input.config.validate()?;

    let mut warnings = Vec::new();
    let result = run_schedule(&input.terms, &input.config, &input.policy, &mut warnings);

    if !input.policy.is_none() && result.total_prepaid.is_zero() {
        warnings.push("Prepayment policy never fired within the loan term".into());
    }

    let methodology = match (input.config.recompute_on_prepayment, input.policy.is_none()) {
        (_, true) => "French amortisation (constant payment)",
        (true, false) => "French amortisation with prepayments, payment recast over remaining term",
        (false, false) => "French amortisation with prepayments, fixed payment and shortened term",
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, result))
}

/// Run the schedule for any prepayment rule, including closures.
///
/// Inputs are assumed valid; degenerate terms (non-positive principal or zero
/// periods) produce an empty schedule.
pub fn amortize<R: PrepaymentRule + ?Sized>(
    terms: &LoanTerms,
    config: &EngineConfig,
    rule: &R,
) -> ScheduleResult {
    run_schedule(terms, config, rule, &mut Vec::new())
}

pub(crate) fn run_schedule<R: PrepaymentRule + ?Sized>(
    terms: &LoanTerms,
    config: &EngineConfig,
    rule: &R,
    warnings: &mut Vec<String>,
) -> ScheduleResult {
    let rate = monthly_rate(terms.annual_rate_pct, config.rate_convention);
    let total = terms.total_periods;
    let epsilon = config.balance_epsilon;
    let settled = |balance: Money| balance <= epsilon;

    let mut payment = annuity_payment(terms.principal, rate, total);
    let initial_payment = payment;

    let mut balance = terms.principal.max(Decimal::ZERO);
    let mut periods = Vec::with_capacity(total.min(MAX_PERIODS) as usize);
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;
    let mut total_prepaid = Decimal::ZERO;

    for period in 1..=total {
        if settled(balance) {
            break;
        }
        let opening = balance;
        let mut prepayment = Decimal::ZERO;

        if config.prepayment_timing == PrepaymentTiming::StartOfPeriod {
            prepayment = clamp_prepayment(rule, period, balance, warnings);
            balance -= prepayment;
            if prepayment > Decimal::ZERO && !settled(balance) && config.recompute_on_prepayment {
                payment = annuity_payment(balance, rate, total - period + 1);
            }
        }

        let interest = balance * rate;
        let mut principal = (payment - interest).max(Decimal::ZERO);
        let mut scheduled = payment;
        if principal > balance {
            // Final partial payment.
            principal = balance;
            scheduled = principal + interest;
        }
        balance -= principal;

        if config.prepayment_timing == PrepaymentTiming::EndOfPeriod {
            prepayment = clamp_prepayment(rule, period, balance, warnings);
            balance -= prepayment;
        }

        if settled(balance) {
            // Fold the sub-epsilon residue into this period's principal so the
            // balance identity holds exactly.
            principal += balance;
            scheduled += balance;
            balance = Decimal::ZERO;
        }

        if config.prepayment_timing == PrepaymentTiming::EndOfPeriod
            && config.recompute_on_prepayment
            && prepayment > Decimal::ZERO
            && balance > Decimal::ZERO
            && period < total
        {
            payment = annuity_payment(balance, rate, total - period);
        }

        total_interest += interest;
        total_principal += principal + prepayment;
        total_prepaid += prepayment;

        periods.push(PeriodRecord {
            period,
            date: due_date(terms.start_date, period),
            opening_balance: opening,
            scheduled_payment: scheduled,
            interest,
            principal,
            prepayment,
            total_payment: scheduled + prepayment,
            ending_balance: balance,
            cumulative_interest: total_interest,
        });
    }

    if !periods.is_empty() && !settled(balance) {
        warnings.push(format!(
            "Balance of {} remains after the final period",
            balance.round_dp(2)
        ));
    }

    let final_period_count = periods.len() as u32;
    let payoff_date = periods.last().and_then(|p| p.date);

    ScheduleResult {
        periods,
        periodic_rate: rate,
        initial_payment,
        total_interest,
        total_principal_paid: total_principal,
        total_prepaid,
        final_period_count,
        payoff_date,
    }
}

fn clamp_prepayment<R: PrepaymentRule + ?Sized>(
    rule: &R,
    period: u32,
    balance: Money,
    warnings: &mut Vec<String>,
) -> Money {
    let requested = rule.prepayment(period, balance).max(Decimal::ZERO);
    if requested > balance {
        warnings.push(format!(
            "Period {period}: prepayment of {} clamped to remaining balance {}",
            requested.round_dp(2),
            balance.round_dp(2)
        ));
        balance
    } else {
        requested
    }
}

fn due_date(start: Option<NaiveDate>, period: u32) -> Option<NaiveDate> {
    start.and_then(|d| d.checked_add_months(Months::new(period)))
}

pub(crate) fn validate_terms(terms: &LoanTerms) -> MortgageResult<()> {
    if terms.principal <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "terms.principal",
            "Loan principal must be positive",
        ));
    }
    if terms.annual_rate_pct < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "terms.annual_rate_pct",
            "Annual rate cannot be negative",
        ));
    }
    if terms.total_periods == 0 || terms.total_periods > MAX_PERIODS {
        return Err(MortgageError::invalid(
            "terms.total_periods",
            format!("Loan term must be between 1 and {MAX_PERIODS} months"),
        ));
    }
    Ok(())
}
