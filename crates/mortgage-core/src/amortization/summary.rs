//! Where a loan stands today, given how many instalments have been paid.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::types::*;
use crate::MortgageResult;

use super::policy::PrepaymentPolicy;
use super::schedule::{amortize, validate_terms, EngineConfig, LoanTerms};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummaryInput {
    pub terms: LoanTerms,
    #[serde(default)]
    pub paid_periods: u32,
    #[serde(default)]
    pub config: EngineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub original_principal: Money,
    pub monthly_payment: Money,
    pub periodic_rate: Rate,
    pub paid_periods: u32,
    pub outstanding_balance: Money,
    pub remaining_periods: u32,
    pub remaining_years: Years,
    pub interest_paid_to_date: Money,
    pub principal_paid_to_date: Money,
    /// Interest still due if the loan runs to term without prepayments.
    pub remaining_interest: Money,
}

/// Contractual payment and outstanding position after `paid_periods`.
pub fn loan_summary(input: &LoanSummaryInput) -> MortgageResult<ComputationOutput<LoanSummary>> {
    let start = Instant::now();
    validate_terms(&input.terms)?;
    input.config.validate()?;
    if input.paid_periods >= input.terms.total_periods {
        return Err(MortgageError::invalid(
            "paid_periods",
            "Periods already paid must be fewer than the total term",
        ));
    }

    let schedule = amortize(&input.terms, &input.config, &PrepaymentPolicy::NoPrepayment);
    let paid = input.paid_periods as usize;
    let to_date = &schedule.periods[..paid.min(schedule.periods.len())];

    let outstanding_balance = schedule.balance_after(input.paid_periods, input.terms.principal);
    let interest_paid_to_date: Money = to_date.iter().map(|p| p.interest).sum();
    let principal_paid_to_date: Money = to_date.iter().map(|p| p.principal).sum();
    let remaining_periods = input.terms.total_periods - input.paid_periods;

    let summary = LoanSummary {
        original_principal: input.terms.principal,
        monthly_payment: schedule.initial_payment,
        periodic_rate: schedule.periodic_rate,
        paid_periods: input.paid_periods,
        outstanding_balance,
        remaining_periods,
        remaining_years: periods_to_years(i64::from(remaining_periods)),
        interest_paid_to_date,
        principal_paid_to_date,
        remaining_interest: schedule.total_interest - interest_paid_to_date,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan position from the contractual French schedule",
        input,
        Vec::new(),
        elapsed,
        summary,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn input(paid: u32) -> LoanSummaryInput {
        LoanSummaryInput {
            terms: LoanTerms {
                principal: dec!(2000),
                annual_rate_pct: dec!(4.5),
                total_periods: 240,
                start_date: None,
            },
            paid_periods: paid,
            config: EngineConfig::default(),
        }
    }

    #[test]
    fn test_summary_after_two_years() {
        let out = loan_summary(&input(24)).unwrap().result;
        assert!((out.monthly_payment - dec!(12.5558)).abs() < dec!(0.0001));
        assert!((out.outstanding_balance - dec!(1869.6266)).abs() < dec!(0.001));
        assert!((out.interest_paid_to_date - dec!(170.9654)).abs() < dec!(0.001));
        assert_eq!(out.remaining_periods, 216);
        assert_eq!(out.remaining_years, dec!(18));
        assert!(
            (out.principal_paid_to_date + out.outstanding_balance - dec!(2000)).abs()
                < dec!(0.000000001)
        );
    }

    #[test]
    fn test_summary_nothing_paid() {
        let out = loan_summary(&input(0)).unwrap().result;
        assert_eq!(out.outstanding_balance, dec!(2000));
        assert_eq!(out.interest_paid_to_date, Decimal::ZERO);
        assert_eq!(out.remaining_periods, 240);
    }

    #[test]
    fn test_summary_rejects_fully_paid() {
        assert!(loan_summary(&input(240)).is_err());
        assert!(loan_summary(&input(300)).is_err());
    }
}
