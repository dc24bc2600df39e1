//! Prepayment policies: which extra principal is paid in which period.
//!
//! Built-in policies are a serialisable tagged enum; any
//! `Fn(period, balance) -> amount` closure also works as a rule through the
//! [`PrepaymentRule`] blanket implementation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::time_value::PERIODS_PER_YEAR;
use crate::types::Money;
use crate::MortgageResult;

use super::schedule::{validate_terms, EngineConfig, LoanTerms};

/// Anything that can answer "how much extra principal in this period?".
///
/// `balance` is the balance the prepayment would be applied against. The
/// engine clamps the answer to that balance, so rules never need to.
pub trait PrepaymentRule {
    fn prepayment(&self, period: u32, balance: Money) -> Money;
}

impl<F> PrepaymentRule for F
where
    F: Fn(u32, Money) -> Money,
{
    fn prepayment(&self, period: u32, balance: Money) -> Money {
        self(period, balance)
    }
}

/// A single extra payment at a given period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpPrepayment {
    pub period: u32,
    pub amount: Money,
}

/// Built-in prepayment policies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrepaymentPolicy {
    /// No extra payments.
    #[default]
    #[serde(rename = "none")]
    NoPrepayment,
    /// `amount` every `frequency_months`, starting at `start_period`.
    PeriodicFixed {
        amount: Money,
        frequency_months: u32,
        start_period: u32,
    },
    /// Twice `amount` every `frequency_months`, starting at `start_period`.
    PeriodicDoubled {
        amount: Money,
        frequency_months: u32,
        start_period: u32,
    },
    /// Explicit one-off payments; several entries for one period add up.
    Lump { payments: Vec<LumpPrepayment> },
}

impl PrepaymentPolicy {
    pub fn validate(&self) -> MortgageResult<()> {
        match self {
            PrepaymentPolicy::NoPrepayment => Ok(()),
            PrepaymentPolicy::PeriodicFixed {
                amount,
                frequency_months,
                start_period,
            }
            | PrepaymentPolicy::PeriodicDoubled {
                amount,
                frequency_months,
                start_period,
            } => {
                if *amount < Decimal::ZERO {
                    return Err(MortgageError::invalid(
                        "policy.amount",
                        "Prepayment amount cannot be negative",
                    ));
                }
                if *frequency_months == 0 {
                    return Err(MortgageError::invalid(
                        "policy.frequency_months",
                        "Prepayment frequency must be at least one month",
                    ));
                }
                if *start_period == 0 {
                    return Err(MortgageError::invalid(
                        "policy.start_period",
                        "Periods are 1-based; start period must be at least 1",
                    ));
                }
                Ok(())
            }
            PrepaymentPolicy::Lump { payments } => {
                for p in payments {
                    if p.period == 0 {
                        return Err(MortgageError::invalid(
                            "policy.payments.period",
                            "Periods are 1-based; lump period must be at least 1",
                        ));
                    }
                    if p.amount < Decimal::ZERO {
                        return Err(MortgageError::invalid(
                            "policy.payments.amount",
                            format!("Lump prepayment at period {} is negative", p.period),
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PrepaymentPolicy::NoPrepayment)
    }
}

impl PrepaymentRule for PrepaymentPolicy {
    fn prepayment(&self, period: u32, _balance: Money) -> Money {
        match self {
            PrepaymentPolicy::NoPrepayment => Decimal::ZERO,
            PrepaymentPolicy::PeriodicFixed {
                amount,
                frequency_months,
                start_period,
            } => {
                if fires(period, *start_period, *frequency_months) {
                    *amount
                } else {
                    Decimal::ZERO
                }
            }
            PrepaymentPolicy::PeriodicDoubled {
                amount,
                frequency_months,
                start_period,
            } => {
                if fires(period, *start_period, *frequency_months) {
                    *amount * Decimal::TWO
                } else {
                    Decimal::ZERO
                }
            }
            PrepaymentPolicy::Lump { payments } => payments
                .iter()
                .filter(|p| p.period == period)
                .map(|p| p.amount)
                .sum(),
        }
    }
}

fn fires(period: u32, start_period: u32, frequency_months: u32) -> bool {
    frequency_months > 0 && period >= start_period && (period - start_period) % frequency_months == 0
}

/// A yearly prepayment allowance split into equal instalments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentPlan {
    /// Total extra principal allowed per year.
    pub annual_limit: Money,
    /// Months between instalments; must divide 12 (6 = twice a year).
    pub frequency_months: u32,
    /// First period (1-based) that receives an instalment.
    pub start_period: u32,
}

impl PrepaymentPlan {
    /// Instalment size: `annual_limit / (12 / frequency_months)`.
    pub fn periodic_amount(&self) -> Money {
        if self.frequency_months == 0 {
            return Decimal::ZERO;
        }
        self.annual_limit * Decimal::from(self.frequency_months)
            / Decimal::from(PERIODS_PER_YEAR)
    }

    pub fn fixed_policy(&self) -> PrepaymentPolicy {
        PrepaymentPolicy::PeriodicFixed {
            amount: self.periodic_amount(),
            frequency_months: self.frequency_months,
            start_period: self.start_period,
        }
    }

    pub fn doubled_policy(&self) -> PrepaymentPolicy {
        PrepaymentPolicy::PeriodicDoubled {
            amount: self.periodic_amount(),
            frequency_months: self.frequency_months,
            start_period: self.start_period,
        }
    }

    pub fn validate(&self, paid_periods: u32) -> MortgageResult<()> {
        if self.annual_limit < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "plan.annual_limit",
                "Annual prepayment limit cannot be negative",
            ));
        }
        if self.frequency_months == 0
            || self.frequency_months > PERIODS_PER_YEAR
            || PERIODS_PER_YEAR % self.frequency_months != 0
        {
            return Err(MortgageError::invalid(
                "plan.frequency_months",
                "Frequency must be 1, 2, 3, 4, 6 or 12 months",
            ));
        }
        if self.start_period <= paid_periods {
            return Err(MortgageError::invalid(
                "plan.start_period",
                format!(
                    "Prepayment start ({}) must come after the periods already paid ({})",
                    self.start_period, paid_periods
                ),
            ));
        }
        Ok(())
    }
}

/// Shared input for the prepayment comparison, scenario and export operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentAnalysisInput {
    pub terms: LoanTerms,
    pub plan: PrepaymentPlan,
    /// Periods already paid on the loan.
    #[serde(default)]
    pub paid_periods: u32,
    #[serde(default)]
    pub config: EngineConfig,
}

impl PrepaymentAnalysisInput {
    pub fn validate(&self) -> MortgageResult<()> {
        validate_terms(&self.terms)?;
        self.config.validate()?;
        if self.paid_periods >= self.terms.total_periods {
            return Err(MortgageError::invalid(
                "paid_periods",
                "Periods already paid must be fewer than the total term",
            ));
        }
        self.plan.validate(self.paid_periods)
    }
}
