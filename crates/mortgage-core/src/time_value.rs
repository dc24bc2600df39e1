//! Rate conversion and the constant-payment (French) annuity formula.
//!
//! Both are pure functions over `Decimal` and are shared by the amortisation
//! engine and the strategy simulator.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Payment periods in one year.
pub const PERIODS_PER_YEAR: u32 = 12;

/// How an annual percentage rate becomes a monthly rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateConvention {
    /// `(1 + annual)^(1/12) - 1`: twelve compounded months reproduce the annual rate.
    #[default]
    Effective,
    /// `annual / 12`: simple pro-rata nominal rate.
    Nominal,
}

/// Convert an annual rate quoted in percent (6 = 6%) into a monthly rate.
///
/// A zero rate yields zero under both conventions.
pub fn monthly_rate(annual_rate_pct: Decimal, convention: RateConvention) -> Rate {
    if annual_rate_pct.is_zero() {
        return Decimal::ZERO;
    }
    let annual = annual_rate_pct / dec!(100);
    let periods = Decimal::from(PERIODS_PER_YEAR);
    match convention {
        RateConvention::Effective => {
            (Decimal::ONE + annual).powd(Decimal::ONE / periods) - Decimal::ONE
        }
        RateConvention::Nominal => annual / periods,
    }
}

/// Level payment that amortises `principal` over `periods` at `rate` per period.
///
/// Degenerate inputs (non-positive principal, zero periods) return zero; a
/// zero rate is straight-line `principal / periods`.
pub fn annuity_payment(principal: Money, rate: Rate, periods: u32) -> Money {
    if principal <= Decimal::ZERO || periods == 0 {
        return Decimal::ZERO;
    }
    let n = Decimal::from(periods);
    if rate.is_zero() {
        return principal / n;
    }

    // P·r·(1+r)^n / ((1+r)^n − 1), written as P·r / (1 − (1+r)^−n) to keep
    // intermediate products small. A factor too large for Decimal means the
    // discount term has vanished and the payment is interest-only.
    let factor = match (Decimal::ONE + rate).checked_powu(u64::from(periods)) {
        Some(f) if !f.is_zero() => f,
        _ => return principal * rate,
    };
    let denominator = Decimal::ONE - Decimal::ONE / factor;
    if denominator <= Decimal::ZERO {
        return principal / n;
    }
    principal * rate / denominator
}

/// Whole periods a level `payment` needs to clear `balance` at `rate`.
///
/// `None` when the payment never covers the interest or the count does not
/// fit a `u32`.
pub fn periods_to_payoff(balance: Money, payment: Money, rate: Rate) -> Option<u32> {
    if balance <= Decimal::ZERO {
        return Some(0);
    }
    if payment <= Decimal::ZERO {
        return None;
    }
    let log_growth = (Decimal::ONE + rate).checked_ln().unwrap_or(Decimal::ZERO);
    let periods = if rate.is_zero() || log_growth <= Decimal::ZERO {
        balance.checked_div(payment)?
    } else {
        // n = -ln(1 - B·r/P) / ln(1 + r)
        let remaining = Decimal::ONE - balance.checked_mul(rate)?.checked_div(payment)?;
        if remaining <= Decimal::ZERO {
            return None;
        }
        (-remaining.checked_ln()?).checked_div(log_growth)?
    };
    periods.round_dp(4).ceil().to_u32()
}
