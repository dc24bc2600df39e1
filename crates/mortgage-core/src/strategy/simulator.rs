//! Year-by-year projection of a mortgage held alongside an equity portfolio.
//!
//! Each strategy shares the same loan, property and market assumptions and
//! differs only in how spare cash is split between the debt and the portfolio.
//! The simulation runs monthly and snapshots at every year end.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::time_value::{annuity_payment, monthly_rate, RateConvention, PERIODS_PER_YEAR};
use crate::types::*;
use crate::MortgageResult;

const HUNDRED: Decimal = dec!(100);

/// Debt at or below this is treated as repaid.
const DEBT_EPSILON: Decimal = dec!(0.01);

/// Longest loan term or horizon accepted, in years.
pub const MAX_YEARS: u32 = 100;

/// Largest magnitude accepted for a percentage input.
const MAX_PCT: Decimal = dec!(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Regular payments only; every spare unit goes to equity.
    PureInvestment,
    /// A fixed fraction of each monthly contribution goes straight to principal.
    AggressiveSplit,
    /// Periodic lump prepayment, payment unchanged (term shortens).
    MinimumPrepayment,
    /// Periodic lump prepayment, payment recast over the remaining term.
    IntelligentPrepayment,
}

impl Strategy {
    /// Declaration order; also the tie-break order when ranking.
    pub const ALL: [Strategy; 4] = [
        Strategy::PureInvestment,
        Strategy::AggressiveSplit,
        Strategy::MinimumPrepayment,
        Strategy::IntelligentPrepayment,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::PureInvestment => "Pure investment",
            Strategy::AggressiveSplit => "Aggressive prepayment",
            Strategy::MinimumPrepayment => "Minimum prepayment",
            Strategy::IntelligentPrepayment => "Intelligent prepayment",
        }
    }

    pub fn prepays_periodically(&self) -> bool {
        matches!(
            self,
            Strategy::MinimumPrepayment | Strategy::IntelligentPrepayment
        )
    }

    pub fn recomputes_payment(&self) -> bool {
        matches!(self, Strategy::IntelligentPrepayment)
    }
}

fn default_aggressive_fraction() -> Decimal {
    dec!(0.6)
}

fn default_penalty_multiplier() -> Decimal {
    dec!(1.5)
}

fn default_strategy_convention() -> RateConvention {
    RateConvention::Nominal
}

/// Shared assumptions for every strategy. Percentages are quoted as percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyInput {
    /// Outstanding mortgage today.
    pub principal: Money,
    pub annual_rate_pct: Decimal,
    /// Years left on the mortgage.
    pub loan_years: u32,
    pub property_value: Money,
    pub property_appreciation_pct: Decimal,
    /// Monthly amount available for investing, in the contribution currency.
    pub monthly_contribution: Money,
    /// Units of contribution currency per unit of the loan currency.
    pub exchange_rate: Decimal,
    /// Extra income received once a year (e.g. rental), in loan currency.
    #[serde(default)]
    pub annual_side_income: Money,
    pub equity_return_pct: Decimal,
    pub horizon_years: u32,
    /// Lump prepayment as a percent of the original principal.
    pub prepayment_pct: Decimal,
    pub prepayment_frequency_years: u32,
    #[serde(default = "default_aggressive_fraction")]
    pub aggressive_prepay_fraction: Decimal,
    /// Prepayment fee = payment × multiplier × annual rate.
    #[serde(default = "default_penalty_multiplier")]
    pub penalty_multiplier: Decimal,
    #[serde(default = "default_strategy_convention")]
    pub rate_convention: RateConvention,
}

impl StrategyInput {
    pub fn validate(&self) -> MortgageResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(MortgageError::invalid(
                "principal",
                "Mortgage principal must be positive",
            ));
        }
        if self.annual_rate_pct < Decimal::ZERO || self.annual_rate_pct > MAX_PCT {
            return Err(MortgageError::invalid(
                "annual_rate_pct",
                "Annual rate must be between 0 and 100 percent",
            ));
        }
        if self.loan_years == 0 || self.loan_years > MAX_YEARS {
            return Err(MortgageError::invalid(
                "loan_years",
                format!("Remaining term must be between 1 and {MAX_YEARS} years"),
            ));
        }
        if self.property_appreciation_pct.abs() > MAX_PCT {
            return Err(MortgageError::invalid(
                "property_appreciation_pct",
                "Appreciation must be between -100 and 100 percent",
            ));
        }
        if self.equity_return_pct.abs() > MAX_PCT {
            return Err(MortgageError::invalid(
                "equity_return_pct",
                "Equity return must be between -100 and 100 percent",
            ));
        }
        if self.property_value <= Decimal::ZERO {
            return Err(MortgageError::invalid(
                "property_value",
                "Property value must be positive",
            ));
        }
        if self.monthly_contribution < Decimal::ZERO || self.annual_side_income < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "monthly_contribution",
                "Contributions cannot be negative",
            ));
        }
        if self.exchange_rate <= Decimal::ZERO {
            return Err(MortgageError::invalid(
                "exchange_rate",
                "Exchange rate must be positive",
            ));
        }
        if self.horizon_years == 0 || self.horizon_years > MAX_YEARS {
            return Err(MortgageError::invalid(
                "horizon_years",
                format!("Horizon must be between 1 and {MAX_YEARS} years"),
            ));
        }
        if self.prepayment_pct < Decimal::ZERO || self.prepayment_pct > MAX_PCT {
            return Err(MortgageError::invalid(
                "prepayment_pct",
                "Prepayment percentage must be between 0 and 100",
            ));
        }
        if self.prepayment_frequency_years == 0 {
            return Err(MortgageError::invalid(
                "prepayment_frequency_years",
                "Prepayment frequency must be at least one year",
            ));
        }
        if self.aggressive_prepay_fraction < Decimal::ZERO
            || self.aggressive_prepay_fraction > Decimal::ONE
        {
            return Err(MortgageError::invalid(
                "aggressive_prepay_fraction",
                "Fraction must be between 0 and 1",
            ));
        }
        if self.penalty_multiplier < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "penalty_multiplier",
                "Penalty multiplier cannot be negative",
            ));
        }
        Ok(())
    }

    pub fn monthly_contribution_in_loan_currency(&self) -> MortgageResult<Money> {
        self.monthly_contribution
            .checked_div(self.exchange_rate)
            .ok_or_else(|| out_of_range("exchange_rate"))
    }
}

/// Year-end snapshot. Year 0 is the position before any simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyState {
    pub year: u32,
    pub remaining_debt: Money,
    pub property_value: Money,
    pub equity_portfolio_value: Money,
    /// `property_value - remaining_debt + equity_portfolio_value`
    pub net_worth: Money,
    /// Interest plus prepayment penalties.
    pub cumulative_interest_paid: Money,
    pub current_monthly_payment: Money,
    /// Cash added to the portfolio so far, before growth.
    pub contributed_capital: Money,
}

fn out_of_range(field: &str) -> MortgageError {
    MortgageError::invalid(field, "Projection exceeds the representable decimal range")
}

fn checked(value: Option<Decimal>, field: &str) -> MortgageResult<Decimal> {
    value.ok_or_else(|| out_of_range(field))
}

fn snapshot(
    year: u32,
    debt: Money,
    property: Money,
    equity: Money,
    cumulative_interest: Money,
    payment: Money,
    contributed: Money,
) -> MortgageResult<StrategyState> {
    Ok(StrategyState {
        year,
        remaining_debt: debt,
        property_value: property,
        equity_portfolio_value: equity,
        net_worth: checked((property - debt).checked_add(equity), "net_worth")?,
        cumulative_interest_paid: cumulative_interest,
        current_monthly_payment: payment,
        contributed_capital: contributed,
    })
}

/// Project one strategy over the horizon. Returns `horizon_years + 1` states.
///
/// Assumes a validated input. The household keeps a constant housing budget
/// equal to the initial payment; whatever the current payment leaves unused
/// (after a recast, in the payoff month, or once the debt is gone) goes to
/// the portfolio. Compounding that leaves the decimal range is reported as
/// `InvalidInput` against the growth field responsible.
pub fn run_strategy(input: &StrategyInput, strategy: Strategy) -> MortgageResult<Vec<StrategyState>> {
    let months = Decimal::from(PERIODS_PER_YEAR);
    let rate = monthly_rate(input.annual_rate_pct, input.rate_convention);
    let growth = Decimal::ONE + input.equity_return_pct / HUNDRED / months;
    let appreciation = Decimal::ONE + input.property_appreciation_pct / HUNDRED;
    let contribution = input.monthly_contribution_in_loan_currency()?;
    let side_income = checked(
        input
            .annual_side_income
            .checked_mul(Decimal::ONE + input.equity_return_pct / HUNDRED),
        "annual_side_income",
    )?;
    let lump = input.principal * (input.prepayment_pct / HUNDRED);

    let mut payment = annuity_payment(input.principal, rate, input.loan_years * PERIODS_PER_YEAR);
    let budget = payment;
    let mut debt = input.principal;
    let mut property = input.property_value;
    let mut equity = Decimal::ZERO;
    let mut contributed = Decimal::ZERO;
    let mut cumulative_interest = Decimal::ZERO;

    let mut states = Vec::with_capacity(input.horizon_years as usize + 1);
    states.push(snapshot(0, debt, property, equity, cumulative_interest, payment, contributed)?);

    for year in 1..=input.horizon_years {
        let mut yearly_interest = Decimal::ZERO;

        for _ in 0..PERIODS_PER_YEAR {
            let added = if debt.is_zero() {
                checked(contribution.checked_add(budget), "monthly_contribution")?
            } else {
                let interest = debt * rate;
                let principal = (payment - interest).max(Decimal::ZERO).min(debt);
                yearly_interest += interest;
                debt -= principal;
                let paid = principal + interest;

                let mut to_equity = contribution;
                if strategy == Strategy::AggressiveSplit {
                    let diverted = (contribution * input.aggressive_prepay_fraction).min(debt);
                    debt -= diverted;
                    to_equity -= diverted;
                }
                if debt <= DEBT_EPSILON {
                    debt = Decimal::ZERO;
                }
                checked(
                    to_equity.checked_add((budget - paid).max(Decimal::ZERO)),
                    "monthly_contribution",
                )?
            };

            equity = checked(
                equity.checked_mul(growth).and_then(|e| e.checked_add(added)),
                "equity_return_pct",
            )?;
            contributed = checked(contributed.checked_add(added), "monthly_contribution")?;
        }

        equity = checked(equity.checked_add(side_income), "annual_side_income")?;
        contributed = checked(
            contributed.checked_add(input.annual_side_income),
            "annual_side_income",
        )?;

        // Fires at the end of years F, 2F, 3F, ... rather than counting down
        // from the first year.
        if strategy.prepays_periodically()
            && year % input.prepayment_frequency_years == 0
            && debt > Decimal::ZERO
        {
            let amount = lump.min(debt);
            let penalty = checked(
                payment
                    .checked_mul(input.penalty_multiplier)
                    .and_then(|p| p.checked_mul(input.annual_rate_pct / HUNDRED)),
                "penalty_multiplier",
            )?;
            debt -= amount;
            if debt <= DEBT_EPSILON {
                debt = Decimal::ZERO;
            }
            cumulative_interest = checked(
                cumulative_interest.checked_add(penalty),
                "penalty_multiplier",
            )?;

            if strategy.recomputes_payment() && year < input.loan_years && debt > Decimal::ZERO {
                payment = annuity_payment(debt, rate, (input.loan_years - year) * PERIODS_PER_YEAR);
            }
        }

        cumulative_interest = checked(
            cumulative_interest.checked_add(yearly_interest),
            "annual_rate_pct",
        )?;
        property = checked(property.checked_mul(appreciation), "property_appreciation_pct")?;

        states.push(snapshot(
            year,
            debt,
            property,
            equity,
            cumulative_interest,
            payment,
            contributed,
        )?);
    }

    Ok(states)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        assert!(
            (actual - expected).abs() <= tol,
            "{msg}: expected ~{expected}, got {actual}"
        );
    }

    fn household() -> StrategyInput {
        StrategyInput {
            principal: dec!(940),
            annual_rate_pct: dec!(4.2),
            loan_years: 22,
            property_value: dec!(2050),
            property_appreciation_pct: dec!(2),
            monthly_contribution: dec!(650),
            exchange_rate: dec!(31),
            annual_side_income: dec!(55),
            equity_return_pct: dec!(10),
            horizon_years: 8,
            prepayment_pct: dec!(5),
            prepayment_frequency_years: 3,
            aggressive_prepay_fraction: dec!(0.6),
            penalty_multiplier: dec!(1.5),
            rate_convention: RateConvention::Nominal,
        }
    }

    #[test]
    fn test_year_zero_snapshot() {
        for strategy in Strategy::ALL {
            let states = run_strategy(&household(), strategy).unwrap();
            assert_eq!(states.len(), 9);
            let s0 = &states[0];
            assert_eq!(s0.year, 0);
            assert_eq!(s0.remaining_debt, dec!(940));
            assert_eq!(s0.equity_portfolio_value, Decimal::ZERO);
            assert_eq!(s0.net_worth, dec!(1110));
            assert_eq!(s0.cumulative_interest_paid, Decimal::ZERO);
            assert_close(s0.current_monthly_payment, dec!(5.4612), dec!(0.0001), "payment");
        }
    }

    #[test]
    fn test_first_year_without_prepayment() {
        let y1 = &run_strategy(&household(), Strategy::PureInvestment).unwrap()[1];
        assert_close(y1.remaining_debt, dec!(913.4381), dec!(0.001), "debt");
        assert_eq!(y1.property_value, dec!(2091));
        assert_close(y1.equity_portfolio_value, dec!(323.9716), dec!(0.001), "equity");
        assert_close(y1.net_worth, dec!(1501.5335), dec!(0.001), "net worth");
        assert_close(y1.cumulative_interest_paid, dec!(38.9726), dec!(0.001), "interest");
    }

    #[test]
    fn test_aggressive_first_year() {
        let y1 = &run_strategy(&household(), Strategy::AggressiveSplit).unwrap()[1];
        assert_close(y1.remaining_debt, dec!(759.53), dec!(0.01), "debt");
        assert_close(y1.equity_portfolio_value, dec!(165.8886), dec!(0.001), "equity");
    }

    #[test]
    fn test_minimum_prepayment_path() {
        let states = run_strategy(&household(), Strategy::MinimumPrepayment).unwrap();
        let expected = [
            dec!(940),
            dec!(913.44),
            dec!(885.74),
            dec!(809.85),
            dec!(777.72),
            dec!(744.21),
            dec!(662.26),
            dec!(623.81),
            dec!(583.71),
        ];
        for (state, want) in states.iter().zip(expected) {
            assert_close(state.remaining_debt, want, dec!(0.01), "debt");
        }
        // Payment never changes when the term shortens instead.
        assert_eq!(states[8].current_monthly_payment, states[0].current_monthly_payment);
    }

    #[test]
    fn test_intelligent_recasts_payment() {
        let states = run_strategy(&household(), Strategy::IntelligentPrepayment).unwrap();
        assert_eq!(states[2].current_monthly_payment, states[0].current_monthly_payment);
        assert!(states[3].current_monthly_payment < states[2].current_monthly_payment);
        assert_close(states[8].current_monthly_payment, dec!(4.83), dec!(0.01), "payment");
        assert_close(states[8].remaining_debt, dec!(612.08), dec!(0.01), "debt");
    }

    #[test]
    fn test_penalty_counts_as_interest() {
        let pure = run_strategy(&household(), Strategy::PureInvestment).unwrap();
        let minimum = run_strategy(&household(), Strategy::MinimumPrepayment).unwrap();
        // Identical until the first prepayment at the end of year 3.
        assert_eq!(pure[2], minimum[2]);
        let pure_y3 = pure[3].cumulative_interest_paid - pure[2].cumulative_interest_paid;
        let min_y3 = minimum[3].cumulative_interest_paid - minimum[2].cumulative_interest_paid;
        let penalty = minimum[2].current_monthly_payment * dec!(1.5) * dec!(0.042);
        assert_close(min_y3 - pure_y3, penalty, dec!(0.000000001), "penalty");
    }

    #[test]
    fn test_payoff_redirects_budget() {
        let states = run_strategy(&household(), Strategy::AggressiveSplit).unwrap();
        let payoff = states
            .iter()
            .position(|s| s.remaining_debt.is_zero())
            .unwrap();
        assert_eq!(payoff, 5);
        for s in &states[payoff..] {
            assert_eq!(s.remaining_debt, Decimal::ZERO);
        }
        let after = &states[payoff + 1];
        let before = &states[payoff];
        let yearly_cash = (dec!(650) / dec!(31) + before.current_monthly_payment) * dec!(12) + dec!(55);
        assert_close(
            after.contributed_capital - before.contributed_capital,
            yearly_cash,
            dec!(0.000001),
            "contributions after payoff",
        );
    }

    #[test]
    fn test_net_worth_identity() {
        for strategy in Strategy::ALL {
            for s in run_strategy(&household(), strategy).unwrap() {
                assert_eq!(
                    s.net_worth,
                    s.property_value - s.remaining_debt + s.equity_portfolio_value
                );
                assert!(s.remaining_debt >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn test_validation() {
        assert!(household().validate().is_ok());

        let mut bad = household();
        bad.exchange_rate = Decimal::ZERO;
        assert!(bad.validate().is_err());

        let mut bad = household();
        bad.aggressive_prepay_fraction = dec!(1.2);
        assert!(bad.validate().is_err());

        let mut bad = household();
        bad.prepayment_frequency_years = 0;
        assert!(bad.validate().is_err());

        let mut bad = household();
        bad.horizon_years = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_validation_bounds_growth_inputs() {
        let mut long = household();
        long.horizon_years = 800;
        assert!(matches!(
            long.validate(),
            Err(MortgageError::InvalidInput { ref field, .. }) if field == "horizon_years"
        ));

        let mut hot = household();
        hot.equity_return_pct = dec!(1000);
        hot.horizon_years = 30;
        assert!(matches!(
            hot.validate(),
            Err(MortgageError::InvalidInput { ref field, .. }) if field == "equity_return_pct"
        ));

        let mut bad = household();
        bad.loan_years = MAX_YEARS + 1;
        assert!(bad.validate().is_err());

        let mut bad = household();
        bad.annual_rate_pct = dec!(150);
        assert!(bad.validate().is_err());

        let mut bad = household();
        bad.property_appreciation_pct = dec!(-101);
        assert!(bad.validate().is_err());

        let mut edge = household();
        edge.horizon_years = MAX_YEARS;
        edge.equity_return_pct = dec!(-100);
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_compounding_past_decimal_range_is_an_error() {
        let mut input = household();
        input.equity_return_pct = dec!(100);
        input.horizon_years = MAX_YEARS;
        assert!(input.validate().is_ok());
        assert!(matches!(
            run_strategy(&input, Strategy::PureInvestment),
            Err(MortgageError::InvalidInput { ref field, .. }) if field == "equity_return_pct"
        ));
    }

    #[test]
    fn test_full_range_projection_stays_finite() {
        let mut input = household();
        input.horizon_years = MAX_YEARS;
        for strategy in Strategy::ALL {
            let states = run_strategy(&input, strategy).unwrap();
            assert_eq!(states.len(), MAX_YEARS as usize + 1);
            assert_eq!(states[MAX_YEARS as usize].remaining_debt, Decimal::ZERO);
        }
    }

    #[test]
    fn test_serde_defaults() {
        let json = r#"{
            "principal": "940", "annual_rate_pct": "4.2", "loan_years": 22,
            "property_value": "2050", "property_appreciation_pct": "2",
            "monthly_contribution": "650", "exchange_rate": "31",
            "equity_return_pct": "10", "horizon_years": 8,
            "prepayment_pct": "5", "prepayment_frequency_years": 3
        }"#;
        let input: StrategyInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.aggressive_prepay_fraction, dec!(0.6));
        assert_eq!(input.penalty_multiplier, dec!(1.5));
        assert_eq!(input.rate_convention, RateConvention::Nominal);
        assert_eq!(input.annual_side_income, Decimal::ZERO);
    }
}
