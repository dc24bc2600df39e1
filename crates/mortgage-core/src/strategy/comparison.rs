//! Ranking of strategy trajectories at the horizon and year-keyed tables for
//! charting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use crate::time_value::{monthly_rate, periods_to_payoff, PERIODS_PER_YEAR};
use crate::types::*;
use crate::MortgageResult;

use super::simulator::{run_strategy, Strategy, StrategyInput, StrategyState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyOutcome {
    pub strategy: Strategy,
    pub label: String,
    pub states: Vec<StrategyState>,
    /// First year whose closing debt is zero.
    pub payoff_year: Option<u32>,
    /// Months from the start until the debt is gone: the payoff year when it
    /// falls inside the horizon, otherwise the horizon plus the months the
    /// final payment still needs.
    pub projected_payoff_months: u32,
    /// Horizon net worth minus the pure-investment horizon net worth.
    pub advantage_over_pure_investment: Money,
    /// Time and interest saved relative to pure investment.
    pub savings_over_pure_investment: ComparisonSummary,
}

impl StrategyOutcome {
    pub fn final_state(&self) -> Option<&StrategyState> {
        self.states.last()
    }

    pub fn final_net_worth(&self) -> Money {
        self.final_state()
            .map(|s| s.net_worth)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn final_cumulative_interest(&self) -> Money {
        self.final_state()
            .map(|s| s.cumulative_interest_paid)
            .unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestStrategy {
    pub strategy: Strategy,
    pub label: String,
    pub net_worth: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub horizon_years: u32,
    pub outcomes: Vec<StrategyOutcome>,
    pub best: Option<BestStrategy>,
}

impl StrategyComparison {
    pub fn outcome(&self, strategy: Strategy) -> Option<&StrategyOutcome> {
        self.outcomes.iter().find(|o| o.strategy == strategy)
    }
}

/// Highest final net worth wins; on an exact tie the earlier entry is kept.
pub fn best_strategy(outcomes: &[StrategyOutcome]) -> Option<BestStrategy> {
    let mut best: Option<&StrategyOutcome> = None;
    for outcome in outcomes.iter().filter(|o| !o.states.is_empty()) {
        match best {
            Some(b) if outcome.final_net_worth() <= b.final_net_worth() => {}
            _ => best = Some(outcome),
        }
    }
    best.map(|o| BestStrategy {
        strategy: o.strategy,
        label: o.label.clone(),
        net_worth: o.final_net_worth(),
    })
}

/// Savings of `variant` over `baseline`: payoff months and interest paid up
/// to the horizon. Positive means the variant is ahead.
pub fn compare_strategy_outcomes(
    baseline: &StrategyOutcome,
    variant: &StrategyOutcome,
) -> ComparisonSummary {
    let periods_saved = i64::from(baseline.projected_payoff_months)
        - i64::from(variant.projected_payoff_months);
    ComparisonSummary {
        periods_saved,
        years_saved: periods_to_years(periods_saved),
        interest_saved: baseline.final_cumulative_interest() - variant.final_cumulative_interest(),
    }
}

fn projected_payoff_months(
    input: &StrategyInput,
    rate: Rate,
    payoff_year: Option<u32>,
    last: Option<&StrategyState>,
) -> u32 {
    let contractual = input.loan_years * PERIODS_PER_YEAR;
    if let Some(year) = payoff_year {
        return year * PERIODS_PER_YEAR;
    }
    let Some(last) = last else {
        return contractual;
    };
    let elapsed = last.year * PERIODS_PER_YEAR;
    let remaining = periods_to_payoff(last.remaining_debt, last.current_monthly_payment, rate)
        .unwrap_or_else(|| contractual.saturating_sub(elapsed));
    elapsed.saturating_add(remaining)
}

/// Attach payoff projections, advantages and savings relative to pure
/// investment to already-simulated trajectories.
pub fn compare_strategy_paths(
    input: &StrategyInput,
    paths: Vec<(Strategy, Vec<StrategyState>)>,
) -> Vec<StrategyOutcome> {
    let rate = monthly_rate(input.annual_rate_pct, input.rate_convention);
    let mut outcomes: Vec<StrategyOutcome> = paths
        .into_iter()
        .map(|(strategy, states)| {
            let payoff_year = states
                .iter()
                .find(|s| s.remaining_debt.is_zero())
                .map(|s| s.year);
            StrategyOutcome {
                strategy,
                label: strategy.label().to_string(),
                projected_payoff_months: projected_payoff_months(
                    input,
                    rate,
                    payoff_year,
                    states.last(),
                ),
                payoff_year,
                advantage_over_pure_investment: Decimal::ZERO,
                savings_over_pure_investment: ComparisonSummary::default(),
                states,
            }
        })
        .collect();

    let pure = outcomes
        .iter()
        .find(|o| o.strategy == Strategy::PureInvestment)
        .cloned();
    if let Some(pure) = pure {
        for outcome in &mut outcomes {
            outcome.advantage_over_pure_investment =
                outcome.final_net_worth() - pure.final_net_worth();
            outcome.savings_over_pure_investment = compare_strategy_outcomes(&pure, outcome);
        }
    }
    outcomes
}

/// Run all four strategies and rank them at the horizon.
pub fn simulate_strategies(
    input: &StrategyInput,
) -> MortgageResult<ComputationOutput<StrategyComparison>> {
    let start = Instant::now();
    input.validate()?;

    let mut warnings = Vec::new();
    if input.horizon_years > input.loan_years {
        warnings.push(format!(
            "Strategy horizon of {} years exceeds the {} year loan term",
            input.horizon_years, input.loan_years
        ));
    }
    if input.prepayment_frequency_years > input.horizon_years {
        warnings.push(
            "Prepayment frequency is longer than the horizon; periodic prepayment strategies \
             never prepay"
                .into(),
        );
    }

    let paths = Strategy::ALL
        .iter()
        .map(|&s| run_strategy(input, s).map(|states| (s, states)))
        .collect::<MortgageResult<Vec<_>>>()?;
    let outcomes = compare_strategy_paths(input, paths);
    let best = best_strategy(&outcomes);

    let comparison = StrategyComparison {
        horizon_years: input.horizon_years,
        outcomes,
        best,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly mortgage and equity projection with year-end snapshots",
        input,
        warnings,
        elapsed,
        comparison,
    ))
}

fn by_year(outcomes: &[StrategyOutcome], field: impl Fn(&StrategyState) -> Money) -> Vec<FlatRecord> {
    let years = outcomes.iter().map(|o| o.states.len()).max().unwrap_or(0);
    (0..years)
        .map(|i| {
            let mut row = FlatRecord::new();
            row.insert("year".into(), Value::from(i as u32));
            for outcome in outcomes {
                let value = outcome
                    .states
                    .get(i)
                    .map(|s| Value::String(field(s).round_dp(2).to_string()))
                    .unwrap_or(Value::Null);
                row.insert(outcome.label.clone(), value);
            }
            row
        })
        .collect()
}

/// One row per year, one column per strategy.
pub fn net_worth_by_year(outcomes: &[StrategyOutcome]) -> Vec<FlatRecord> {
    by_year(outcomes, |s| s.net_worth)
}

pub fn debt_by_year(outcomes: &[StrategyOutcome]) -> Vec<FlatRecord> {
    by_year(outcomes, |s| s.remaining_debt)
}
