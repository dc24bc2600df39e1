//! Three-way prepayment scenario analysis: none, the annual limit, and
//! double the annual limit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::*;
use crate::MortgageResult;

use super::policy::{PrepaymentAnalysisInput, PrepaymentPolicy};
use super::schedule::{run_schedule, ScheduleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    NoPrepayment,
    AnnualLimit,
    DoubleLimit,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::NoPrepayment,
        ScenarioKind::AnnualLimit,
        ScenarioKind::DoubleLimit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ScenarioKind::NoPrepayment => "No prepayment",
            ScenarioKind::AnnualLimit => "Annual limit",
            ScenarioKind::DoubleLimit => "Double limit",
        }
    }
}

/// One row of the scenario summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub final_periods: u32,
    pub final_years: Years,
    /// Years saved against the contractual term, never negative.
    pub years_saved: Years,
    /// Interest saved against the no-prepayment scenario, never negative.
    pub interest_saved: Money,
    pub total_interest: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub kind: ScenarioKind,
    pub summary: ScenarioSummary,
    pub schedule: ScheduleResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub periodic_prepayment: Money,
    pub scenarios: Vec<ScenarioOutcome>,
}

impl ScenarioAnalysis {
    pub fn summaries(&self) -> Vec<&ScenarioSummary> {
        self.scenarios.iter().map(|s| &s.summary).collect()
    }

    pub fn scenario(&self, kind: ScenarioKind) -> Option<&ScenarioOutcome> {
        self.scenarios.iter().find(|s| s.kind == kind)
    }
}

pub fn analyze_prepayment_scenarios(
    input: &PrepaymentAnalysisInput,
) -> MortgageResult<ComputationOutput<ScenarioAnalysis>> {
    let start = Instant::now();
    input.validate()?;

    let mut warnings = Vec::new();
    let schedules: Vec<(ScenarioKind, ScheduleResult)> = ScenarioKind::ALL
        .iter()
        .map(|&kind| {
            let policy = match kind {
                ScenarioKind::NoPrepayment => PrepaymentPolicy::NoPrepayment,
                ScenarioKind::AnnualLimit => input.plan.fixed_policy(),
                ScenarioKind::DoubleLimit => input.plan.doubled_policy(),
            };
            let mut scenario_warnings = Vec::new();
            let schedule = run_schedule(&input.terms, &input.config, &policy, &mut scenario_warnings);
            warnings.extend(
                scenario_warnings
                    .into_iter()
                    .map(|w| format!("{}: {w}", kind.label())),
            );
            (kind, schedule)
        })
        .collect();

    let baseline_interest = schedules
        .first()
        .map(|(_, s)| s.total_interest)
        .unwrap_or_default();
    let term = input.terms.total_periods;

    let scenarios = schedules
        .into_iter()
        .map(|(kind, schedule)| {
            let final_periods = schedule.final_period_count;
            let summary = ScenarioSummary {
                name: kind.label().to_string(),
                final_periods,
                final_years: periods_to_years(i64::from(final_periods)),
                years_saved: periods_to_years(i64::from(term) - i64::from(final_periods))
                    .max(Decimal::ZERO),
                interest_saved: (baseline_interest - schedule.total_interest).max(Decimal::ZERO),
                total_interest: schedule.total_interest,
            };
            ScenarioOutcome {
                kind,
                summary,
                schedule,
            }
        })
        .collect();

    let analysis = ScenarioAnalysis {
        periodic_prepayment: input.plan.periodic_amount(),
        scenarios,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Prepayment scenarios: none, annual limit, double limit",
        input,
        warnings,
        elapsed,
        analysis,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::policy::PrepaymentPlan;
    use crate::amortization::schedule::{EngineConfig, LoanTerms};
    use rust_decimal_macros::dec;

    fn input(recompute: bool) -> PrepaymentAnalysisInput {
        PrepaymentAnalysisInput {
            terms: LoanTerms {
                principal: dec!(2000),
                annual_rate_pct: dec!(4.5),
                total_periods: 240,
                start_date: None,
            },
            plan: PrepaymentPlan {
                annual_limit: dec!(120),
                frequency_months: 6,
                start_period: 13,
            },
            paid_periods: 0,
            config: EngineConfig {
                recompute_on_prepayment: recompute,
                ..EngineConfig::default()
            },
        }
    }

    #[test]
    fn test_three_scenarios_in_order() {
        let out = analyze_prepayment_scenarios(&input(false)).unwrap().result;
        let kinds: Vec<ScenarioKind> = out.scenarios.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, ScenarioKind::ALL.to_vec());
        assert_eq!(out.periodic_prepayment, dec!(60));
    }

    #[test]
    fn test_fixed_payment_terms() {
        let out = analyze_prepayment_scenarios(&input(false)).unwrap().result;
        let periods: Vec<u32> = out.summaries().iter().map(|s| s.final_periods).collect();
        assert_eq!(periods, vec![240, 115, 79]);

        let none = &out.scenario(ScenarioKind::NoPrepayment).unwrap().summary;
        assert_eq!(none.years_saved, Decimal::ZERO);
        assert_eq!(none.interest_saved, Decimal::ZERO);
        assert_eq!(none.final_years, dec!(20));

        let base = &out.scenario(ScenarioKind::AnnualLimit).unwrap().summary;
        assert_eq!(base.years_saved, dec!(125) / dec!(12));
    }

    #[test]
    fn test_recast_terms() {
        let out = analyze_prepayment_scenarios(&input(true)).unwrap().result;
        let periods: Vec<u32> = out.summaries().iter().map(|s| s.final_periods).collect();
        assert_eq!(periods, vec![240, 151, 97]);
    }

    #[test]
    fn test_double_limit_saves_most_interest() {
        let out = analyze_prepayment_scenarios(&input(false)).unwrap().result;
        let s = out.summaries();
        assert!(s[2].interest_saved > s[1].interest_saved);
        assert!(s[1].interest_saved > Decimal::ZERO);
        assert!(s[2].total_interest < s[1].total_interest);
    }
}
