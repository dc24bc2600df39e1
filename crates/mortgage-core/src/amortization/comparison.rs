//! Baseline vs. prepayment comparison of two schedules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::*;
use crate::MortgageResult;

use super::policy::{PrepaymentAnalysisInput, PrepaymentPolicy};
use super::schedule::{amortize, run_schedule, ScheduleResult};

pub use crate::types::ComparisonSummary;

pub fn compare_schedules(baseline: &ScheduleResult, variant: &ScheduleResult) -> ComparisonSummary {
    let periods_saved =
        i64::from(baseline.final_period_count) - i64::from(variant.final_period_count);
    ComparisonSummary {
        periods_saved,
        years_saved: periods_to_years(periods_saved),
        interest_saved: baseline.total_interest - variant.total_interest,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentComparison {
    pub baseline: ScheduleResult,
    pub with_prepayment: ScheduleResult,
    pub summary: ComparisonSummary,
    /// Size of each instalment derived from the annual limit.
    pub periodic_prepayment: Money,
    /// Plain-language reading of the summary.
    pub explanation: Vec<String>,
}

/// No prepayment vs. the plan's periodic prepayment, on the same loan.
pub fn compare_prepayment(
    input: &PrepaymentAnalysisInput,
) -> MortgageResult<ComputationOutput<PrepaymentComparison>> {
    let start = Instant::now();
    input.validate()?;

    let mut warnings = Vec::new();
    let baseline = amortize(&input.terms, &input.config, &PrepaymentPolicy::NoPrepayment);
    let with_prepayment = run_schedule(
        &input.terms,
        &input.config,
        &input.plan.fixed_policy(),
        &mut warnings,
    );
    let summary = compare_schedules(&baseline, &with_prepayment);
    let periodic_prepayment = input.plan.periodic_amount();
    let explanation = explain(input, &baseline, &with_prepayment, &summary);

    let output = PrepaymentComparison {
        baseline,
        with_prepayment,
        summary,
        periodic_prepayment,
        explanation,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Baseline vs. periodic prepayment comparison",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn explain(
    input: &PrepaymentAnalysisInput,
    baseline: &ScheduleResult,
    variant: &ScheduleResult,
    summary: &ComparisonSummary,
) -> Vec<String> {
    let cadence = match input.plan.frequency_months {
        12 => "once a year".to_string(),
        6 => "twice a year".to_string(),
        m => format!("every {m} months"),
    };
    let mut lines = vec![format!(
        "Prepaying {} {} from period {} onwards:",
        input.plan.periodic_amount().round_dp(2),
        cadence,
        input.plan.start_period
    )];
    if summary.periods_saved > 0 {
        lines.push(format!(
            "The loan is repaid in {} periods instead of {}, {} periods (about {} years) sooner.",
            variant.final_period_count,
            baseline.final_period_count,
            summary.periods_saved,
            summary.years_saved.round_dp(1)
        ));
    } else {
        lines.push(format!(
            "The loan keeps its {} period term.",
            variant.final_period_count
        ));
    }
    if input.config.recompute_on_prepayment {
        let first_recast = variant
            .periods
            .iter()
            .position(|p| p.prepayment > Decimal::ZERO)
            .and_then(|i| variant.periods.get(i + 1));
        if let Some(next) = first_recast {
            lines.push(format!(
                "After the first prepayment the regular payment drops from {} to {}.",
                variant.initial_payment.round_dp(2),
                next.scheduled_payment.round_dp(2)
            ));
        }
    }
    lines.push(format!(
        "Total interest falls from {} to {}, a saving of {}.",
        baseline.total_interest.round_dp(2),
        variant.total_interest.round_dp(2),
        summary.interest_saved.round_dp(2)
    ));
    lines.push(
        "Each prepayment goes straight to principal, so every later period accrues interest \
         on a smaller balance."
            .into(),
    );
    lines
}
