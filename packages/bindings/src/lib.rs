use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use mortgage_core::amortization::policy::PrepaymentAnalysisInput;
use mortgage_core::amortization::series::SeriesKind;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortisation
// ---------------------------------------------------------------------------

#[napi]
pub fn loan_summary(input_json: String) -> NapiResult<String> {
    let input: mortgage_core::amortization::summary::LoanSummaryInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        mortgage_core::amortization::summary::loan_summary(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: mortgage_core::amortization::schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_core::amortization::schedule::generate_schedule(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_prepayment_scenarios(input_json: String) -> NapiResult<String> {
    let input: PrepaymentAnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_core::amortization::scenarios::analyze_prepayment_scenarios(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_prepayment(input_json: String) -> NapiResult<String> {
    let input: PrepaymentAnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_core::amortization::comparison::compare_prepayment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct ScenarioChartRequest {
    analysis: PrepaymentAnalysisInput,
    kind: SeriesKind,
}

/// Balance or cumulative-interest series for the three prepayment scenarios,
/// padded to a common period axis.
#[napi]
pub fn scenario_chart(input_json: String) -> NapiResult<String> {
    let request: ScenarioChartRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let analysis =
        mortgage_core::amortization::scenarios::analyze_prepayment_scenarios(&request.analysis)
            .map_err(to_napi_error)?;
    let named: Vec<(&str, _)> = analysis
        .result
        .scenarios
        .iter()
        .map(|s| (s.summary.name.as_str(), &s.schedule))
        .collect();
    let chart = mortgage_core::amortization::series::chart_data(request.kind, &named);
    serde_json::to_string(&chart).map_err(to_napi_error)
}

#[napi]
pub fn build_workbook(input_json: String) -> NapiResult<String> {
    let input: mortgage_core::amortization::export::WorkbookInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        mortgage_core::amortization::export::build_workbook(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_strategies(input_json: String) -> NapiResult<String> {
    let input: mortgage_core::strategy::simulator::StrategyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_core::strategy::comparison::simulate_strategies(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Net worth and remaining debt per year, one column per strategy.
#[napi]
pub fn strategy_tables(input_json: String) -> NapiResult<String> {
    use mortgage_core::strategy::comparison::{debt_by_year, net_worth_by_year};

    let input: mortgage_core::strategy::simulator::StrategyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_core::strategy::comparison::simulate_strategies(&input)
        .map_err(to_napi_error)?;
    let outcomes = &output.result.outcomes;
    let tables = serde_json::json!({
        "net_worth": net_worth_by_year(outcomes),
        "debt": debt_by_year(outcomes),
    });
    serde_json::to_string(&tables).map_err(to_napi_error)
}
