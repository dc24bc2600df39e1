//! Flat, spreadsheet-shaped views of schedules and scenario analyses.
//!
//! Rows are insertion-ordered maps so column order survives serialisation.
//! Money is rendered as a string rounded to the requested number of decimals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use crate::error::MortgageError;
use crate::types::*;
use crate::MortgageResult;

use super::policy::PrepaymentAnalysisInput;
use super::scenarios::{analyze_prepayment_scenarios, ScenarioSummary};
use super::schedule::{PeriodRecord, ScheduleResult};

pub const DEFAULT_DECIMALS: u32 = 4;

fn default_decimals() -> u32 {
    DEFAULT_DECIMALS
}

fn money(value: Decimal, decimals: u32) -> Value {
    Value::String(value.round_dp(decimals).to_string())
}

pub fn period_record(p: &PeriodRecord, decimals: u32) -> FlatRecord {
    let mut row = FlatRecord::new();
    row.insert("period".into(), Value::from(p.period));
    if let Some(date) = p.date {
        row.insert("date".into(), Value::String(date.to_string()));
    }
    row.insert("opening_balance".into(), money(p.opening_balance, decimals));
    row.insert("scheduled_payment".into(), money(p.scheduled_payment, decimals));
    row.insert("interest".into(), money(p.interest, decimals));
    row.insert("principal".into(), money(p.principal, decimals));
    row.insert("prepayment".into(), money(p.prepayment, decimals));
    row.insert("total_payment".into(), money(p.total_payment, decimals));
    row.insert("ending_balance".into(), money(p.ending_balance, decimals));
    row.insert("cumulative_interest".into(), money(p.cumulative_interest, decimals));
    row
}

pub fn schedule_records(schedule: &ScheduleResult, decimals: u32) -> Vec<FlatRecord> {
    schedule
        .periods
        .iter()
        .map(|p| period_record(p, decimals))
        .collect()
}

pub fn summary_record(s: &ScenarioSummary, decimals: u32) -> FlatRecord {
    let mut row = FlatRecord::new();
    row.insert("scenario".into(), Value::String(s.name.clone()));
    row.insert("final_periods".into(), Value::from(s.final_periods));
    row.insert("final_years".into(), money(s.final_years, 2));
    row.insert("years_saved".into(), money(s.years_saved, 2));
    row.insert("interest_saved".into(), money(s.interest_saved, decimals));
    row.insert("total_interest".into(), money(s.total_interest, decimals));
    row
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<FlatRecord>,
}

impl Sheet {
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|r| r.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbookInput {
    pub analysis: PrepaymentAnalysisInput,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

/// One schedule sheet per scenario followed by a `Summary` sheet.
pub fn build_workbook(input: &WorkbookInput) -> MortgageResult<ComputationOutput<Workbook>> {
    let start = Instant::now();
    if input.decimals > 10 {
        return Err(MortgageError::invalid(
            "decimals",
            "At most 10 decimal places are supported",
        ));
    }

    let analysis = analyze_prepayment_scenarios(&input.analysis)?;
    let decimals = input.decimals;

    let mut sheets: Vec<Sheet> = analysis
        .result
        .scenarios
        .iter()
        .map(|s| Sheet {
            name: s.summary.name.clone(),
            rows: schedule_records(&s.schedule, decimals),
        })
        .collect();
    sheets.push(Sheet {
        name: "Summary".into(),
        rows: analysis
            .result
            .summaries()
            .into_iter()
            .map(|s| summary_record(s, decimals))
            .collect(),
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Scenario schedules flattened to sheets",
        input,
        analysis.warnings,
        elapsed,
        Workbook { sheets },
    ))
}
