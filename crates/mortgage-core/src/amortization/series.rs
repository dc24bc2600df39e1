//! Chart-ready series derived from schedules.
//!
//! Output is plain data: an x-axis of period numbers and named value series,
//! with shorter schedules padded by `None` so every series shares one axis.

use serde::{Deserialize, Serialize};

use crate::types::Money;

use super::schedule::ScheduleResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Balance,
    CumulativeInterest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<Option<Money>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub kind: SeriesKind,
    pub periods: Vec<u32>,
    pub series: Vec<ChartSeries>,
}

pub fn values(schedule: &ScheduleResult, kind: SeriesKind) -> Vec<Money> {
    schedule
        .periods
        .iter()
        .map(|p| match kind {
            SeriesKind::Balance => p.ending_balance,
            SeriesKind::CumulativeInterest => p.cumulative_interest,
        })
        .collect()
}

/// Align named schedules on the longest one.
pub fn chart_data(kind: SeriesKind, schedules: &[(&str, &ScheduleResult)]) -> ChartData {
    let len = schedules
        .iter()
        .map(|(_, s)| s.periods.len())
        .max()
        .unwrap_or(0);

    let series = schedules
        .iter()
        .map(|(name, schedule)| {
            let mut padded: Vec<Option<Money>> =
                values(schedule, kind).into_iter().map(Some).collect();
            padded.resize(len, None);
            ChartSeries {
                name: (*name).to_string(),
                values: padded,
            }
        })
        .collect();

    ChartData {
        kind,
        periods: (1..=len as u32).collect(),
        series,
    }
}
