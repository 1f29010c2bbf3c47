//! Summary statistics of the current view, per numeric column.

use rpt_core::profile::columns_of;
use rpt_core::{ColumnProfile, ResultRow, SemanticType};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    /// Rows whose value parsed as a number.
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub row_count: usize,
    pub numeric: Vec<NumericSummary>,
}

fn summarize_column(view: &[&ResultRow], column: &str) -> NumericSummary {
    let mut summary = NumericSummary {
        column: column.to_string(),
        count: 0,
        sum: 0.0,
        mean: 0.0,
        min: None,
        max: None,
    };
    for n in view.iter().filter_map(|row| row.get(column).as_number()) {
        summary.count += 1;
        summary.sum += n;
        summary.min = Some(summary.min.map_or(n, |m| m.min(n)));
        summary.max = Some(summary.max.map_or(n, |m| m.max(n)));
    }
    if summary.count > 0 {
        summary.mean = summary.sum / summary.count as f64;
    }
    summary
}

pub fn summarize(profiles: &[ColumnProfile], view: &[&ResultRow]) -> ReportSummary {
    ReportSummary {
        row_count: view.len(),
        numeric: columns_of(profiles, SemanticType::Numeric)
            .into_iter()
            .map(|column| summarize_column(view, column))
            .collect(),
    }
}
