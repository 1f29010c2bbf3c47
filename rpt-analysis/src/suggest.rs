//! Chart type suggestions from column profiles.
//!
//! Suggestions are advisory. The default chart only pre-fills what the user
//! has not chosen yet; it never replaces an explicit choice.

use rpt_core::profile::columns_of;
use rpt_core::{Aggregation, ChartDraft, ChartType, ColumnProfile, SemanticType};
use serde::Serialize;

/// A proposed chart type and why it fits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub chart_type: ChartType,
    pub rationale: String,
}

/// Pre-populated values for the chart editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultChart {
    pub chart_type: ChartType,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    /// Numeric columns available as series.
    pub series: Vec<String>,
}

impl DefaultChart {
    /// A draft for this default, if it has both axes.
    pub fn to_draft(&self, aggregation: Aggregation) -> Option<ChartDraft> {
        match (&self.x_axis, &self.y_axis) {
            (Some(x), Some(y)) => Some(ChartDraft::new(self.chart_type, x, y, aggregation)),
            _ => None,
        }
    }
}

/// Every chart type the profile mix supports, in presentation order.
pub fn suggest(profiles: &[ColumnProfile]) -> Vec<Suggestion> {
    let categorical = columns_of(profiles, SemanticType::Categorical).len();
    let numeric = columns_of(profiles, SemanticType::Numeric).len();
    let date = columns_of(profiles, SemanticType::Date).len();

    let mut suggestions = Vec::new();
    if numeric >= 2 && categorical >= 1 {
        suggestions.push(Suggestion {
            chart_type: ChartType::Bar,
            rationale: format!(
                "Compare {} numeric measures across {} categorical dimension(s)",
                numeric, categorical
            ),
        });
    }
    if date >= 1 && numeric >= 1 {
        suggestions.push(Suggestion {
            chart_type: ChartType::Line,
            rationale: "Show how numeric values change over time".to_string(),
        });
    }
    if numeric >= 2 {
        suggestions.push(Suggestion {
            chart_type: ChartType::Scatter,
            rationale: "Look for correlation between two numeric columns".to_string(),
        });
    }
    if categorical >= 1 && numeric >= 1 {
        suggestions.push(Suggestion {
            chart_type: ChartType::Pie,
            rationale: "Show each category's share of a numeric total".to_string(),
        });
    }
    if numeric >= 3 {
        suggestions.push(Suggestion {
            chart_type: ChartType::Heatmap,
            rationale: format!("Spot patterns across {} numeric columns", numeric),
        });
    }
    log::debug!(
        "[RPT Debug] suggest: {} suggestions for {} categorical / {} numeric / {} date columns",
        suggestions.len(),
        categorical,
        numeric,
        date
    );
    suggestions
}

/// The chart the editor starts with.
///
/// Bar of the first numeric column by the first categorical column; failing
/// that, line of the first numeric column over the first date column;
/// failing that, a plain table.
pub fn default_chart(profiles: &[ColumnProfile]) -> DefaultChart {
    let categorical = columns_of(profiles, SemanticType::Categorical);
    let numeric = columns_of(profiles, SemanticType::Numeric);
    let date = columns_of(profiles, SemanticType::Date);
    let series: Vec<String> = numeric.iter().map(|s| s.to_string()).collect();

    let (chart_type, x_axis, y_axis) = match (categorical.first(), date.first(), numeric.first()) {
        (Some(x), _, Some(y)) => (ChartType::Bar, Some(x.to_string()), Some(y.to_string())),
        (None, Some(x), Some(y)) => (ChartType::Line, Some(x.to_string()), Some(y.to_string())),
        _ => (ChartType::Table, None, None),
    };

    DefaultChart {
        chart_type,
        x_axis,
        y_axis,
        series,
    }
}
