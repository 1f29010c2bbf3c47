//! Chart configuration records and their enums.
//!
//! Field names on the wire follow the backend's snake_case payloads; note that
//! the sort direction travels as `sort_by`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ReportId = i64;
pub type ConfigId = i64;

/// Chart height used when the user does not pick one.
pub const DEFAULT_CHART_HEIGHT: u32 = 400;

/// Error returned when a chart enum is parsed from an unknown string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseEnumError { kind: $kind, value: s.to_string() }),
                }
            }
        }
    };
}

/// Kind of chart a configuration renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Area,
    Scatter,
    Heatmap,
    Table,
}

string_enum!(ChartType, "chart type", {
    Bar => "bar",
    Line => "line",
    Pie => "pie",
    Area => "area",
    Scatter => "scatter",
    Heatmap => "heatmap",
    Table => "table",
});

/// Reduction applied to each group's Y values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Count,
    Average,
    Min,
    Max,
}

string_enum!(Aggregation, "aggregation", {
    Sum => "sum",
    Count => "count",
    Average => "average",
    Min => "min",
    Max => "max",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

string_enum!(SortDirection, "sort direction", {
    Asc => "asc",
    Desc => "desc",
});

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// The user-editable part of a chart configuration.
///
/// This is the payload of both create and update (updates replace the whole
/// record). `group_by` of `None` means "group by the X axis".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDraft {
    #[serde(default)]
    pub name: String,
    pub chart_type: ChartType,
    pub x_axis: String,
    pub y_axis: String,
    pub aggregation: Aggregation,
    #[serde(rename = "sort_by", default)]
    pub sort_direction: SortDirection,
    #[serde(default)]
    pub group_by: Option<String>,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub is_default: bool,
}

fn default_height() -> u32 {
    DEFAULT_CHART_HEIGHT
}

impl ChartDraft {
    pub fn new(
        chart_type: ChartType,
        x_axis: impl Into<String>,
        y_axis: impl Into<String>,
        aggregation: Aggregation,
    ) -> Self {
        Self {
            name: String::new(),
            chart_type,
            x_axis: x_axis.into(),
            y_axis: y_axis.into(),
            aggregation,
            sort_direction: SortDirection::Desc,
            group_by: None,
            height: DEFAULT_CHART_HEIGHT,
            is_default: false,
        }
    }

    /// True when both axes are chosen; charts without them render nothing.
    pub fn has_axes(&self) -> bool {
        !self.x_axis.trim().is_empty() && !self.y_axis.trim().is_empty()
    }

    pub fn group_column(&self) -> &str {
        effective_group_by(self.group_by.as_deref(), &self.x_axis)
    }

    /// Fill in a timestamped name if the user left it blank.
    pub fn with_default_name(mut self, now: NaiveDateTime) -> Self {
        if self.name.trim().is_empty() {
            self.name = default_chart_name(now);
        }
        self
    }
}

/// A persisted chart configuration belonging to one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub id: ConfigId,
    pub report_id: ReportId,
    pub name: String,
    pub chart_type: ChartType,
    pub x_axis: String,
    pub y_axis: String,
    pub aggregation: Aggregation,
    #[serde(rename = "sort_by")]
    pub sort_direction: SortDirection,
    #[serde(default)]
    pub group_by: Option<String>,
    pub height: u32,
    pub is_default: bool,
    pub created_at: NaiveDateTime,
}

impl ChartConfig {
    pub fn from_draft(
        id: ConfigId,
        report_id: ReportId,
        draft: ChartDraft,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            report_id,
            name: draft.name,
            chart_type: draft.chart_type,
            x_axis: draft.x_axis,
            y_axis: draft.y_axis,
            aggregation: draft.aggregation,
            sort_direction: draft.sort_direction,
            group_by: draft.group_by,
            height: draft.height,
            is_default: draft.is_default,
            created_at,
        }
    }

    /// The editable fields, e.g. to pre-fill an edit form.
    pub fn draft(&self) -> ChartDraft {
        ChartDraft {
            name: self.name.clone(),
            chart_type: self.chart_type,
            x_axis: self.x_axis.clone(),
            y_axis: self.y_axis.clone(),
            aggregation: self.aggregation,
            sort_direction: self.sort_direction,
            group_by: self.group_by.clone(),
            height: self.height,
            is_default: self.is_default,
        }
    }

    pub fn group_column(&self) -> &str {
        effective_group_by(self.group_by.as_deref(), &self.x_axis)
    }
}

fn effective_group_by<'a>(group_by: Option<&'a str>, x_axis: &'a str) -> &'a str {
    match group_by {
        Some(g) if !g.trim().is_empty() => g,
        _ => x_axis,
    }
}

/// Name given to a chart saved without one.
pub fn default_chart_name(now: NaiveDateTime) -> String {
    format!("Chart {}", now.format("%Y-%m-%d %H:%M:%S"))
}
