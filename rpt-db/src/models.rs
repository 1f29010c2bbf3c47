//! Row structs for the report store and their conversion into core types.
//!
//! Enums and timestamps are stored as text; converting a raw row into a
//! [`ChartConfig`] fails if a stored value no longer parses.

use anyhow::Context;
use chrono::NaiveDateTime;
use rpt_core::{Aggregation, ChartConfig, ChartType, ConfigId, ReportId, SortDirection};
use serde::Serialize;

/// Timestamp layout of `chart_configs.created_at`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A stored report query.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoredReport {
    pub id: ReportId,
    pub name: String,
    pub query_sql: String,
}

/// A `chart_configs` row as read from SQLite.
#[derive(Debug, Clone)]
pub(crate) struct ChartConfigRow {
    pub id: ConfigId,
    pub report_id: ReportId,
    pub name: String,
    pub chart_type: String,
    pub x_axis: String,
    pub y_axis: String,
    pub aggregation: String,
    pub sort_by: String,
    pub group_by: Option<String>,
    pub height: i64,
    pub is_default: bool,
    pub created_at: String,
}

impl ChartConfigRow {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            report_id: row.get(1)?,
            name: row.get(2)?,
            chart_type: row.get(3)?,
            x_axis: row.get(4)?,
            y_axis: row.get(5)?,
            aggregation: row.get(6)?,
            sort_by: row.get(7)?,
            group_by: row.get(8)?,
            height: row.get(9)?,
            is_default: row.get(10)?,
            created_at: row.get(11)?,
        })
    }
}

impl TryFrom<ChartConfigRow> for ChartConfig {
    type Error = anyhow::Error;

    fn try_from(row: ChartConfigRow) -> anyhow::Result<Self> {
        let context = || format!("chart config {}", row.id);
        Ok(ChartConfig {
            id: row.id,
            report_id: row.report_id,
            chart_type: row.chart_type.parse::<ChartType>().with_context(context)?,
            aggregation: row.aggregation.parse::<Aggregation>().with_context(context)?,
            sort_direction: row.sort_by.parse::<SortDirection>().with_context(context)?,
            height: u32::try_from(row.height).with_context(context)?,
            created_at: NaiveDateTime::parse_from_str(&row.created_at, TIMESTAMP_FORMAT)
                .with_context(context)?,
            name: row.name,
            x_axis: row.x_axis,
            y_axis: row.y_axis,
            group_by: row.group_by,
            is_default: row.is_default,
        })
    }
}
