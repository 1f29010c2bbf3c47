//! Shared argument groups and `COLUMN=VALUE` style argument parsers.

use chrono::NaiveDate;
use clap::Args;
use rpt_analysis::aggregate::EmptyExtremum;
use rpt_analysis::{FilterSet, SortState};
use rpt_core::report::ReportParams;
use rpt_core::{Aggregation, ChartType, SortDirection};
use rpt_session::{AxisSelection, Role};
use rpt_utils::dates::parse_date_arg;
use rpt_utils::numbers::parse_number;
use std::path::PathBuf;
use std::str::FromStr;

fn split_assignment<'a>(s: &'a str, expected: &str) -> anyhow::Result<(&'a str, &'a str)> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => anyhow::bail!("expected {}, got '{}'", expected, s),
    }
}

fn split_bounds(s: &str) -> (Option<&str>, Option<&str>) {
    let (lo, hi) = s.split_once("..").unwrap_or((s, s));
    fn side(v: &str) -> Option<&str> {
        Some(v.trim()).filter(|v| !v.is_empty())
    }
    (side(lo), side(hi))
}

/// `COLUMN=TEXT`
#[derive(Debug, Clone, PartialEq)]
pub struct SearchArg {
    pub column: String,
    pub query: String,
}

impl FromStr for SearchArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, query) = split_assignment(s, "COLUMN=TEXT")?;
        Ok(Self {
            column: column.to_string(),
            query: query.to_string(),
        })
    }
}

/// `COLUMN=MIN..MAX`; either bound may be left out (`n=5..`, `n=..10`), `n=5` means exactly 5.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeArg {
    pub column: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FromStr for RangeArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, bounds) = split_assignment(s, "COLUMN=MIN..MAX")?;
        let (lo, hi) = split_bounds(bounds);
        let number = |v: Option<&str>| -> anyhow::Result<Option<f64>> {
            v.map(|v| parse_number(v).ok_or_else(|| anyhow::anyhow!("'{}' is not a number", v)))
                .transpose()
        };
        Ok(Self {
            column: column.to_string(),
            min: number(lo)?,
            max: number(hi)?,
        })
    }
}

/// `COLUMN=START..END` with any recognized date layout.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRangeArg {
    pub column: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl FromStr for DateRangeArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, bounds) = split_assignment(s, "COLUMN=START..END")?;
        let (lo, hi) = split_bounds(bounds);
        Ok(Self {
            column: column.to_string(),
            start: lo.map(parse_date_arg).transpose()?,
            end: hi.map(parse_date_arg).transpose()?,
        })
    }
}

/// `COLUMN=A,B,C`
#[derive(Debug, Clone, PartialEq)]
pub struct SelectArg {
    pub column: String,
    pub values: Vec<String>,
}

impl FromStr for SelectArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, values) = split_assignment(s, "COLUMN=A,B,...")?;
        Ok(Self {
            column: column.to_string(),
            values: values
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect(),
        })
    }
}

/// `NAME=VALUE` server-side parameter; VALUE is JSON if it parses as JSON, else a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamArg {
    pub name: String,
    pub value: serde_json::Value,
}

impl FromStr for ParamArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, raw) = split_assignment(s, "NAME=VALUE")?;
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        Ok(Self {
            name: name.to_string(),
            value,
        })
    }
}

pub fn report_params(params: &[ParamArg]) -> ReportParams {
    let mut out = ReportParams::new();
    for p in params {
        out.set(p.name.clone(), p.value.clone());
    }
    out
}

/// Options every command accepts.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// SQLite database file (in-memory when omitted)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Base URL of the report API; when set, reports and charts come from it
    #[arg(long, global = true)]
    pub api: Option<String>,

    /// Session role; only admins may change saved charts
    #[arg(long, global = true, default_value = "viewer")]
    pub role: Role,

    /// What min/max report for groups without numeric values (zero or exclude)
    #[arg(long, global = true, default_value = "zero")]
    pub empty_extremum: EmptyExtremum,
}

/// Client-side filters and sorting of the loaded rows.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Free-text search across every column
    #[arg(long)]
    pub search_all: Option<String>,

    /// Case-insensitive substring filter on one column (repeatable)
    #[arg(long = "search", value_name = "COLUMN=TEXT")]
    pub search: Vec<SearchArg>,

    /// Inclusive numeric range filter (repeatable)
    #[arg(long = "range", value_name = "COLUMN=MIN..MAX")]
    pub range: Vec<RangeArg>,

    /// Inclusive date range filter (repeatable)
    #[arg(long = "dates", value_name = "COLUMN=START..END")]
    pub dates: Vec<DateRangeArg>,

    /// Keep rows whose value is one of the listed values (repeatable)
    #[arg(long = "select", value_name = "COLUMN=A,B")]
    pub select: Vec<SelectArg>,

    /// Sort the table by this column
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

impl FilterArgs {
    pub fn filter_set(&self) -> FilterSet {
        let mut filters = FilterSet::new();
        if let Some(query) = &self.search_all {
            filters.set_global_search(query);
        }
        for s in &self.search {
            filters.set_search(&s.column, &s.query);
        }
        for r in &self.range {
            filters.set_range(&r.column, r.min, r.max);
        }
        for d in &self.dates {
            filters.set_date_range(&d.column, d.start, d.end);
        }
        for s in &self.select {
            filters.set_multi_select(&s.column, s.values.iter().cloned());
        }
        filters
    }

    pub fn sort_state(&self) -> SortState {
        let mut state = SortState::default();
        if let Some(column) = &self.sort {
            state.activate(column);
            if self.desc {
                state.activate(column);
            }
        }
        state
    }
}

/// Chart editor fields. Unset fields keep their current (or suggested) value.
#[derive(Args, Debug, Clone, Default)]
pub struct ChartArgs {
    /// bar, line, pie, area, scatter, heatmap or table
    #[arg(long = "type")]
    pub chart_type: Option<ChartType>,

    /// Column on the X axis
    #[arg(short = 'x', long = "x-axis")]
    pub x_axis: Option<String>,

    /// Column aggregated on the Y axis
    #[arg(short = 'y', long = "y-axis")]
    pub y_axis: Option<String>,

    /// Group by this column instead of the X axis
    #[arg(long)]
    pub group_by: Option<String>,

    /// sum, count, average, min or max
    #[arg(long = "agg")]
    pub aggregation: Option<Aggregation>,

    /// Order groups by value: asc or desc
    #[arg(long)]
    pub order: Option<SortDirection>,

    /// Chart name
    #[arg(long)]
    pub name: Option<String>,

    /// Chart height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Make this the report's default chart
    #[arg(long = "default", conflicts_with = "no_default")]
    pub is_default: bool,

    /// Stop this chart being the report's default
    #[arg(long = "no-default")]
    pub no_default: bool,
}

impl ChartArgs {
    pub fn apply_to(&self, axes: &mut AxisSelection) {
        if let Some(t) = self.chart_type {
            axes.chart_type = Some(t);
        }
        if let Some(x) = &self.x_axis {
            axes.x_axis = Some(x.clone());
        }
        if let Some(y) = &self.y_axis {
            axes.y_axis = Some(y.clone());
        }
        if let Some(g) = &self.group_by {
            axes.group_by = Some(g.clone());
        }
        if let Some(a) = self.aggregation {
            axes.aggregation = a;
        }
        if let Some(o) = self.order {
            axes.sort_direction = o;
        }
        if let Some(n) = &self.name {
            axes.name = n.clone();
        }
        if let Some(h) = self.height {
            axes.height = h;
        }
        if self.no_default {
            axes.is_default = false;
        }
        if self.is_default {
            axes.is_default = true;
        }
    }
}
