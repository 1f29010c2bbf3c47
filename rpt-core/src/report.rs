//! Payloads exchanged with the report execution backend.
//!
//! Server-side filter parameters (`ReportParams`) are separate from the
//! client-side filters applied by the analysis engine: they shape what the
//! stored query returns, the engine only narrows what came back.

use crate::chart::ReportId;
use crate::result_set::{ResultRow, ResultSet};
use crate::scalar::Scalar;
use chrono::NaiveDate;
use rpt_utils::dates::format_date;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameter values sent along with an execution request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportParams(BTreeMap<String, serde_json::Value>);

impl ReportParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: serde_json::Value) -> &mut Self {
        self.0.insert(name.into(), value);
        self
    }

    /// Single-choice select: the chosen option id.
    pub fn select_one(&mut self, name: &str, id: &Scalar) -> &mut Self {
        self.set(name, scalar_to_json(id))
    }

    /// Multi-choice select: an array of option ids. An empty choice removes the parameter.
    pub fn select_many(&mut self, name: &str, ids: &[Scalar]) -> &mut Self {
        if ids.is_empty() {
            self.0.remove(name);
            return self;
        }
        let values = ids.iter().map(scalar_to_json).collect();
        self.set(name, serde_json::Value::Array(values))
    }

    /// Date range: `<name>_start` and `<name>_end` as ISO dates, each only if given.
    pub fn date_range(
        &mut self,
        name: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> &mut Self {
        if let Some(start) = start {
            self.set(format!("{}_start", name), format_date(&start).into());
        }
        if let Some(end) = end {
            self.set(format!("{}_end", name), format_date(&end).into());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn scalar_to_json(value: &Scalar) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

/// Request to run a stored report query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub report_id: ReportId,
    #[serde(default)]
    pub params: ReportParams,
}

impl ExecuteRequest {
    pub fn new(report_id: ReportId, params: ReportParams) -> Self {
        Self { report_id, params }
    }
}

/// Backend answer to an [`ExecuteRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<ResultRow>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ExecuteResponse {
    pub fn ok(results: Vec<ResultRow>) -> Self {
        Self {
            success: true,
            results,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            results: Vec::new(),
            message: Some(message.into()),
        }
    }

    /// The rows as a result set, or the backend's message as an error.
    pub fn into_result_set(self) -> anyhow::Result<ResultSet> {
        if !self.success {
            anyhow::bail!(
                "{}",
                self.message
                    .unwrap_or_else(|| "Report execution failed".to_string())
            );
        }
        Ok(ResultSet::new(self.results))
    }
}

/// UI kind of a server-side report filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Select,
    DateRange,
}

/// One selectable option of a `select` filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub id: Scalar,
    pub name: String,
}

/// Declaration of a server-side parameter a report accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinition {
    /// Parameter name as used in `params` (and as `:name` in the stored query).
    pub name: String,
    #[serde(default)]
    pub label: String,
    pub kind: FilterKind,
    /// Only meaningful for `select`.
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub options: Vec<FilterOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinitionsResponse {
    pub success: bool,
    #[serde(default)]
    pub filters: Vec<FilterDefinition>,
    #[serde(default)]
    pub message: Option<String>,
}
