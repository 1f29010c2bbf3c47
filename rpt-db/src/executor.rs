//! Stored report execution.
//!
//! A report's SQL is run as written, with named parameters (`:name`, `@name`
//! or `$name`) bound from the request's `params`. A parameter the request
//! does not carry binds as NULL. Arrays and objects bind as JSON text, so a
//! multi-select parameter is used as `x IN (SELECT value FROM json_each(:x))`.

use crate::models::StoredReport;
use crate::Database;
use rpt_core::report::{FilterDefinition, FilterKind, FilterOption, ReportParams};
use rpt_core::{ReportId, ResultRow, Scalar};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, OptionalExtension};

/// SQLite value for a JSON parameter.
pub fn json_to_sql(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(i64::from(*b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Real).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

fn scalar_from_sql(value: ValueRef<'_>) -> Scalar {
    match value {
        ValueRef::Null => Scalar::Null,
        ValueRef::Integer(n) => Scalar::Number(n as f64),
        ValueRef::Real(f) => Scalar::Number(f),
        ValueRef::Text(t) => Scalar::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Scalar::Text(format!("<{} bytes>", b.len())),
    }
}

impl Database {
    pub fn query_reports(&self) -> anyhow::Result<Vec<StoredReport>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT id, name, query_sql FROM reports ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StoredReport {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    query_sql: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[RPT Debug] query: query_reports returned {} records",
            rows.len()
        );
        Ok(rows)
    }

    pub fn query_report(&self, report_id: ReportId) -> anyhow::Result<Option<StoredReport>> {
        let conn = self.conn.borrow();
        let report = conn
            .query_row(
                "SELECT id, name, query_sql FROM reports WHERE id = ?1",
                params![report_id],
                |row| {
                    Ok(StoredReport {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        query_sql: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(report)
    }

    /// Server-side filter definitions of a report, in declaration order.
    pub fn query_report_filters(&self, report_id: ReportId) -> anyhow::Result<Vec<FilterDefinition>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT name, label, kind, multiple, options_json
             FROM report_filters
             WHERE report_id = ?1
             ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map(params![report_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, bool>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut filters = Vec::with_capacity(rows.len());
        for (name, label, kind, multiple, options_json) in rows {
            let kind: FilterKind = serde_json::from_value(serde_json::Value::String(kind))?;
            let options: Vec<FilterOption> = serde_json::from_str(&options_json)?;
            filters.push(FilterDefinition {
                name,
                label,
                kind,
                multiple,
                options,
            });
        }
        log::info!(
            "[RPT Debug] query: query_report_filters({}) returned {} records",
            report_id,
            filters.len()
        );
        Ok(filters)
    }

    /// Run a report's stored SQL with the given parameters.
    pub fn run_report(&self, report_id: ReportId, params: &ReportParams) -> anyhow::Result<Vec<ResultRow>> {
        let report = self
            .query_report(report_id)?
            .ok_or_else(|| anyhow::anyhow!("Report {} not found", report_id))?;

        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&report.query_sql)?;
        for index in 1..=stmt.parameter_count() {
            let value = stmt
                .parameter_name(index)
                .map(|name| name.trim_start_matches([':', '@', '$']))
                .and_then(|name| params.get(name))
                .map(json_to_sql)
                .unwrap_or(Value::Null);
            stmt.raw_bind_parameter(index, value)?;
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut results = Vec::new();
        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next()? {
            let mut result = ResultRow::new();
            for (i, column) in columns.iter().enumerate() {
                result.insert(column.as_str(), scalar_from_sql(row.get_ref(i)?));
            }
            results.push(result);
        }
        log::info!(
            "[RPT Debug] query: report {} '{}' returned {} rows",
            report.id,
            report.name,
            results.len()
        );
        Ok(results)
    }
}
