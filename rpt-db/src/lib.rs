//! SQLite-backed report store.
//!
//! Implements both boundary traits of the engine against one SQLite
//! connection:
//!
//! - [`ReportExecutor`]: runs stored report queries over tables loaded from CSV
//! - [`ChartConfigStore`]: persists chart configurations per report
//!
//! # Architecture
//!
//! - `Rc<RefCell<Connection>>` wrapper for interior mutability on a single thread
//! - In-memory (`Database::new`) or file-backed (`Database::open`) SQLite via `rusqlite`
//! - Data tables created from CSV text by [`Database::load_table`]
//! - Typed query methods returning core types
//!
//! # Usage
//!
//! ```rust
//! use rpt_db::Database;
//! use rpt_core::report::ReportParams;
//!
//! let db = Database::new().unwrap();
//! db.load_table("visits", "branch,visits\nMerkez,12\nKadıköy,7\n").unwrap();
//! let report = db.register_report("Visits", "SELECT branch, visits FROM visits").unwrap();
//!
//! let rows = db.run_report(report, &ReportParams::new()).unwrap();
//! assert_eq!(rows.len(), 2);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.

mod executor;
mod loader;
pub mod models;
mod queries;
pub mod schema;

pub use executor::json_to_sql;
pub use loader::quote_ident;

use chrono::{Local, NaiveDateTime, Timelike};
use rpt_core::backend::{ChartConfigStore, ReportExecutor};
use rpt_core::report::{ExecuteRequest, ExecuteResponse, FilterDefinition};
use rpt_core::{ChartConfig, ChartDraft, ConfigId, ReportId};
use rusqlite::Connection;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// SQLite report store.
///
/// This struct is cheaply cloneable (via `Rc`); clones share one connection.
///
/// # Example
///
/// ```rust
/// use rpt_db::Database;
/// use rpt_core::{Aggregation, ChartDraft, ChartType};
///
/// let db = Database::new().unwrap();
/// let draft = ChartDraft::new(ChartType::Bar, "branch", "visits", Aggregation::Sum);
/// let now = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let config = db.insert_chart_config(1, &draft, now).unwrap();
/// assert_eq!(db.query_chart_configs(1).unwrap(), vec![config]);
/// ```
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    /// Open (or create) a database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        log::info!("[RPT Debug] db: opened {}", path.display());
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}

/// Creation time, at the precision the store keeps.
fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

impl ReportExecutor for Database {
    async fn execute(&self, request: &ExecuteRequest) -> anyhow::Result<ExecuteResponse> {
        match self.run_report(request.report_id, &request.params) {
            Ok(rows) => Ok(ExecuteResponse::ok(rows)),
            Err(err) => {
                log::warn!(
                    "[RPT Debug] db: report {} failed: {:#}",
                    request.report_id,
                    err
                );
                Ok(ExecuteResponse::failed(err.to_string()))
            }
        }
    }

    async fn filter_definitions(&self, report_id: ReportId) -> anyhow::Result<Vec<FilterDefinition>> {
        self.query_report_filters(report_id)
    }
}

impl ChartConfigStore for Database {
    async fn list(&self, report_id: ReportId) -> anyhow::Result<Vec<ChartConfig>> {
        self.query_chart_configs(report_id)
    }

    async fn create(&self, report_id: ReportId, draft: &ChartDraft) -> anyhow::Result<ChartConfig> {
        self.insert_chart_config(report_id, draft, now())
    }

    async fn update(
        &self,
        report_id: ReportId,
        config_id: ConfigId,
        draft: &ChartDraft,
    ) -> anyhow::Result<ChartConfig> {
        self.update_chart_config(report_id, config_id, draft)
    }

    async fn delete(&self, config_id: ConfigId) -> anyhow::Result<()> {
        self.delete_chart_config(config_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpt_core::report::ReportParams;
    use rpt_core::{Aggregation, ChartType, SortDirection};

    #[test]
    fn database_creates_successfully() {
        let db = Database::new();
        assert!(db.is_ok(), "Database should create without errors");
    }

    #[test]
    fn database_is_cloneable() {
        let db = Database::new().unwrap();
        let db2 = db.clone();
        db.load_table("visits", "branch,visits\nMerkez,12\n").unwrap();
        let id = db2.register_report("Visits", "SELECT * FROM visits").unwrap();
        assert_eq!(
            db.run_report(id, &ReportParams::new()).unwrap().len(),
            1,
            "Clone should see same data via shared Rc"
        );
    }

    #[test]
    fn file_database_persists() {
        let path = std::env::temp_dir().join(format!("rpt-db-test-{}.sqlite", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let draft = ChartDraft::new(ChartType::Bar, "branch", "visits", Aggregation::Sum);
        {
            let db = Database::open(&path).unwrap();
            db.insert_chart_config(1, &draft, now()).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.query_chart_configs(1).unwrap().len(), 1);
        drop(db);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn store_round_trips_enums_exactly() {
        let db = Database::new().unwrap();
        for chart_type in ChartType::ALL {
            for aggregation in Aggregation::ALL {
                let mut draft = ChartDraft::new(*chart_type, "x", "y", *aggregation);
                draft.name = format!("{} {}", chart_type, aggregation);
                draft.sort_direction = SortDirection::Asc;
                let created = db.create(5, &draft).await.unwrap();
                let listed = db.list(5).await.unwrap();
                let found = listed.iter().find(|c| c.id == created.id).unwrap();
                assert_eq!(found.draft(), draft);
                assert_eq!(found, &created);
            }
        }
    }

    #[tokio::test]
    async fn failed_execution_is_reported_not_raised() {
        let db = Database::new().unwrap();
        let response = db
            .execute(&ExecuteRequest::new(42, ReportParams::new()))
            .await
            .unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Report 42 not found"));
        assert!(response.into_result_set().is_err());
    }

    #[tokio::test]
    async fn execute_returns_rows() {
        let db = Database::new().unwrap();
        db.load_table("visits", "branch,visits\nMerkez,12\nKadıköy,7\n").unwrap();
        let id = db.register_report("Visits", "SELECT * FROM visits").unwrap();
        let rs = db
            .execute(&ExecuteRequest::new(id, ReportParams::new()))
            .await
            .unwrap()
            .into_result_set()
            .unwrap();
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.columns(), &["branch".to_string(), "visits".to_string()]);
        assert!(db.filter_definitions(id).await.unwrap().is_empty());
    }
}
