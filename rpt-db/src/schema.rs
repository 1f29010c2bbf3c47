//! SQL schema for the report store.
//!
//! The schema is applied as a single batch when the database is opened.
//! Tables loaded from CSV files are created separately by the loader, one
//! table per file, and are what stored report queries select from.

/// Returns the full SQL schema as a single batch string.
///
/// - `reports` - stored report queries, with `:name` parameters
/// - `report_filters` - server-side parameters a report accepts (in insertion order)
/// - `chart_configs` - saved chart configurations, many per report
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS reports (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        query_sql TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS report_filters (
        report_id INTEGER NOT NULL REFERENCES reports(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        label TEXT NOT NULL,
        kind TEXT NOT NULL,
        multiple INTEGER NOT NULL DEFAULT 0,
        options_json TEXT NOT NULL DEFAULT '[]',
        PRIMARY KEY (report_id, name)
    );

    CREATE TABLE IF NOT EXISTS chart_configs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        report_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        chart_type TEXT NOT NULL,
        x_axis TEXT NOT NULL,
        y_axis TEXT NOT NULL,
        aggregation TEXT NOT NULL,
        sort_by TEXT NOT NULL,
        group_by TEXT,
        height INTEGER NOT NULL,
        is_default INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_chart_configs_report ON chart_configs(report_id);
    "#
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn schema_applies_cleanly() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();
        // Applying twice is a no-op.
        conn.execute_batch(create_schema()).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(tables, vec!["chart_configs", "report_filters", "reports"]);
    }
}
