//! Loading data tables and registering stored reports.
//!
//! A CSV file becomes one table named by the caller; the header row gives the
//! column names. Cells that parse as numbers are stored as numbers, empty
//! cells as NULL, everything else as text, so stored queries can aggregate
//! and compare them natively.

use crate::Database;
use rpt_core::report::FilterDefinition;
use rpt_core::ReportId;
use rpt_utils::numbers::parse_number;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};

/// Quote an SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn cell_value(cell: &str) -> Value {
    let cell = cell.trim();
    if cell.is_empty() {
        return Value::Null;
    }
    match cell.parse::<i64>() {
        Ok(n) => Value::Integer(n),
        Err(_) => match parse_number(cell) {
            Some(f) => Value::Real(f),
            None => Value::Text(cell.to_string()),
        },
    }
}

impl Database {
    /// Replace `table` with the contents of a CSV string (with headers).
    ///
    /// Returns the number of rows loaded.
    ///
    /// # Example CSV
    /// ```text
    /// branch,day,visits
    /// Merkez,2024-03-01,12
    /// ```
    pub fn load_table(&self, table: &str, csv_data: &str) -> anyhow::Result<usize> {
        let mut conn = self.conn.borrow_mut();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();
        if headers.is_empty() || headers.iter().any(String::is_empty) {
            anyhow::bail!("table '{}' needs a header row without blank names", table);
        }

        let tx = conn.transaction()?;
        let column_list = headers
            .iter()
            .map(|h| quote_ident(h))
            .collect::<Vec<_>>()
            .join(", ");
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table};
             CREATE TABLE {table} ({columns});",
            table = quote_ident(table),
            columns = column_list
        ))?;

        let placeholders = vec!["?"; headers.len()].join(", ");
        let insert = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            column_list,
            placeholders
        );
        let mut count = 0usize;
        {
            let mut stmt = tx.prepare(&insert)?;
            for result in rdr.records() {
                let r = result?;
                let values = (0..headers.len()).map(|i| cell_value(r.get(i).unwrap_or("")));
                stmt.execute(params_from_iter(values))?;
                count += 1;
            }
        }
        tx.commit()?;
        log::info!(
            "[RPT Debug] loader: Loaded {} rows into table '{}'",
            count,
            table
        );
        Ok(count)
    }

    /// Store a report query. Parameters are written as `:name`.
    pub fn register_report(&self, name: &str, query_sql: &str) -> anyhow::Result<ReportId> {
        let conn = self.conn.borrow();
        conn.execute(
            "INSERT INTO reports (name, query_sql) VALUES (?1, ?2)",
            params![name, query_sql],
        )?;
        let id = conn.last_insert_rowid();
        log::info!("[RPT Debug] loader: Registered report {} '{}'", id, name);
        Ok(id)
    }

    /// Declare a server-side parameter of a report, replacing one of the same name.
    pub fn add_report_filter(
        &self,
        report_id: ReportId,
        filter: &FilterDefinition,
    ) -> anyhow::Result<()> {
        let kind = serde_json::to_value(filter.kind)?;
        let conn = self.conn.borrow();
        conn.execute(
            "INSERT OR REPLACE INTO report_filters (report_id, name, label, kind, multiple, options_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                report_id,
                filter.name,
                filter.label,
                kind.as_str().unwrap_or("select"),
                filter.multiple,
                serde_json::to_string(&filter.options)?,
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpt_core::report::{FilterKind, FilterOption};

    const VISITS_CSV: &str = "\u{feff}branch,day,visits,revenue\n\
        Merkez,2024-03-01,12,1500.5\n\
        Kadıköy,2024-03-01,7,\n\
        Merkez,2024-03-02,3,420\n";

    #[test]
    fn cell_values_are_typed() {
        assert_eq!(cell_value("12"), Value::Integer(12));
        assert_eq!(cell_value(" 1500.5 "), Value::Real(1500.5));
        assert_eq!(cell_value(""), Value::Null);
        assert_eq!(cell_value("Merkez"), Value::Text("Merkez".to_string()));
        assert_eq!(cell_value("2024-03-01"), Value::Text("2024-03-01".to_string()));
    }

    #[test]
    fn load_table_creates_and_replaces() {
        let db = Database::new().unwrap();
        assert_eq!(db.load_table("visits", VISITS_CSV).unwrap(), 3);
        // Loading again replaces rather than appends.
        assert_eq!(db.load_table("visits", VISITS_CSV).unwrap(), 3);

        let conn = db.conn.borrow();
        let total: f64 = conn
            .query_row("SELECT SUM(visits) FROM visits", [], |row| row.get(0))
            .unwrap();
        assert_eq!(total, 22.0);
        let nulls: i64 = conn
            .query_row("SELECT COUNT(*) FROM visits WHERE revenue IS NULL", [], |row| row.get(0))
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn load_table_rejects_blank_headers() {
        let db = Database::new().unwrap();
        assert!(db.load_table("bad", "a,,c\n1,2,3\n").is_err());
    }

    #[test]
    fn quoted_identifiers() {
        assert_eq!(quote_ident("visits"), "\"visits\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn filters_are_stored_per_report() {
        let db = Database::new().unwrap();
        let id = db.register_report("Visits", "SELECT * FROM visits").unwrap();
        let filter = FilterDefinition {
            name: "branch".to_string(),
            label: "Şube".to_string(),
            kind: FilterKind::Select,
            multiple: true,
            options: vec![FilterOption {
                id: "Merkez".into(),
                name: "Merkez".to_string(),
            }],
        };
        db.add_report_filter(id, &filter).unwrap();
        db.add_report_filter(id, &filter).unwrap();
        let conn = db.conn.borrow();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM report_filters WHERE report_id = ?1", [id], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
