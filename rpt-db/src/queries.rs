//! Chart configuration persistence.
//!
//! Configurations are scoped by report. Updates replace every editable field
//! and keep `id`, `report_id` and `created_at`. At most one configuration per
//! report carries `is_default`: saving one as default clears the flag on the
//! report's others.

use crate::models::{ChartConfigRow, TIMESTAMP_FORMAT};
use crate::Database;
use chrono::NaiveDateTime;
use rpt_core::{ChartConfig, ChartDraft, ConfigId, ReportId};
use rusqlite::{params, OptionalExtension};

const SELECT_CHART_CONFIG: &str = "SELECT id, report_id, name, chart_type, x_axis, y_axis, aggregation,
        sort_by, group_by, height, is_default, created_at
     FROM chart_configs";

impl Database {
    /// All chart configs of a report, oldest first.
    pub fn query_chart_configs(&self, report_id: ReportId) -> anyhow::Result<Vec<ChartConfig>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&format!(
            "{} WHERE report_id = ?1 ORDER BY id",
            SELECT_CHART_CONFIG
        ))?;
        let rows = stmt
            .query_map(params![report_id], ChartConfigRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        let configs = rows
            .into_iter()
            .map(ChartConfig::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;
        log::info!(
            "[RPT Debug] query: query_chart_configs({}) returned {} records",
            report_id,
            configs.len()
        );
        Ok(configs)
    }

    pub fn query_chart_config(&self, config_id: ConfigId) -> anyhow::Result<Option<ChartConfig>> {
        let conn = self.conn.borrow();
        let row = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_CHART_CONFIG),
                params![config_id],
                ChartConfigRow::from_row,
            )
            .optional()?;
        row.map(ChartConfig::try_from).transpose()
    }

    /// Insert a new config. The draft is stored as given; naming is the caller's concern.
    pub fn insert_chart_config(
        &self,
        report_id: ReportId,
        draft: &ChartDraft,
        created_at: NaiveDateTime,
    ) -> anyhow::Result<ChartConfig> {
        let id = {
            let mut conn = self.conn.borrow_mut();
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO chart_configs
                    (report_id, name, chart_type, x_axis, y_axis, aggregation, sort_by,
                     group_by, height, is_default, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    report_id,
                    draft.name,
                    draft.chart_type.as_str(),
                    draft.x_axis,
                    draft.y_axis,
                    draft.aggregation.as_str(),
                    draft.sort_direction.as_str(),
                    draft.group_by,
                    i64::from(draft.height),
                    draft.is_default,
                    created_at.format(TIMESTAMP_FORMAT).to_string(),
                ],
            )?;
            let id = tx.last_insert_rowid();
            if draft.is_default {
                clear_other_defaults(&tx, report_id, id)?;
            }
            tx.commit()?;
            id
        };
        log::info!(
            "[RPT Debug] query: inserted chart config {} for report {}",
            id,
            report_id
        );
        self.query_chart_config(id)?
            .ok_or_else(|| anyhow::anyhow!("chart config {} vanished after insert", id))
    }

    /// Replace the editable fields of a config that belongs to `report_id`.
    pub fn update_chart_config(
        &self,
        report_id: ReportId,
        config_id: ConfigId,
        draft: &ChartDraft,
    ) -> anyhow::Result<ChartConfig> {
        {
            let mut conn = self.conn.borrow_mut();
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE chart_configs
                 SET name = ?3, chart_type = ?4, x_axis = ?5, y_axis = ?6, aggregation = ?7,
                     sort_by = ?8, group_by = ?9, height = ?10, is_default = ?11
                 WHERE id = ?1 AND report_id = ?2",
                params![
                    config_id,
                    report_id,
                    draft.name,
                    draft.chart_type.as_str(),
                    draft.x_axis,
                    draft.y_axis,
                    draft.aggregation.as_str(),
                    draft.sort_direction.as_str(),
                    draft.group_by,
                    i64::from(draft.height),
                    draft.is_default,
                ],
            )?;
            if changed == 0 {
                anyhow::bail!(
                    "chart config {} not found for report {}",
                    config_id,
                    report_id
                );
            }
            if draft.is_default {
                clear_other_defaults(&tx, report_id, config_id)?;
            }
            tx.commit()?;
        }
        log::info!("[RPT Debug] query: updated chart config {}", config_id);
        self.query_chart_config(config_id)?
            .ok_or_else(|| anyhow::anyhow!("chart config {} vanished after update", config_id))
    }

    pub fn delete_chart_config(&self, config_id: ConfigId) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let changed = conn.execute("DELETE FROM chart_configs WHERE id = ?1", params![config_id])?;
        if changed == 0 {
            anyhow::bail!("chart config {} not found", config_id);
        }
        log::info!("[RPT Debug] query: deleted chart config {}", config_id);
        Ok(())
    }
}

fn clear_other_defaults(
    conn: &rusqlite::Connection,
    report_id: ReportId,
    keep: ConfigId,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE chart_configs SET is_default = 0 WHERE report_id = ?1 AND id != ?2",
        params![report_id, keep],
    )
}
