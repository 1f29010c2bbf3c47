//! Saved charts of a report: CRUD through the store, then a full reload.
//!
//! Mutations require the session's edit capability and always re-list the
//! report's configs afterwards, so the rendered set is what the store holds.
//! Deleting does not ask for confirmation; callers confirm first.

use crate::editor::AxisSelection;
use crate::error::SessionError;
use crate::session::ReportSession;
use chrono::Local;
use rpt_analysis::pipeline::{self, RenderedChart};
use rpt_core::backend::ChartConfigStore;
use rpt_core::{ChartConfig, ConfigId};

impl<E, S: ChartConfigStore> ReportSession<E, S> {
    /// Saved configs as of the last reload.
    pub fn charts(&self) -> &[ChartConfig] {
        &self.configs
    }

    /// Re-list this report's configs from the store.
    pub async fn reload_charts(&mut self) -> anyhow::Result<&[ChartConfig]> {
        match self.store.list(self.report_id).await {
            Ok(configs) => {
                log::info!(
                    "[RPT Debug] board: report {} has {} charts",
                    self.report_id,
                    configs.len()
                );
                self.configs = configs;
                Ok(&self.configs)
            }
            Err(err) => Err(self.remote_failure(err).into()),
        }
    }

    /// The saved config being edited, if any.
    pub fn editing(&self) -> Option<ConfigId> {
        self.edit.editing()
    }

    /// Load a saved config into the editor and bind the editor to its id.
    pub fn begin_edit(&mut self, config_id: ConfigId) -> anyhow::Result<()> {
        self.capability.require_chart_edit()?;
        let config = self
            .configs
            .iter()
            .find(|c| c.id == config_id)
            .ok_or_else(|| anyhow::anyhow!("chart config {} is not loaded", config_id))?;
        self.axes = AxisSelection::from_config(config);
        self.edit.begin(config_id);
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.edit.clear();
    }

    /// Save the editor: update the bound config, or create a new one.
    ///
    /// A blank name becomes a timestamped default on create.
    pub async fn save_chart(&mut self) -> anyhow::Result<ChartConfig> {
        self.capability.require_chart_edit()?;
        let draft = self.axes.to_draft().ok_or(SessionError::MissingAxes)?;

        let outcome = match self.edit.editing() {
            Some(config_id) => self.store.update(self.report_id, config_id, &draft).await,
            None => {
                let draft = draft.with_default_name(Local::now().naive_local());
                self.store.create(self.report_id, &draft).await
            }
        };
        let saved = match outcome {
            Ok(saved) => saved,
            Err(err) => return Err(self.remote_failure(err).into()),
        };
        log::info!(
            "[RPT Debug] board: saved chart {} '{}' for report {}",
            saved.id,
            saved.name,
            self.report_id
        );
        self.edit.clear();
        self.reload_charts().await?;
        Ok(saved)
    }

    /// Delete one config. Confirmation is the caller's job.
    pub async fn delete_chart(&mut self, config_id: ConfigId) -> anyhow::Result<()> {
        self.capability.require_chart_edit()?;
        if let Err(err) = self.store.delete(config_id).await {
            return Err(self.remote_failure(err).into());
        }
        if self.edit.editing() == Some(config_id) {
            self.edit.clear();
        }
        log::info!("[RPT Debug] board: deleted chart {}", config_id);
        self.reload_charts().await?;
        Ok(())
    }

    /// Every saved chart, each aggregated independently over the current view.
    pub fn render_all(&self) -> Vec<RenderedChart> {
        let view = self.current_view();
        pipeline::render_configs(&view, self.columns(), &self.configs, self.empty_extremum)
    }
}
