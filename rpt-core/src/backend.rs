//! Boundary traits for the collaborators the engine talks to.
//!
//! These are the only suspension points of a report session: running a stored
//! query and reading or writing chart configurations. Implementations are
//! one-shot request/response calls with no retry or cancellation.

use crate::chart::{ChartConfig, ChartDraft, ConfigId, ReportId};
use crate::report::{ExecuteRequest, ExecuteResponse, FilterDefinition};

/// Runs stored report queries.
#[allow(async_fn_in_trait)]
pub trait ReportExecutor {
    /// Execute a report. A backend-level failure comes back as
    /// `success: false`; `Err` is reserved for transport failures.
    async fn execute(&self, request: &ExecuteRequest) -> anyhow::Result<ExecuteResponse>;

    /// Server-side filter parameters the report accepts.
    async fn filter_definitions(&self, report_id: ReportId)
        -> anyhow::Result<Vec<FilterDefinition>>;
}

/// Persistence of chart configurations, scoped by report.
#[allow(async_fn_in_trait)]
pub trait ChartConfigStore {
    async fn list(&self, report_id: ReportId) -> anyhow::Result<Vec<ChartConfig>>;

    async fn create(&self, report_id: ReportId, draft: &ChartDraft)
        -> anyhow::Result<ChartConfig>;

    /// Replace every editable field of an existing configuration.
    async fn update(
        &self,
        report_id: ReportId,
        config_id: ConfigId,
        draft: &ChartDraft,
    ) -> anyhow::Result<ChartConfig>;

    async fn delete(&self, config_id: ConfigId) -> anyhow::Result<()>;
}
