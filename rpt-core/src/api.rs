//! HTTP client for the report backend.
//!
//! Implements [`ReportExecutor`] and [`ChartConfigStore`] against the JSON
//! endpoints of the admin console backend:
//!
//! - `POST   /reports/{id}/execute`                 run a stored query
//! - `GET    /reports/{id}/filters`                 server-side filter definitions
//! - `GET    /reports/{id}/chart-configs`           list chart configs
//! - `POST   /reports/{id}/chart-config`            create
//! - `PUT    /reports/{id}/chart-config/{configId}` full update
//! - `DELETE /reports/chart-config/{configId}`      delete
//!
//! Every call is a single request. There is no retry and no client-side
//! timeout; a failed call surfaces as an error for the caller to display.

use crate::backend::{ChartConfigStore, ReportExecutor};
use crate::chart::{ChartConfig, ChartDraft, ConfigId, ReportId};
use crate::report::{ExecuteRequest, ExecuteResponse, FilterDefinition, FilterDefinitionsResponse};
use log::{info, warn};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Endpoint paths, relative to the API base URL.
pub mod paths {
    use crate::chart::{ConfigId, ReportId};

    pub fn execute(report_id: ReportId) -> String {
        format!("/reports/{}/execute", report_id)
    }

    pub fn filters(report_id: ReportId) -> String {
        format!("/reports/{}/filters", report_id)
    }

    pub fn chart_configs(report_id: ReportId) -> String {
        format!("/reports/{}/chart-configs", report_id)
    }

    pub fn create_chart_config(report_id: ReportId) -> String {
        format!("/reports/{}/chart-config", report_id)
    }

    pub fn update_chart_config(report_id: ReportId, config_id: ConfigId) -> String {
        format!("/reports/{}/chart-config/{}", report_id, config_id)
    }

    pub fn delete_chart_config(config_id: ConfigId) -> String {
        format!("/reports/chart-config/{}", config_id)
    }
}

#[derive(Debug, Serialize)]
struct ExecuteBody<'a> {
    params: &'a crate::report::ReportParams,
}

#[derive(Debug, Deserialize)]
struct ChartConfigListResponse {
    success: bool,
    #[serde(default)]
    configs: Vec<ChartConfig>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartConfigResponse {
    success: bool,
    #[serde(default)]
    config: Option<ChartConfig>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// The backend's `message` from an error body, if it sent one.
fn error_body_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|r| r.message)
        .filter(|m| !m.trim().is_empty())
}

fn failure(message: Option<String>, what: &str) -> anyhow::Error {
    let message = message.unwrap_or_else(|| format!("{} failed", what));
    warn!("[RPT Debug] api: {}: {}", what, message);
    anyhow::anyhow!(message)
}

/// JSON client for the report backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read<T: DeserializeOwned>(response: Response, what: &str) -> anyhow::Result<T> {
        let status = response.status();
        if !status.is_success() {
            warn!("[RPT Debug] api: {} returned HTTP {}", what, status);
            let body = response.text().await.unwrap_or_default();
            match error_body_message(&body) {
                Some(message) => anyhow::bail!("{}", message),
                None => anyhow::bail!("{} failed: HTTP {}", what, status),
            }
        }
        Ok(response.json::<T>().await?)
    }
}

impl ReportExecutor for ApiClient {
    async fn execute(&self, request: &ExecuteRequest) -> anyhow::Result<ExecuteResponse> {
        let url = self.url(&paths::execute(request.report_id));
        let response = self
            .client
            .post(&url)
            .json(&ExecuteBody {
                params: &request.params,
            })
            .send()
            .await?;
        let body: ExecuteResponse = Self::read(response, "execute report").await?;
        info!(
            "[RPT Debug] api: report {} returned {} rows (success={})",
            request.report_id,
            body.results.len(),
            body.success
        );
        Ok(body)
    }

    async fn filter_definitions(
        &self,
        report_id: ReportId,
    ) -> anyhow::Result<Vec<FilterDefinition>> {
        let response = self
            .client
            .get(self.url(&paths::filters(report_id)))
            .send()
            .await?;
        let body: FilterDefinitionsResponse = Self::read(response, "list report filters").await?;
        if !body.success {
            return Err(failure(body.message, "list report filters"));
        }
        Ok(body.filters)
    }
}

impl ChartConfigStore for ApiClient {
    async fn list(&self, report_id: ReportId) -> anyhow::Result<Vec<ChartConfig>> {
        let response = self
            .client
            .get(self.url(&paths::chart_configs(report_id)))
            .send()
            .await?;
        let body: ChartConfigListResponse = Self::read(response, "list chart configs").await?;
        if !body.success {
            return Err(failure(body.message, "list chart configs"));
        }
        info!(
            "[RPT Debug] api: report {} has {} chart configs",
            report_id,
            body.configs.len()
        );
        Ok(body.configs)
    }

    async fn create(&self, report_id: ReportId, draft: &ChartDraft) -> anyhow::Result<ChartConfig> {
        let response = self
            .client
            .post(self.url(&paths::create_chart_config(report_id)))
            .json(draft)
            .send()
            .await?;
        let body: ChartConfigResponse = Self::read(response, "create chart config").await?;
        match body {
            ChartConfigResponse {
                success: true,
                config: Some(config),
                ..
            } => Ok(config),
            ChartConfigResponse { message, .. } => Err(failure(message, "create chart config")),
        }
    }

    async fn update(
        &self,
        report_id: ReportId,
        config_id: ConfigId,
        draft: &ChartDraft,
    ) -> anyhow::Result<ChartConfig> {
        let response = self
            .client
            .put(self.url(&paths::update_chart_config(report_id, config_id)))
            .json(draft)
            .send()
            .await?;
        let body: ChartConfigResponse = Self::read(response, "update chart config").await?;
        match body {
            ChartConfigResponse {
                success: true,
                config: Some(config),
                ..
            } => Ok(config),
            ChartConfigResponse { message, .. } => Err(failure(message, "update chart config")),
        }
    }

    async fn delete(&self, config_id: ConfigId) -> anyhow::Result<()> {
        let response = self
            .client
            .delete(self.url(&paths::delete_chart_config(config_id)))
            .send()
            .await?;
        let body: StatusResponse = Self::read(response, "delete chart config").await?;
        if !body.success {
            return Err(failure(body.message, "delete chart config"));
        }
        Ok(())
    }
}
