//! Report-detail session: the loaded result and everything derived from it.

use crate::capability::Capability;
use crate::editor::{AxisSelection, EditSession};
use crate::error::SessionError;
use rpt_analysis::aggregate::EmptyExtremum;
use rpt_analysis::suggest::{self, DefaultChart, Suggestion};
use rpt_analysis::summary::{self, ReportSummary};
use rpt_analysis::{classify, export, pipeline, FilterSet, RenderStatus, SortState};
use rpt_analysis::AggregatedDatum;
use rpt_core::backend::ReportExecutor;
use rpt_core::report::{ExecuteRequest, ExecuteResponse, FilterDefinition, ReportParams};
use rpt_core::{ChartConfig, ColumnProfile, ReportId, ResultRow, ResultSet};
use std::io::Write;

/// An issued execution request. Only the most recently issued ticket's
/// outcome is applied to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionTicket {
    id: u64,
    request: ExecuteRequest,
}

impl ExecutionTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn request(&self) -> &ExecuteRequest {
        &self.request
    }
}

/// State of one open report.
///
/// Owns the raw result set (never modified after it arrives) plus the
/// filter, sort and editor state. Views, chart data and summaries are
/// recomputed from these on every call.
pub struct ReportSession<E, S> {
    pub(crate) report_id: ReportId,
    pub(crate) executor: E,
    pub(crate) store: S,
    pub(crate) capability: Capability,
    pub(crate) result_set: Option<ResultSet>,
    pub(crate) profiles: Vec<ColumnProfile>,
    pub(crate) configs: Vec<ChartConfig>,
    pub(crate) edit: EditSession,
    pub(crate) error_msg: Option<String>,
    issued: u64,
    filter_definitions: Vec<FilterDefinition>,
    /// Server-side parameters sent with the next execution.
    pub params: ReportParams,
    /// Client-side filters over the loaded rows.
    pub filters: FilterSet,
    pub sort_state: SortState,
    pub axes: AxisSelection,
    pub empty_extremum: EmptyExtremum,
}

impl<E: ReportExecutor, S> ReportSession<E, S> {
    pub fn new(report_id: ReportId, executor: E, store: S, capability: Capability) -> Self {
        Self {
            report_id,
            executor,
            store,
            capability,
            result_set: None,
            profiles: Vec::new(),
            configs: Vec::new(),
            edit: EditSession::default(),
            error_msg: None,
            issued: 0,
            filter_definitions: Vec::new(),
            params: ReportParams::new(),
            filters: FilterSet::new(),
            sort_state: SortState::default(),
            axes: AxisSelection::default(),
            empty_extremum: EmptyExtremum::default(),
        }
    }

    pub fn report_id(&self) -> ReportId {
        self.report_id
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Fetch the report's server-side filter definitions.
    pub async fn load_filter_definitions(&mut self) -> anyhow::Result<&[FilterDefinition]> {
        match self.executor.filter_definitions(self.report_id).await {
            Ok(definitions) => {
                self.filter_definitions = definitions;
                Ok(&self.filter_definitions)
            }
            Err(err) => Err(self.remote_failure(err).into()),
        }
    }

    pub fn filter_definitions(&self) -> &[FilterDefinition] {
        &self.filter_definitions
    }

    /// Issue a new execution request with the current parameters.
    pub fn begin_execution(&mut self) -> ExecutionTicket {
        self.issued += 1;
        ExecutionTicket {
            id: self.issued,
            request: ExecuteRequest::new(self.report_id, self.params.clone()),
        }
    }

    /// Apply the outcome of an execution. Returns `false` if a newer request
    /// has been issued since, in which case the outcome is dropped.
    pub fn complete_execution(
        &mut self,
        ticket: &ExecutionTicket,
        outcome: anyhow::Result<ExecuteResponse>,
    ) -> bool {
        if ticket.id != self.issued {
            log::debug!(
                "[RPT Debug] session: dropping stale execution {} (latest is {})",
                ticket.id,
                self.issued
            );
            return false;
        }
        match outcome.and_then(ExecuteResponse::into_result_set) {
            Ok(result_set) => self.load_result_set(result_set),
            Err(err) => {
                self.remote_failure(err);
            }
        }
        true
    }

    /// Run the report and load its result.
    pub async fn execute(&mut self) -> anyhow::Result<()> {
        let ticket = self.begin_execution();
        let outcome = self.executor.execute(ticket.request()).await;
        self.complete_execution(&ticket, outcome);
        match &self.error_msg {
            Some(message) => Err(SessionError::Remote(message.clone()).into()),
            None => Ok(()),
        }
    }
}

impl<E, S> ReportSession<E, S> {
    /// Replace the loaded result: profile it and pre-fill the chart editor.
    pub fn load_result_set(&mut self, result_set: ResultSet) {
        self.profiles = classify::classify(&result_set);
        let default = suggest::default_chart(&self.profiles);
        self.axes.apply_defaults(&default);
        self.error_msg = None;
        log::info!(
            "[RPT Debug] session: report {} loaded {} rows x {} columns",
            self.report_id,
            result_set.len(),
            result_set.columns().len()
        );
        self.result_set = Some(result_set);
    }

    pub(crate) fn remote_failure(&mut self, err: anyhow::Error) -> SessionError {
        let message = err.to_string();
        log::warn!("[RPT Debug] session: report {}: {}", self.report_id, message);
        self.error_msg = Some(message.clone());
        SessionError::Remote(message)
    }

    pub fn result_set(&self) -> Option<&ResultSet> {
        self.result_set.as_ref()
    }

    pub fn columns(&self) -> &[String] {
        self.result_set.as_ref().map(ResultSet::columns).unwrap_or(&[])
    }

    pub fn profiles(&self) -> &[ColumnProfile] {
        &self.profiles
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        suggest::suggest(&self.profiles)
    }

    pub fn default_chart(&self) -> DefaultChart {
        suggest::default_chart(&self.profiles)
    }

    /// The last backend failure, if not dismissed.
    pub fn error_msg(&self) -> Option<&str> {
        self.error_msg.as_deref()
    }

    pub fn dismiss_error(&mut self) -> Option<String> {
        self.error_msg.take()
    }

    /// Filtered and sorted rows; empty before the first result arrives.
    pub fn current_view(&self) -> Vec<&ResultRow> {
        match &self.result_set {
            Some(rs) => pipeline::current_view(rs, &self.filters, &self.sort_state),
            None => Vec::new(),
        }
    }

    /// The editor's chart over the current view, with the single-chart cap.
    pub fn ad_hoc_chart(&self) -> Result<Vec<AggregatedDatum>, SessionError> {
        if self.result_set.is_none() {
            return Err(SessionError::NoResultSet);
        }
        let draft = self.axes.to_draft().ok_or(SessionError::MissingAxes)?;
        let view = self.current_view();
        match pipeline::render_draft(&view, self.columns(), &draft, self.empty_extremum) {
            (RenderStatus::MissingAxes, _) => Err(SessionError::MissingAxes),
            (RenderStatus::UnknownColumn(column), _) => Err(SessionError::UnknownColumn(column)),
            (_, data) => Ok(data),
        }
    }

    pub fn summary(&self) -> ReportSummary {
        summary::summarize(&self.profiles, &self.current_view())
    }

    /// Write the current view as BOM-prefixed, semicolon-separated text.
    pub fn export<W: Write>(&self, writer: W) -> anyhow::Result<()> {
        if self.result_set.is_none() {
            return Err(SessionError::NoResultSet.into());
        }
        export::export_delimited(writer, self.columns(), &self.current_view())
    }
}
