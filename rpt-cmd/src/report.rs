//! Stored reports: loading tables, registering queries, executing and fetching.

use crate::args::{report_params, FilterArgs, GlobalArgs, ParamArg};
use anyhow::Context;
use log::info;
use rpt_core::api::ApiClient;
use rpt_core::backend::{ChartConfigStore, ReportExecutor};
use rpt_core::report::{ExecuteRequest, FilterDefinition};
use rpt_core::ReportId;
use rpt_db::Database;
use rpt_session::{Capability, ReportSession};
use std::path::{Path, PathBuf};

/// Open the SQLite store named by `--db`, or a fresh in-memory one.
pub fn open_database(globals: &GlobalArgs) -> anyhow::Result<Database> {
    match &globals.db {
        Some(path) => Database::open(path),
        None => Database::new(),
    }
}

fn require_db_file(globals: &GlobalArgs) -> anyhow::Result<&PathBuf> {
    globals
        .db
        .as_ref()
        .context("--db is required; an in-memory database would be discarded on exit")
}

pub async fn run_load(globals: &GlobalArgs, table: &str, csv: &Path) -> anyhow::Result<()> {
    let db = Database::open(require_db_file(globals)?)?;
    let data = tokio::fs::read_to_string(csv)
        .await
        .with_context(|| format!("reading {}", csv.display()))?;
    let count = db.load_table(table, &data)?;
    println!("Loaded {} rows into '{}'", count, table);
    Ok(())
}

pub async fn run_register(
    globals: &GlobalArgs,
    name: &str,
    sql: &str,
    filters_json: Option<&Path>,
) -> anyhow::Result<()> {
    let db = Database::open(require_db_file(globals)?)?;
    let filters: Vec<FilterDefinition> = match filters_json {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Vec::new(),
    };
    let id = db.register_report(name, sql)?;
    for filter in &filters {
        db.add_report_filter(id, filter)?;
    }
    println!("Registered report {} '{}' with {} filters", id, name, filters.len());
    Ok(())
}

/// Execute a report, then render every saved chart over the filtered view.
pub async fn run_report<B>(
    backend: B,
    globals: &GlobalArgs,
    report_id: ReportId,
    params: &[ParamArg],
    filters: &FilterArgs,
    summary: bool,
    export: Option<&Path>,
) -> anyhow::Result<()>
where
    B: ReportExecutor + ChartConfigStore + Clone,
{
    let mut session = ReportSession::new(
        report_id,
        backend.clone(),
        backend,
        Capability::for_role(globals.role),
    );
    session.params = report_params(params);
    session.filters = filters.filter_set();
    session.sort_state = filters.sort_state();
    session.empty_extremum = globals.empty_extremum;

    session.execute().await?;
    session.reload_charts().await?;
    let view_len = session.current_view().len();
    info!(
        "Report {} returned {} rows, {} after filters",
        report_id,
        session.result_set().map_or(0, |rs| rs.len()),
        view_len
    );

    let mut output = serde_json::json!({
        "report_id": report_id,
        "rows": view_len,
        "charts": session.render_all(),
    });
    if summary {
        output["summary"] = serde_json::to_value(session.summary())?;
    }
    println!("{}", serde_json::to_string_pretty(&output)?);

    if let Some(path) = export {
        let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
        session.export(std::io::BufWriter::new(file))?;
        info!("Exported {} rows to {}", view_len, path.display());
    }
    Ok(())
}

/// Execute a report on the remote API and write the raw rows as JSON.
pub async fn run_fetch(
    globals: &GlobalArgs,
    report_id: ReportId,
    params: &[ParamArg],
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let base_url = globals.api.as_deref().context("--api is required for fetch")?;
    let client = ApiClient::new(base_url)?;
    let request = ExecuteRequest::new(report_id, report_params(params));
    let rs = client.execute(&request).await?.into_result_set()?;
    let json = serde_json::to_string_pretty(&rs.rows())?;
    match output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote {} rows to {}", rs.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
