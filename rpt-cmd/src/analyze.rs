//! File-based analysis: profile, aggregate and export a saved result.

use crate::args::{ChartArgs, FilterArgs};
use anyhow::Context;
use log::info;
use rpt_analysis::aggregate::EmptyExtremum;
use rpt_analysis::{classify, export, pipeline, suggest, RenderStatus};
use rpt_core::ResultSet;
use rpt_session::AxisSelection;
use std::path::Path;

/// Read a result file: `.json` as an array of objects, anything else as CSV.
pub async fn load_result_set(path: &Path) -> anyhow::Result<ResultSet> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        ResultSet::from_json_str(&text)
    } else {
        ResultSet::from_csv_str(&text)
    }
}

pub async fn run_profile(input: &Path) -> anyhow::Result<()> {
    let rs = load_result_set(input).await?;
    let profiles = classify::classify(&rs);
    let output = serde_json::json!({
        "rows": rs.len(),
        "profiles": profiles,
        "suggestions": suggest::suggest(&profiles),
        "default_chart": suggest::default_chart(&profiles),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub async fn run_aggregate(
    input: &Path,
    filters: &FilterArgs,
    chart: &ChartArgs,
    empty_extremum: EmptyExtremum,
) -> anyhow::Result<()> {
    let rs = load_result_set(input).await?;
    let profiles = classify::classify(&rs);

    let mut axes = AxisSelection::default();
    chart.apply_to(&mut axes);
    axes.apply_defaults(&suggest::default_chart(&profiles));
    let draft = axes
        .to_draft()
        .context("choose both --x-axis and --y-axis; no default could be suggested")?;

    let view = pipeline::current_view(&rs, &filters.filter_set(), &filters.sort_state());
    let (status, data) = pipeline::render_draft(&view, rs.columns(), &draft, empty_extremum);
    if let RenderStatus::UnknownColumn(column) = &status {
        anyhow::bail!("unknown column '{}'", column);
    }
    info!(
        "Aggregated {} of {} rows into {} groups",
        view.len(),
        rs.len(),
        data.len()
    );
    let output = serde_json::json!({
        "chart": draft,
        "status": status,
        "data": data,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub async fn run_export(input: &Path, filters: &FilterArgs, output: &Path) -> anyhow::Result<()> {
    let rs = load_result_set(input).await?;
    let view = pipeline::current_view(&rs, &filters.filter_set(), &filters.sort_state());
    let text = export::export_delimited_string(rs.columns(), &view)?;
    tokio::fs::write(output, text)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    info!("Exported {} rows to {}", view.len(), output.display());
    Ok(())
}
