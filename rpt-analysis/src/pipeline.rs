//! The explicit `raw -> filtered -> sorted -> aggregated-per-config` pipeline.
//!
//! Each stage borrows the previous one and returns a new snapshot; the raw
//! result set is never modified. Every chart config is rendered on its own,
//! so one config with a stale column does not affect the others.

use crate::aggregate::{aggregate, AggregatedDatum, AggregationOptions, AggregationSpec, EmptyExtremum};
use crate::filter::{self, FilterSet};
use crate::sort::SortState;
use rpt_core::{ChartConfig, ChartDraft, ResultRow, ResultSet};
use serde::Serialize;

/// Filter then sort. The result feeds both the data table and every chart.
pub fn current_view<'a>(
    result_set: &'a ResultSet,
    filters: &FilterSet,
    sort_state: &SortState,
) -> Vec<&'a ResultRow> {
    let filtered = filter::apply(result_set.rows(), filters);
    sort_state.apply(&filtered)
}

/// Why a chart has (or lacks) data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    Ready,
    /// X or Y axis not chosen; the user should be prompted for both.
    MissingAxes,
    /// An axis names a column the current result set does not have.
    UnknownColumn(String),
    /// No rows to aggregate: an empty result, or every row filtered out.
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedChart {
    pub config: ChartConfig,
    pub status: RenderStatus,
    pub data: Vec<AggregatedDatum>,
}

fn check_axes(
    view: &[&ResultRow],
    columns: &[String],
    x_axis: &str,
    y_axis: &str,
    group_by: &str,
) -> RenderStatus {
    if x_axis.trim().is_empty() || y_axis.trim().is_empty() {
        return RenderStatus::MissingAxes;
    }
    if columns.is_empty() {
        return RenderStatus::NoData;
    }
    if let Some(c) = [x_axis, y_axis, group_by]
        .into_iter()
        .find(|c| !columns.iter().any(|known| known.as_str() == *c))
    {
        return RenderStatus::UnknownColumn(c.to_string());
    }
    if view.is_empty() {
        return RenderStatus::NoData;
    }
    RenderStatus::Ready
}

/// Render one unsaved chart with the single-chart cap.
pub fn render_draft(
    view: &[&ResultRow],
    columns: &[String],
    draft: &ChartDraft,
    empty_extremum: EmptyExtremum,
) -> (RenderStatus, Vec<AggregatedDatum>) {
    let status = check_axes(view, columns, &draft.x_axis, &draft.y_axis, draft.group_column());
    if status != RenderStatus::Ready {
        return (status, Vec::new());
    }
    let options = AggregationOptions::single().with_empty_extremum(empty_extremum);
    (status, aggregate(view, &AggregationSpec::from_draft(draft), &options))
}

/// Render every saved config against the same view, each with the multi-chart cap.
pub fn render_configs(
    view: &[&ResultRow],
    columns: &[String],
    configs: &[ChartConfig],
    empty_extremum: EmptyExtremum,
) -> Vec<RenderedChart> {
    let options = AggregationOptions::multi().with_empty_extremum(empty_extremum);
    let charts: Vec<RenderedChart> = configs
        .iter()
        .map(|config| {
            let status = check_axes(view, columns, &config.x_axis, &config.y_axis, config.group_column());
            let data = match status {
                RenderStatus::Ready => aggregate(view, &AggregationSpec::from_config(config), &options),
                _ => Vec::new(),
            };
            if let RenderStatus::UnknownColumn(column) = &status {
                log::warn!(
                    "[RPT Debug] render: chart {} '{}' refers to unknown column '{}'",
                    config.id,
                    config.name,
                    column
                );
            }
            RenderedChart {
                config: config.clone(),
                status,
                data,
            }
        })
        .collect();
    log::debug!(
        "[RPT Debug] render: {} charts over {} rows",
        charts.len(),
        view.len()
    );
    charts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::MULTI_CHART_CAP;
    use chrono::NaiveDate;
    use rpt_core::{Aggregation, ChartType, SortDirection};

    fn sample_result_set() -> ResultSet {
        ResultSet::from_json_str(
            r#"[
                {"branch": "Merkez", "doctor": "Ayşe", "visits": 12},
                {"branch": "Kadıköy", "doctor": "Emre", "visits": 7},
                {"branch": "Merkez", "doctor": "Emre", "visits": 3},
                {"branch": "Üsküdar", "doctor": "Ayşe", "visits": 9}
            ]"#,
        )
        .unwrap()
    }

    fn sample_config(id: i64, x: &str, y: &str, aggregation: Aggregation) -> ChartConfig {
        let created = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut draft = ChartDraft::new(ChartType::Bar, x, y, aggregation);
        draft.name = format!("chart {}", id);
        ChartConfig::from_draft(id, 1, draft, created)
    }

    #[test]
    fn current_view_filters_then_sorts() {
        let rs = sample_result_set();
        let mut filters = FilterSet::new();
        filters.set_multi_select("doctor", ["Ayşe"]);
        let mut sort_state = SortState::default();
        sort_state.activate("visits");

        let view = current_view(&rs, &filters, &sort_state);
        let visits: Vec<String> = view.iter().map(|r| r.get("visits").to_string()).collect();
        assert_eq!(visits, vec!["9", "12"]);
        assert_eq!(rs.rows()[0].get("visits").to_string(), "12", "raw rows untouched");
    }

    #[test]
    fn each_config_renders_independently() {
        let rs = sample_result_set();
        let view = current_view(&rs, &FilterSet::new(), &SortState::default());
        let configs = vec![
            sample_config(1, "branch", "visits", Aggregation::Sum),
            sample_config(2, "doctor", "visits", Aggregation::Count),
            sample_config(3, "clinic", "visits", Aggregation::Sum),
        ];
        let charts = render_configs(&view, rs.columns(), &configs, EmptyExtremum::Zero);
        assert_eq!(charts.len(), 3);

        assert_eq!(charts[0].status, RenderStatus::Ready);
        assert_eq!(charts[0].data[0].label, "Merkez");
        assert_eq!(charts[0].data[0].value, 15.0);

        assert_eq!(charts[1].status, RenderStatus::Ready);
        assert_eq!(charts[1].data.len(), 2);

        assert_eq!(charts[2].status, RenderStatus::UnknownColumn("clinic".to_string()));
        assert!(charts[2].data.is_empty());
    }

    #[test]
    fn charts_follow_the_filtered_view() {
        let rs = sample_result_set();
        let mut filters = FilterSet::new();
        filters.set_range("visits", Some(5.0), None);
        let view = current_view(&rs, &filters, &SortState::default());
        let charts = render_configs(
            &view,
            rs.columns(),
            &[sample_config(1, "branch", "visits", Aggregation::Sum)],
            EmptyExtremum::Zero,
        );
        assert_eq!(charts[0].data[0].value, 12.0);
    }

    #[test]
    fn multi_render_uses_multi_cap() {
        let rows: Vec<ResultRow> = (0..40)
            .map(|i| [("k", rpt_core::Scalar::from(format!("k{}", i))), ("v", rpt_core::Scalar::from(1.0))].into_iter().collect())
            .collect();
        let rs = ResultSet::new(rows);
        let view: Vec<&ResultRow> = rs.rows().iter().collect();
        let charts = render_configs(
            &view,
            rs.columns(),
            &[sample_config(1, "k", "v", Aggregation::Sum)],
            EmptyExtremum::Zero,
        );
        assert_eq!(charts[0].data.len(), MULTI_CHART_CAP);

        let draft = ChartDraft::new(ChartType::Bar, "k", "v", Aggregation::Sum);
        let (_, data) = render_draft(&view, rs.columns(), &draft, EmptyExtremum::Zero);
        assert_eq!(data.len(), crate::aggregate::SINGLE_CHART_CAP);
    }

    #[test]
    fn missing_axes_and_empty_data() {
        let rs = sample_result_set();
        let view: Vec<&ResultRow> = rs.rows().iter().collect();
        let mut draft = ChartDraft::new(ChartType::Pie, "branch", "", Aggregation::Sum);
        draft.sort_direction = SortDirection::Asc;
        assert_eq!(
            render_draft(&view, rs.columns(), &draft, EmptyExtremum::Zero),
            (RenderStatus::MissingAxes, Vec::new())
        );

        let empty = ResultSet::default();
        let draft = ChartDraft::new(ChartType::Pie, "branch", "visits", Aggregation::Sum);
        assert_eq!(
            render_draft(&[], empty.columns(), &draft, EmptyExtremum::Zero),
            (RenderStatus::NoData, Vec::new())
        );
    }

    #[test]
    fn header_only_csv_has_no_data() {
        let rs = ResultSet::from_csv_str("branch,visits\n").unwrap();
        assert!(rs.is_empty());
        assert_eq!(rs.columns().len(), 2);
        let view = current_view(&rs, &FilterSet::new(), &SortState::default());
        let draft = ChartDraft::new(ChartType::Bar, "branch", "visits", Aggregation::Sum);
        assert_eq!(
            render_draft(&view, rs.columns(), &draft, EmptyExtremum::Zero),
            (RenderStatus::NoData, Vec::new())
        );

        let draft = ChartDraft::new(ChartType::Bar, "clinic", "visits", Aggregation::Sum);
        assert_eq!(
            render_draft(&view, rs.columns(), &draft, EmptyExtremum::Zero).0,
            RenderStatus::UnknownColumn("clinic".to_string()),
            "a stale axis is reported even without rows"
        );
    }

    #[test]
    fn filtered_out_view_has_no_data() {
        let rs = sample_result_set();
        let mut filters = FilterSet::new();
        filters.set_range("visits", Some(100.0), None);
        let view = current_view(&rs, &filters, &SortState::default());
        let charts = render_configs(
            &view,
            rs.columns(),
            &[sample_config(1, "branch", "visits", Aggregation::Sum)],
            EmptyExtremum::Zero,
        );
        assert_eq!(charts[0].status, RenderStatus::NoData);
        assert!(charts[0].data.is_empty());
    }
}
