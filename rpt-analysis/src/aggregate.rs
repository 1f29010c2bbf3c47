//! Grouping and aggregation of a filtered view into chart data.
//!
//! Rows are grouped by the text of the group column. Each group counts every
//! row, but only Y values that parse as numbers feed the sum and extrema.
//! Groups are then ordered by their aggregate value and cut to a display cap.

use indexmap::IndexMap;
use rpt_core::{Aggregation, ChartConfig, ChartDraft, ResultRow, SortDirection};
use rpt_utils::labels::{truncate_label, LABEL_WIDTH};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Group cap for an ad-hoc, single chart render.
pub const SINGLE_CHART_CAP: usize = 20;

/// Group cap for each chart of a multi-config render.
pub const MULTI_CHART_CAP: usize = 30;

/// One bar, slice or point of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedDatum {
    /// Group key cut to [`LABEL_WIDTH`] characters.
    pub label: String,
    pub value: f64,
    /// Source rows folded into the group.
    pub count: usize,
}

/// What `min`/`max` report for a group without a single numeric Y value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyExtremum {
    /// Report the group with value 0.
    #[default]
    Zero,
    /// Leave the group out of the result.
    Exclude,
}

impl fmt::Display for EmptyExtremum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyExtremum::Zero => write!(f, "zero"),
            EmptyExtremum::Exclude => write!(f, "exclude"),
        }
    }
}

impl FromStr for EmptyExtremum {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero" => Ok(EmptyExtremum::Zero),
            "exclude" => Ok(EmptyExtremum::Exclude),
            other => anyhow::bail!("unknown empty extremum policy '{}' (expected zero or exclude)", other),
        }
    }
}

/// The chart fields the pipeline needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationSpec {
    pub group_by: String,
    pub y_axis: String,
    pub aggregation: Aggregation,
    pub sort_direction: SortDirection,
}

impl AggregationSpec {
    pub fn from_config(config: &ChartConfig) -> Self {
        Self {
            group_by: config.group_column().to_string(),
            y_axis: config.y_axis.clone(),
            aggregation: config.aggregation,
            sort_direction: config.sort_direction,
        }
    }

    pub fn from_draft(draft: &ChartDraft) -> Self {
        Self {
            group_by: draft.group_column().to_string(),
            y_axis: draft.y_axis.clone(),
            aggregation: draft.aggregation,
            sort_direction: draft.sort_direction,
        }
    }

    fn has_axes(&self) -> bool {
        !self.group_by.trim().is_empty() && !self.y_axis.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationOptions {
    pub cap: usize,
    pub empty_extremum: EmptyExtremum,
}

impl AggregationOptions {
    pub fn single() -> Self {
        Self {
            cap: SINGLE_CHART_CAP,
            empty_extremum: EmptyExtremum::default(),
        }
    }

    pub fn multi() -> Self {
        Self {
            cap: MULTI_CHART_CAP,
            empty_extremum: EmptyExtremum::default(),
        }
    }

    pub fn with_empty_extremum(mut self, empty_extremum: EmptyExtremum) -> Self {
        self.empty_extremum = empty_extremum;
        self
    }
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self::single()
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    count: usize,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Accumulator {
    fn push(&mut self, value: Option<f64>) {
        self.count += 1;
        if let Some(v) = value {
            self.sum += v;
            self.min = Some(self.min.map_or(v, |m| m.min(v)));
            self.max = Some(self.max.map_or(v, |m| m.max(v)));
        }
    }

    fn resolve(&self, aggregation: Aggregation, empty: EmptyExtremum) -> Option<f64> {
        let extremum = |v: Option<f64>| match (v, empty) {
            (Some(v), _) => Some(v),
            (None, EmptyExtremum::Zero) => Some(0.0),
            (None, EmptyExtremum::Exclude) => None,
        };
        match aggregation {
            Aggregation::Sum => Some(self.sum),
            Aggregation::Count => Some(self.count as f64),
            Aggregation::Average if self.count == 0 => Some(0.0),
            Aggregation::Average => Some(self.sum / self.count as f64),
            Aggregation::Min => extremum(self.min),
            Aggregation::Max => extremum(self.max),
        }
    }
}

/// Group, aggregate, order by value and cap.
///
/// Returns nothing when either axis is unset. Ties keep first-seen group order.
pub fn aggregate(
    rows: &[&ResultRow],
    spec: &AggregationSpec,
    options: &AggregationOptions,
) -> Vec<AggregatedDatum> {
    if !spec.has_axes() {
        return Vec::new();
    }

    let mut groups: IndexMap<String, Accumulator> = IndexMap::new();
    for row in rows {
        let key = row.get(&spec.group_by).to_string();
        groups
            .entry(key)
            .or_default()
            .push(row.get(&spec.y_axis).as_number());
    }
    let group_count = groups.len();

    let mut data: Vec<AggregatedDatum> = groups
        .into_iter()
        .filter_map(|(key, acc)| {
            acc.resolve(spec.aggregation, options.empty_extremum)
                .map(|value| AggregatedDatum {
                    label: truncate_label(&key, LABEL_WIDTH),
                    value,
                    count: acc.count,
                })
        })
        .collect();

    match spec.sort_direction {
        SortDirection::Asc => data.sort_by(|a, b| a.value.total_cmp(&b.value)),
        SortDirection::Desc => data.sort_by(|a, b| b.value.total_cmp(&a.value)),
    }
    data.truncate(options.cap);

    log::debug!(
        "[RPT Debug] aggregate: {} rows into {} groups by '{}', kept {}",
        rows.len(),
        group_count,
        spec.group_by,
        data.len()
    );
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpt_core::{ChartType, ResultSet};

    fn sample_rows() -> ResultSet {
        ResultSet::from_json_str(
            r#"[{"cat": "A", "v": 10}, {"cat": "A", "v": 20}, {"cat": "B", "v": 5}]"#,
        )
        .unwrap()
    }

    fn spec(aggregation: Aggregation, sort_direction: SortDirection) -> AggregationSpec {
        AggregationSpec {
            group_by: "cat".to_string(),
            y_axis: "v".to_string(),
            aggregation,
            sort_direction,
        }
    }

    fn run(rs: &ResultSet, spec: &AggregationSpec, options: &AggregationOptions) -> Vec<AggregatedDatum> {
        let view: Vec<&ResultRow> = rs.rows().iter().collect();
        aggregate(&view, spec, options)
    }

    fn datum(label: &str, value: f64, count: usize) -> AggregatedDatum {
        AggregatedDatum {
            label: label.to_string(),
            value,
            count,
        }
    }

    #[test]
    fn average_per_group() {
        let rs = sample_rows();
        let data = run(&rs, &spec(Aggregation::Average, SortDirection::Desc), &AggregationOptions::single());
        assert_eq!(data, vec![datum("A", 15.0, 2), datum("B", 5.0, 1)]);

        let data = run(&rs, &spec(Aggregation::Average, SortDirection::Asc), &AggregationOptions::single());
        assert_eq!(data, vec![datum("B", 5.0, 1), datum("A", 15.0, 2)]);
    }

    #[test]
    fn sum_count_min_max() {
        let rs = sample_rows();
        let opts = AggregationOptions::single();
        let values = |agg| -> Vec<(String, f64)> {
            run(&rs, &spec(agg, SortDirection::Desc), &opts)
                .into_iter()
                .map(|d| (d.label, d.value))
                .collect()
        };
        assert_eq!(values(Aggregation::Sum), vec![("A".into(), 30.0), ("B".into(), 5.0)]);
        assert_eq!(values(Aggregation::Count), vec![("A".into(), 2.0), ("B".into(), 1.0)]);
        assert_eq!(values(Aggregation::Min), vec![("A".into(), 10.0), ("B".into(), 5.0)]);
        assert_eq!(values(Aggregation::Max), vec![("A".into(), 20.0), ("B".into(), 5.0)]);
    }

    #[test]
    fn non_numeric_values_are_counted_not_summed() {
        let rs = ResultSet::from_json_str(
            r#"[{"cat": "A", "v": 10}, {"cat": "A", "v": "n/a"}, {"cat": "A", "v": null}]"#,
        )
        .unwrap();
        let opts = AggregationOptions::single();
        let sum = run(&rs, &spec(Aggregation::Sum, SortDirection::Desc), &opts);
        assert_eq!(sum, vec![datum("A", 10.0, 3)]);
        let avg = run(&rs, &spec(Aggregation::Average, SortDirection::Desc), &opts);
        assert!((avg[0].value - 10.0 / 3.0).abs() < 1e-9, "average divides by every row");
    }

    #[test]
    fn empty_extremum_policy() {
        let rs = ResultSet::from_json_str(
            r#"[{"cat": "A", "v": 4}, {"cat": "B", "v": "-"}]"#,
        )
        .unwrap();
        let zero = run(&rs, &spec(Aggregation::Max, SortDirection::Desc), &AggregationOptions::single());
        assert_eq!(zero, vec![datum("A", 4.0, 1), datum("B", 0.0, 1)]);

        let exclude = AggregationOptions::single().with_empty_extremum(EmptyExtremum::Exclude);
        let data = run(&rs, &spec(Aggregation::Min, SortDirection::Desc), &exclude);
        assert_eq!(data, vec![datum("A", 4.0, 1)]);

        // Sum is unaffected by the policy.
        let data = run(&rs, &spec(Aggregation::Sum, SortDirection::Desc), &exclude);
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn caps_group_count() {
        let rows: Vec<ResultRow> = (0..45)
            .map(|i| [("cat", format!("g{}", i).into()), ("v", rpt_core::Scalar::from(i as f64))].into_iter().collect())
            .collect();
        let view: Vec<&ResultRow> = rows.iter().collect();
        let s = spec(Aggregation::Sum, SortDirection::Desc);

        let single = aggregate(&view, &s, &AggregationOptions::single());
        assert_eq!(single.len(), SINGLE_CHART_CAP);
        assert_eq!(single[0].label, "g44");

        let multi = aggregate(&view, &s, &AggregationOptions::multi());
        assert_eq!(multi.len(), MULTI_CHART_CAP);
        assert_eq!(multi[29].label, "g15");
    }

    #[test]
    fn labels_are_truncated() {
        let rs = ResultSet::from_json_str(
            r#"[{"cat": "Çocuk Sağlığı ve Hastalıkları", "v": 1}]"#,
        )
        .unwrap();
        let data = run(&rs, &spec(Aggregation::Sum, SortDirection::Desc), &AggregationOptions::single());
        assert_eq!(data[0].label, "Çocuk Sağlığı ve Has");
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let rs = ResultSet::from_json_str(
            r#"[{"cat": "B", "v": 1}, {"cat": "A", "v": 1}, {"cat": "C", "v": 1}]"#,
        )
        .unwrap();
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let labels: Vec<String> = run(&rs, &spec(Aggregation::Sum, direction), &AggregationOptions::single())
                .into_iter()
                .map(|d| d.label)
                .collect();
            assert_eq!(labels, vec!["B", "A", "C"]);
        }
    }

    #[test]
    fn null_group_key_is_its_own_group() {
        let rs = ResultSet::from_json_str(r#"[{"cat": null, "v": 2}, {"cat": "A", "v": 1}]"#).unwrap();
        let data = run(&rs, &spec(Aggregation::Sum, SortDirection::Desc), &AggregationOptions::single());
        assert_eq!(data, vec![datum("", 2.0, 1), datum("A", 1.0, 1)]);
    }

    #[test]
    fn missing_axes_yield_nothing() {
        let rs = sample_rows();
        let mut s = spec(Aggregation::Sum, SortDirection::Desc);
        s.y_axis.clear();
        assert!(run(&rs, &s, &AggregationOptions::single()).is_empty());
    }

    #[test]
    fn empty_input_aggregates_to_empty() {
        let s = spec(Aggregation::Sum, SortDirection::Desc);
        assert!(aggregate(&[], &s, &AggregationOptions::single()).is_empty());
    }

    #[test]
    fn spec_from_draft_defaults_group_to_x_axis() {
        let mut draft = ChartDraft::new(ChartType::Bar, "branch", "visits", Aggregation::Count);
        assert_eq!(AggregationSpec::from_draft(&draft).group_by, "branch");
        draft.group_by = Some("doctor".to_string());
        let s = AggregationSpec::from_draft(&draft);
        assert_eq!(s.group_by, "doctor");
        assert_eq!(s.sort_direction, SortDirection::Desc);
    }

    #[test]
    fn empty_extremum_parses() {
        assert_eq!("Exclude".parse::<EmptyExtremum>().unwrap(), EmptyExtremum::Exclude);
        assert_eq!("zero".parse::<EmptyExtremum>().unwrap(), EmptyExtremum::Zero);
        assert!("none".parse::<EmptyExtremum>().is_err());
    }
}
