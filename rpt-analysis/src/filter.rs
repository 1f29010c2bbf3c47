//! Client-side filtering of a result set.
//!
//! A [`FilterSet`] holds the filter state of a report view: free-text
//! searches, numeric ranges, date ranges and multi-select value sets, each
//! keyed by column. Every active filter becomes a [`FilterSpec`]; a row is
//! kept only if it passes all of them. Filters of different kinds on the
//! same column coexist.

use chrono::NaiveDate;
use rpt_core::{ResultRow, Scalar};
use rpt_utils::labels::contains_ignore_case;
use std::collections::{BTreeMap, BTreeSet};

use crate::sort::compare_values;

/// One predicate over a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterSpec {
    /// Case-insensitive substring match against the value's text.
    ExactOrSearch { column: String, query: String },
    /// Inclusive numeric bounds; non-numeric values fail.
    Range {
        column: String,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Inclusive date bounds; values that do not parse as dates fail.
    DateRange {
        column: String,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    /// Value text must be one of `values`.
    MultiSelect {
        column: String,
        values: BTreeSet<String>,
    },
}

impl FilterSpec {
    pub fn column(&self) -> &str {
        match self {
            FilterSpec::ExactOrSearch { column, .. }
            | FilterSpec::Range { column, .. }
            | FilterSpec::DateRange { column, .. }
            | FilterSpec::MultiSelect { column, .. } => column,
        }
    }

    /// Inactive specs (blank query, no bounds, empty set) pass every row.
    pub fn is_active(&self) -> bool {
        match self {
            FilterSpec::ExactOrSearch { query, .. } => !query.is_empty(),
            FilterSpec::Range { min, max, .. } => min.is_some() || max.is_some(),
            FilterSpec::DateRange { start, end, .. } => start.is_some() || end.is_some(),
            FilterSpec::MultiSelect { values, .. } => !values.is_empty(),
        }
    }

    pub fn matches(&self, row: &ResultRow) -> bool {
        if !self.is_active() {
            return true;
        }
        let value = row.get(self.column());
        match self {
            FilterSpec::ExactOrSearch { query, .. } => contains_ignore_case(&value.to_string(), query),
            FilterSpec::Range { min, max, .. } => match value.as_number() {
                Some(n) => min.map_or(true, |m| n >= m) && max.map_or(true, |m| n <= m),
                None => false,
            },
            FilterSpec::DateRange { start, end, .. } => match value.as_date() {
                Some(d) => start.map_or(true, |s| d >= s) && end.map_or(true, |e| d <= e),
                None => false,
            },
            FilterSpec::MultiSelect { values, .. } => values.contains(&value.to_string()),
        }
    }
}

/// Numeric bounds for a `Range` filter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Date bounds for a `DateRange` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateBounds {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Filter state of one report view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSet {
    /// Free-text query matched against every column.
    pub global_search: Option<String>,
    /// Per-column free-text queries.
    pub search: BTreeMap<String, String>,
    pub ranges: BTreeMap<String, NumericRange>,
    pub date_ranges: BTreeMap<String, DateBounds>,
    pub multi_select: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_global_search(&mut self, query: &str) -> &mut Self {
        self.global_search = (!query.is_empty()).then(|| query.to_string());
        self
    }

    pub fn set_search(&mut self, column: &str, query: &str) -> &mut Self {
        if query.is_empty() {
            self.search.remove(column);
        } else {
            self.search.insert(column.to_string(), query.to_string());
        }
        self
    }

    pub fn set_range(&mut self, column: &str, min: Option<f64>, max: Option<f64>) -> &mut Self {
        if min.is_none() && max.is_none() {
            self.ranges.remove(column);
        } else {
            self.ranges.insert(column.to_string(), NumericRange { min, max });
        }
        self
    }

    pub fn set_date_range(
        &mut self,
        column: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> &mut Self {
        if start.is_none() && end.is_none() {
            self.date_ranges.remove(column);
        } else {
            self.date_ranges
                .insert(column.to_string(), DateBounds { start, end });
        }
        self
    }

    pub fn set_multi_select<I, S>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.multi_select.remove(column);
        } else {
            self.multi_select.insert(column.to_string(), values);
        }
        self
    }

    /// Drop every filter on one column.
    pub fn clear_column(&mut self, column: &str) {
        self.search.remove(column);
        self.ranges.remove(column);
        self.date_ranges.remove(column);
        self.multi_select.remove(column);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// All active per-column predicates.
    pub fn specs(&self) -> Vec<FilterSpec> {
        let searches = self.search.iter().map(|(column, query)| FilterSpec::ExactOrSearch {
            column: column.clone(),
            query: query.clone(),
        });
        let ranges = self.ranges.iter().map(|(column, r)| FilterSpec::Range {
            column: column.clone(),
            min: r.min,
            max: r.max,
        });
        let dates = self.date_ranges.iter().map(|(column, b)| FilterSpec::DateRange {
            column: column.clone(),
            start: b.start,
            end: b.end,
        });
        let selects = self.multi_select.iter().map(|(column, values)| FilterSpec::MultiSelect {
            column: column.clone(),
            values: values.clone(),
        });
        searches
            .chain(ranges)
            .chain(dates)
            .chain(selects)
            .filter(FilterSpec::is_active)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.global_search.is_none() && self.specs().is_empty()
    }
}

fn matches_global(row: &ResultRow, query: &str) -> bool {
    row.iter()
        .any(|(_, value)| contains_ignore_case(&value.to_string(), query))
}

/// Rows passing every active filter, in their original order.
pub fn apply<'a>(rows: &'a [ResultRow], filters: &FilterSet) -> Vec<&'a ResultRow> {
    let specs = filters.specs();
    let global = filters.global_search.as_deref().filter(|q| !q.is_empty());

    let kept: Vec<&ResultRow> = rows
        .iter()
        .filter(|row| global.map_or(true, |q| matches_global(row, q)))
        .filter(|row| specs.iter().all(|spec| spec.matches(row)))
        .collect();
    log::debug!(
        "[RPT Debug] filter: kept {} of {} rows with {} active filters",
        kept.len(),
        rows.len(),
        specs.len() + usize::from(global.is_some())
    );
    kept
}

/// Distinct value texts of a column, ordered for display. Nulls are skipped.
///
/// Used to offer the choices of a multi-select filter.
pub fn distinct_values(rows: &[&ResultRow], column: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut values: Vec<&Scalar> = Vec::new();
    for row in rows {
        let value = row.get(column);
        if !value.is_null() && seen.insert(value.to_string()) {
            values.push(value);
        }
    }
    values.sort_by(|a, b| compare_values(a, b));
    values.iter().map(|v| v.to_string()).collect()
}

/// Smallest and largest numeric value of a column, to seed range inputs.
pub fn numeric_bounds(rows: &[&ResultRow], column: &str) -> Option<(f64, f64)> {
    rows.iter()
        .filter_map(|row| row.get(column).as_number())
        .fold(None, |acc, n| match acc {
            None => Some((n, n)),
            Some((lo, hi)) => Some((lo.min(n), hi.max(n))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpt_core::ResultSet;

    fn sample() -> ResultSet {
        ResultSet::from_json_str(
            r#"[
                {"a": 1, "b": "x", "day": "2024-01-10"},
                {"a": 2, "b": "y", "day": "2024-02-10"},
                {"a": 3, "b": "x", "day": "not recorded"}
            ]"#,
        )
        .unwrap()
    }

    fn column(rows: &[&ResultRow], name: &str) -> Vec<String> {
        rows.iter().map(|r| r.get(name).to_string()).collect()
    }

    #[test]
    fn range_and_multi_select_are_anded() {
        let rs = sample();
        let mut filters = FilterSet::new();
        filters.set_range("a", Some(2.0), None).set_multi_select("b", ["x"]);
        let kept = apply(rs.rows(), &filters);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0], &rs.rows()[2]);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let rs = ResultSet::from_json_str(r#"[{"n": 4}, {"n": 5}, {"n": 6}]"#).unwrap();
        let mut filters = FilterSet::new();
        filters.set_range("n", Some(5.0), Some(5.0));
        assert_eq!(column(&apply(rs.rows(), &filters), "n"), vec!["5"]);
    }

    #[test]
    fn range_excludes_non_numeric_values() {
        let rs = ResultSet::from_json_str(r#"[{"n": "abc"}, {"n": null}, {"n": "7"}]"#).unwrap();
        let mut filters = FilterSet::new();
        filters.set_range("n", None, Some(100.0));
        assert_eq!(column(&apply(rs.rows(), &filters), "n"), vec!["7"]);
    }

    #[test]
    fn date_range_excludes_unparsable_dates() {
        let rs = sample();
        let mut filters = FilterSet::new();
        filters.set_date_range("day", NaiveDate::from_ymd_opt(2024, 1, 1), None);
        assert_eq!(column(&apply(rs.rows(), &filters), "a"), vec!["1", "2"]);

        filters.set_date_range(
            "day",
            NaiveDate::from_ymd_opt(2024, 2, 10),
            NaiveDate::from_ymd_opt(2024, 2, 10),
        );
        assert_eq!(column(&apply(rs.rows(), &filters), "a"), vec!["2"]);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let rs = ResultSet::from_json_str(
            r#"[{"branch": "Merkez Şube"}, {"branch": "Kadıköy"}, {"branch": null}]"#,
        )
        .unwrap();
        let mut filters = FilterSet::new();
        filters.set_search("branch", "MERKEZ");
        assert_eq!(column(&apply(rs.rows(), &filters), "branch"), vec!["Merkez Şube"]);
    }

    #[test]
    fn search_applies_to_numbers_as_text() {
        let rs = ResultSet::from_json_str(r#"[{"n": 125}, {"n": 310}]"#).unwrap();
        let mut filters = FilterSet::new();
        filters.set_search("n", "12");
        assert_eq!(column(&apply(rs.rows(), &filters), "n"), vec!["125"]);
    }

    #[test]
    fn global_search_matches_any_column() {
        let rs = sample();
        let mut filters = FilterSet::new();
        filters.set_global_search("02-10");
        assert_eq!(column(&apply(rs.rows(), &filters), "a"), vec!["2"]);
    }

    #[test]
    fn multi_select_is_or_within_set() {
        let rs = ResultSet::from_json_str(r#"[{"b": "x"}, {"b": "y"}, {"b": "z"}]"#).unwrap();
        let mut filters = FilterSet::new();
        filters.set_multi_select("b", ["x", "z"]);
        assert_eq!(column(&apply(rs.rows(), &filters), "b"), vec!["x", "z"]);
    }

    #[test]
    fn different_kinds_on_one_column_coexist() {
        let rs = ResultSet::from_json_str(r#"[{"n": 10}, {"n": 15}, {"n": 51}]"#).unwrap();
        let mut filters = FilterSet::new();
        filters.set_range("n", Some(11.0), None).set_search("n", "5");
        assert_eq!(filters.specs().len(), 2);
        assert_eq!(column(&apply(rs.rows(), &filters), "n"), vec!["15", "51"]);
    }

    #[test]
    fn inactive_filters_are_identity() {
        let rs = sample();
        let mut filters = FilterSet::new();
        filters
            .set_search("b", "")
            .set_range("a", None, None)
            .set_multi_select("b", Vec::<String>::new())
            .set_global_search("");
        assert!(filters.is_empty());
        assert_eq!(apply(rs.rows(), &filters).len(), 3);
    }

    #[test]
    fn clear_column_removes_all_kinds() {
        let mut filters = FilterSet::new();
        filters
            .set_search("n", "1")
            .set_range("n", Some(1.0), None)
            .set_multi_select("n", ["1"]);
        filters.clear_column("n");
        assert!(filters.is_empty());
    }

    #[test]
    fn empty_input_filters_to_empty() {
        let mut filters = FilterSet::new();
        filters.set_range("a", Some(1.0), None);
        assert!(apply(&[], &filters).is_empty());
        assert!(apply(&[], &FilterSet::new()).is_empty());
    }

    #[test]
    fn distinct_values_and_bounds() {
        let rs = ResultSet::from_json_str(
            r#"[{"b": "y", "n": 3}, {"b": "x", "n": -1}, {"b": "y", "n": "n/a"}, {"b": null, "n": 8}]"#,
        )
        .unwrap();
        let view: Vec<&ResultRow> = rs.rows().iter().collect();
        assert_eq!(distinct_values(&view, "b"), vec!["x", "y"]);
        assert_eq!(numeric_bounds(&view, "n"), Some((-1.0, 8.0)));
        assert_eq!(numeric_bounds(&view, "b"), None);
    }
}
