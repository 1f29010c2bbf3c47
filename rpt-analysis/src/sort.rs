//! Type-aware, stable, single-column row sorting.
//!
//! Values are compared as numbers when both are numeric, as calendar dates
//! when both are dates, and otherwise as text under Turkish case-insensitive
//! collation. Nulls always go last, whichever the direction.

use rpt_core::{ResultRow, Scalar, SortDirection};
use rpt_utils::collation::compare_tr;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ValueClass {
    Number,
    Date,
    Text,
}

fn class_of(value: &Scalar) -> ValueClass {
    if value.as_number().is_some() {
        ValueClass::Number
    } else if value.as_date().is_some() {
        ValueClass::Date
    } else {
        ValueClass::Text
    }
}

/// Ascending comparison of two non-null values.
///
/// Same-kind pairs compare by their kind. Mixed pairs order numbers before
/// dates before text so the comparison stays a total order.
pub fn compare_values(a: &Scalar, b: &Scalar) -> Ordering {
    match (class_of(a), class_of(b)) {
        (ValueClass::Number, ValueClass::Number) => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
        (ValueClass::Date, ValueClass::Date) => a.as_date().cmp(&b.as_date()),
        (ValueClass::Text, ValueClass::Text) => compare_tr(&a.to_string(), &b.to_string()),
        (left, right) => left.cmp(&right),
    }
}

/// Directional comparison with nulls pinned to the end.
pub fn compare_for_display(a: &Scalar, b: &Scalar, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = compare_values(a, b);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}

/// Sort rows by one column. Stable; the input is left untouched.
pub fn sort<'a>(rows: &[&'a ResultRow], column: &str, direction: SortDirection) -> Vec<&'a ResultRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| compare_for_display(a.get(column), b.get(column), direction));
    sorted
}

/// Which column the table is sorted by.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// Header click: the same column flips direction, a new column starts ascending.
    pub fn activate(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            self.direction = self.direction.toggled();
        } else {
            self.column = Some(column.to_string());
            self.direction = SortDirection::Asc;
        }
    }

    pub fn clear(&mut self) {
        self.column = None;
        self.direction = SortDirection::Asc;
    }

    /// Apply this state to a view; no column means original order.
    pub fn apply<'a>(&self, rows: &[&'a ResultRow]) -> Vec<&'a ResultRow> {
        match &self.column {
            Some(column) => sort(rows, column, self.direction),
            None => rows.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_of(column: &str, values: Vec<Scalar>) -> Vec<ResultRow> {
        values
            .into_iter()
            .map(|v| [(column.to_string(), v)].into_iter().collect())
            .collect()
    }

    fn sorted_values(rows: &[ResultRow], column: &str, direction: SortDirection) -> Vec<Scalar> {
        let view: Vec<&ResultRow> = rows.iter().collect();
        sort(&view, column, direction)
            .into_iter()
            .map(|r| r.get(column).clone())
            .collect()
    }

    #[test]
    fn nulls_sort_last_in_both_directions() {
        let rows = rows_of("x", vec![Scalar::Null, Scalar::from(2.0), Scalar::from(1.0)]);
        assert_eq!(
            sorted_values(&rows, "x", SortDirection::Asc),
            vec![Scalar::from(1.0), Scalar::from(2.0), Scalar::Null]
        );
        assert_eq!(
            sorted_values(&rows, "x", SortDirection::Desc),
            vec![Scalar::from(2.0), Scalar::from(1.0), Scalar::Null]
        );
    }

    #[test]
    fn missing_column_counts_as_null() {
        let mut rows = rows_of("x", vec![Scalar::from(3.0)]);
        rows.insert(0, [("y", Scalar::from(1.0))].into_iter().collect());
        let view: Vec<&ResultRow> = rows.iter().collect();
        let sorted = sort(&view, "x", SortDirection::Asc);
        assert_eq!(sorted[0].get("x"), &Scalar::from(3.0));
        assert_eq!(sorted[1].get("x"), &Scalar::Null);
    }

    #[test]
    fn numeric_text_sorts_numerically() {
        let rows = rows_of("n", vec!["10".into(), "9".into(), "100".into()]);
        assert_eq!(
            sorted_values(&rows, "n", SortDirection::Asc),
            vec![Scalar::from("9"), Scalar::from("10"), Scalar::from("100")]
        );
    }

    #[test]
    fn dates_sort_chronologically_across_layouts() {
        let rows = rows_of(
            "d",
            vec!["2024-03-01".into(), "15-01-2024".into(), "02/10/2024".into()],
        );
        assert_eq!(
            sorted_values(&rows, "d", SortDirection::Asc),
            vec![
                Scalar::from("15-01-2024"),
                Scalar::from("02/10/2024"),
                Scalar::from("2024-03-01")
            ]
        );
    }

    #[test]
    fn text_uses_turkish_collation() {
        let rows = rows_of("city", vec!["Zonguldak".into(), "Çorum".into(), "Ceyhan".into(), "izmir".into(), "Işıklar".into()]);
        assert_eq!(
            sorted_values(&rows, "city", SortDirection::Asc),
            vec![
                Scalar::from("Ceyhan"),
                Scalar::from("Çorum"),
                Scalar::from("Işıklar"),
                Scalar::from("izmir"),
                Scalar::from("Zonguldak")
            ]
        );
    }

    #[test]
    fn sort_is_stable() {
        let rows: Vec<ResultRow> = vec![
            [("k", Scalar::from(1.0)), ("tag", Scalar::from("a"))].into_iter().collect(),
            [("k", Scalar::from(0.0)), ("tag", Scalar::from("b"))].into_iter().collect(),
            [("k", Scalar::from(1.0)), ("tag", Scalar::from("c"))].into_iter().collect(),
        ];
        let view: Vec<&ResultRow> = rows.iter().collect();
        let tags: Vec<String> = sort(&view, "k", SortDirection::Asc)
            .iter()
            .map(|r| r.get("tag").to_string())
            .collect();
        assert_eq!(tags, vec!["b", "a", "c"]);
    }

    #[test]
    fn mixed_values_do_not_panic() {
        let rows = rows_of(
            "m",
            vec!["9".into(), "10".into(), "1a".into(), "2024-01-01".into(), Scalar::Null, Scalar::from(true)],
        );
        let sorted = sorted_values(&rows, "m", SortDirection::Asc);
        assert_eq!(sorted.len(), 6);
        assert_eq!(sorted[0], Scalar::from("9"));
        assert_eq!(sorted[1], Scalar::from("10"));
        assert_eq!(sorted[2], Scalar::from("2024-01-01"));
        assert_eq!(sorted[5], Scalar::Null);
    }

    #[test]
    fn source_rows_are_untouched() {
        let rows = rows_of("x", vec![Scalar::from(2.0), Scalar::from(1.0)]);
        let view: Vec<&ResultRow> = rows.iter().collect();
        let _ = sort(&view, "x", SortDirection::Asc);
        assert_eq!(view[0].get("x"), &Scalar::from(2.0));
    }

    #[test]
    fn empty_input_sorts_to_empty() {
        assert!(sort(&[], "x", SortDirection::Desc).is_empty());
    }

    #[test]
    fn sort_state_toggles() {
        let mut state = SortState::default();
        state.activate("visits");
        assert_eq!(state.column.as_deref(), Some("visits"));
        assert_eq!(state.direction, SortDirection::Asc);
        state.activate("visits");
        assert_eq!(state.direction, SortDirection::Desc);
        state.activate("visits");
        assert_eq!(state.direction, SortDirection::Asc);
        state.activate("visits");
        state.activate("branch");
        assert_eq!(state.column.as_deref(), Some("branch"));
        assert_eq!(state.direction, SortDirection::Asc);
    }
}
