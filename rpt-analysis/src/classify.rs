//! Column classification.
//!
//! Only the first row is inspected. Rules, first match wins:
//!
//! 1. name contains `id` (any case) and is not exactly `id` -> categorical
//! 2. sample value starts with a recognized date layout -> date
//! 3. sample value is a non-negative number (and the name has no `id`) -> numeric
//! 4. otherwise -> categorical

use rpt_core::{ColumnProfile, ResultSet, Scalar, SemanticType};

/// Profile every column of a result set from its first row.
///
/// An empty result set yields no profiles.
pub fn classify(result_set: &ResultSet) -> Vec<ColumnProfile> {
    let Some(sample) = result_set.first_row() else {
        return Vec::new();
    };
    let profiles: Vec<ColumnProfile> = result_set
        .columns()
        .iter()
        .map(|name| ColumnProfile::new(name.clone(), classify_column(name, sample.get(name))))
        .collect();
    log::debug!(
        "[RPT Debug] classify: profiled {} columns from the first row",
        profiles.len()
    );
    profiles
}

/// Classify one column from its name and a sample value.
pub fn classify_column(name: &str, sample: &Scalar) -> SemanticType {
    let lowered = name.to_lowercase();
    let mentions_id = lowered.contains("id");

    if mentions_id && lowered != "id" {
        return SemanticType::Categorical;
    }
    if sample.looks_like_date() {
        return SemanticType::Date;
    }
    // Identifiers are opaque even when they are numbers, the bare `id` included.
    if !mentions_id && sample.as_number().is_some_and(|n| n >= 0.0) {
        return SemanticType::Numeric;
    }
    SemanticType::Categorical
}
