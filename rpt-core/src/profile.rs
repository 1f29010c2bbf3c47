use serde::{Deserialize, Serialize};

/// Inferred meaning of a column, independent of how its values are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Categorical,
    Numeric,
    Date,
}

/// Classification of one result column. Derived per result set, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub semantic_type: SemanticType,
}

impl ColumnProfile {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
        }
    }
}

/// Names of the profiled columns with the given type, in column order.
pub fn columns_of(profiles: &[ColumnProfile], semantic_type: SemanticType) -> Vec<&str> {
    profiles
        .iter()
        .filter(|p| p.semantic_type == semantic_type)
        .map(|p| p.name.as_str())
        .collect()
}
