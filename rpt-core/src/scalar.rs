use chrono::NaiveDate;
use rpt_utils::{dates, numbers};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell value of a report result row.
///
/// Result sets arrive with no schema, so every cell is one of these tagged
/// values. Date-like values usually arrive as `Text` and are recognized by
/// [`Scalar::as_date`]; `Date` exists for backends that hand over typed dates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Numeric reading of the value, if it has one.
    ///
    /// Text is parsed strictly (see [`numbers::parse_number`]); booleans and
    /// dates never count as numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) if n.is_finite() => Some(*n),
            Scalar::Text(s) => numbers::parse_number(s),
            _ => None,
        }
    }

    /// Calendar-date reading of the value, if it has one.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Scalar::Date(d) => Some(*d),
            Scalar::Text(s) => dates::parse_date(s),
            _ => None,
        }
    }

    /// True if the value has the shape of a recognized date layout.
    pub fn looks_like_date(&self) -> bool {
        match self {
            Scalar::Date(_) => true,
            Scalar::Text(s) => dates::looks_like_date(s),
            _ => false,
        }
    }
}

/// The string form used for grouping, searching, multi-select membership
/// and export. `Null` renders as the empty string.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", numbers::format_number(*n)),
            Scalar::Text(s) => write!(f, "{}", s),
            Scalar::Date(d) => write!(f, "{}", dates::format_date(d)),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value as f64)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(value: NaiveDate) -> Self {
        Scalar::Date(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Scalar::Null)
    }
}

/// Nested arrays and objects are kept as their JSON text.
impl From<serde_json::Value> for Scalar {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Bool(b),
            Value::Number(n) => n.as_f64().map(Scalar::Number).unwrap_or(Scalar::Null),
            Value::String(s) => Scalar::Text(s),
            other @ (Value::Array(_) | Value::Object(_)) => Scalar::Text(other.to_string()),
        }
    }
}
