//! Schema-less tabular report results.
//!
//! A [`ResultSet`] is whatever the query backend returned: an ordered list of
//! rows, each an ordered mapping of column name to [`Scalar`]. The column list
//! is taken from the first row and assumed for every other row; a row missing
//! a key reads as `Null` for it.

use crate::scalar::Scalar;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

static NULL: Scalar = Scalar::Null;

/// One result row: column name to value, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultRow(IndexMap<String, Scalar>);

impl ResultRow {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Value of a column, `Null` if the row has no such key.
    pub fn get(&self, column: &str) -> &Scalar {
        self.0.get(column).unwrap_or(&NULL)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Scalar>) {
        self.0.insert(column.into(), value.into());
    }

    /// Column names in row order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for ResultRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Rows deserialize from any JSON object; nested values become text.
impl<'de> Deserialize<'de> for ResultRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

/// An in-memory, already materialized report result.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<ResultRow>,
}

impl ResultSet {
    /// Build a result set; the column list comes from the first row.
    pub fn new(rows: Vec<ResultRow>) -> Self {
        let columns = rows
            .first()
            .map(|r| r.columns().map(str::to_string).collect())
            .unwrap_or_default();
        Self { columns, rows }
    }

    /// Parse a JSON array of objects.
    ///
    /// Key order of the first object becomes the column order.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let rows: Vec<ResultRow> = serde_json::from_str(json)?;
        log::info!("[RPT Debug] result_set: parsed {} JSON rows", rows.len());
        Ok(Self::new(rows))
    }

    /// Parse CSV text with a header row.
    ///
    /// Empty cells become `Null`; every other cell is kept as `Text` and left
    /// to the classifier to interpret.
    pub fn from_csv_str(csv_data: &str) -> anyhow::Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let row: ResultRow = headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let cell = record.get(i).unwrap_or("").trim();
                    let value = if cell.is_empty() {
                        Scalar::Null
                    } else {
                        Scalar::Text(cell.to_string())
                    };
                    (header.clone(), value)
                })
                .collect();
            rows.push(row);
        }
        log::info!(
            "[RPT Debug] result_set: parsed {} CSV rows x {} columns",
            rows.len(),
            headers.len()
        );
        Ok(Self {
            columns: headers,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn first_row(&self) -> Option<&ResultRow> {
        self.rows.first()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
