//! Analysis engine for schema-less report results.
//!
//! Everything here is a pure transform over an in-memory
//! [`ResultSet`](rpt_core::ResultSet): nothing raises on malformed data, and
//! no stage mutates its input.
//!
//! - [`classify`]: semantic type per column, from the first row
//! - [`suggest`]: chart type suggestions and the editor's default chart
//! - [`filter`]: search, range, date range and multi-select filters
//! - [`sort`]: stable, type-aware single-column sorting
//! - [`aggregate`]: group, aggregate, order and cap chart data
//! - [`pipeline`]: the current view and multi-config rendering
//! - [`summary`] / [`export`]: read-side summaries and delimited export
//!
//! # Usage
//!
//! ```rust
//! use rpt_analysis::{aggregate, classify, filter::FilterSet, pipeline, sort::SortState};
//! use rpt_core::{Aggregation, ResultSet, SortDirection};
//!
//! let rs = ResultSet::from_json_str(
//!     r#"[{"cat": "A", "v": 10}, {"cat": "A", "v": 20}, {"cat": "B", "v": 5}]"#,
//! ).unwrap();
//! let profiles = classify::classify(&rs);
//! assert_eq!(profiles.len(), 2);
//!
//! let view = pipeline::current_view(&rs, &FilterSet::new(), &SortState::default());
//! let spec = aggregate::AggregationSpec {
//!     group_by: "cat".into(),
//!     y_axis: "v".into(),
//!     aggregation: Aggregation::Average,
//!     sort_direction: SortDirection::Desc,
//! };
//! let data = aggregate::aggregate(&view, &spec, &aggregate::AggregationOptions::single());
//! assert_eq!(data[0].label, "A");
//! assert_eq!(data[0].value, 15.0);
//! assert_eq!(data[0].count, 2);
//! ```

pub mod aggregate;
pub mod classify;
pub mod export;
pub mod filter;
pub mod pipeline;
pub mod sort;
pub mod suggest;
pub mod summary;

pub use aggregate::{AggregatedDatum, AggregationOptions, AggregationSpec, EmptyExtremum};
pub use filter::{FilterSet, FilterSpec};
pub use pipeline::{RenderStatus, RenderedChart};
pub use sort::SortState;
