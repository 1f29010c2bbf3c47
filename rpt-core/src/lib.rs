//! Core types for the report analysis engine.
//!
//! - [`scalar`]: the tagged cell value of a schema-less result row
//! - [`result_set`]: `ResultRow` / `ResultSet`, plus JSON and CSV ingestion
//! - [`profile`]: semantic column types produced by the classifier
//! - [`chart`]: persisted chart configurations and their enums
//! - [`report`]: execution requests, responses and server-side filter definitions
//! - [`backend`]: the `ReportExecutor` and `ChartConfigStore` boundary traits
//! - `api` (feature `api`): HTTP implementation of both boundary traits

pub mod backend;
pub mod chart;
pub mod profile;
pub mod report;
pub mod result_set;
pub mod scalar;

#[cfg(feature = "api")]
pub mod api;

pub use chart::{Aggregation, ChartConfig, ChartDraft, ChartType, ConfigId, ReportId, SortDirection};
pub use profile::{ColumnProfile, SemanticType};
pub use result_set::{ResultRow, ResultSet};
pub use scalar::Scalar;
