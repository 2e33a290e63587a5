//! Aggregation jobs
//!
//! Caller-side fan-out over the fetch engine: many patients, several
//! resource types, bounded concurrency, NDJSON output.

pub mod ndjson;
pub mod runner;
pub mod summary;

pub use ndjson::NdjsonWriter;
pub use runner::{AggregationJob, JobSettings};
pub use summary::{FetchError, FetchErrorKind, JobSummary};
