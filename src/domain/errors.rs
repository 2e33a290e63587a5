//! Domain error types
//!
//! This module defines the error hierarchy for Meridian. Every failure a fetch
//! can produce lands in exactly one class, and the class decides whether the
//! failure is retried, converted into an outcome record, or propagated.
//! All errors are domain-specific and don't expose third-party types.

use super::ids::{BatchId, JobId};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Main Meridian error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum MeridianError {
    /// Failure raised by (or attributed to) the surrounding job/queue layer
    #[error("Job failure: {0}")]
    JobQueue(#[from] JobFailure),

    /// Identity resolution matched the wrong number of patients
    #[error(
        "Data consistency error (job {job_id}, batch {batch_id}): Expected {expected} Patient to match MBI but found {found}"
    )]
    DataConsistency {
        job_id: JobId,
        batch_id: BatchId,
        expected: u64,
        found: u64,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A page contained a record of an unexpected resource type
    #[error("Format error: {0}")]
    Format(String),

    /// A page claims a snapshot older than the export's transaction time
    #[error(
        "Upstream transaction time regression: bundle {bundle_time} is earlier than job {transaction_time}"
    )]
    DataRegression {
        bundle_time: DateTime<Utc>,
        transaction_time: DateTime<Utc>,
    },

    /// Remote data source errors
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Unclassified internal errors
    #[error("{0}")]
    Internal(String),

    /// An error with added context
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<MeridianError>,
    },
}

impl MeridianError {
    /// Whether this failure must always propagate to the caller.
    ///
    /// Fatal failures are never retried by the fetch engine and never turned
    /// into an outcome record.
    pub fn is_fatal(&self) -> bool {
        match self {
            MeridianError::JobQueue(_)
            | MeridianError::DataConsistency { .. }
            | MeridianError::Configuration(_)
            | MeridianError::Format(_)
            | MeridianError::DataRegression { .. } => true,
            MeridianError::Context { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// The innermost error, with any added context stripped
    pub fn root(&self) -> &MeridianError {
        match self {
            MeridianError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// The upstream error this failure originated from, if any
    pub fn as_upstream(&self) -> Option<&UpstreamError> {
        match self.root() {
            MeridianError::Upstream(e) => Some(e),
            _ => None,
        }
    }
}

/// Internal failure attributed to the job/queue layer
///
/// Carries the job and batch that were running so operators can find the
/// failed unit of work.
#[derive(Debug, Clone, Error)]
#[error("{message} (job {job_id}, batch {batch_id})")]
pub struct JobFailure {
    /// Job the failure belongs to
    pub job_id: JobId,

    /// Batch the failure belongs to
    pub batch_id: BatchId,

    /// What went wrong
    pub message: String,

    /// Upstream error behind the failure, when there was one
    #[source]
    pub cause: Option<UpstreamError>,
}

impl JobFailure {
    /// Creates a new job failure
    pub fn new(job_id: JobId, batch_id: BatchId, message: impl Into<String>) -> Self {
        Self {
            job_id,
            batch_id,
            message: message.into(),
            cause: None,
        }
    }

    /// Attaches the upstream error the failure came from
    pub fn caused_by(mut self, cause: UpstreamError) -> Self {
        self.cause = Some(cause);
        self
    }
}

/// Remote data source errors
///
/// Errors that occur when talking to the upstream FHIR source.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// Failed to connect to the upstream server
    #[error("Failed to connect to upstream server: {0}")]
    ConnectionFailed(String),

    /// Authentication or transport security failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid response from server
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// The requested resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Non-success HTTP status
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl UpstreamError {
    /// HTTP status code associated with this error, when the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            UpstreamError::NotFound(_) => Some(404),
            UpstreamError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for MeridianError {
    fn from(err: std::io::Error) -> Self {
        MeridianError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MeridianError {
    fn from(err: serde_json::Error) -> Self {
        MeridianError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for MeridianError {
    fn from(err: toml::de::Error) -> Self {
        MeridianError::Configuration(format!("TOML parse error: {err}"))
    }
}
