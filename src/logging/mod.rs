//! Logging and observability
//!
//! Structured logging through `tracing`, with a console layer and an optional
//! rolling JSON file. The macros below keep field names consistent across the
//! fetch engine and the aggregation job.
//!
//! # Example
//!
//! ```no_run
//! use meridian::logging::init_logging;
//! use meridian::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of one patient/resource-type fetch
///
/// # Example
///
/// ```no_run
/// use meridian::log_fetch_start;
/// use meridian::domain::{JobId, PatientId, ResourceType};
///
/// let job_id = JobId::new();
/// let patient_id = PatientId::new("1SQ3F00AA00").unwrap();
/// log_fetch_start!(uuid::Uuid::new_v4(), &job_id, &patient_id, ResourceType::Coverage);
/// ```
#[macro_export]
macro_rules! log_fetch_start {
    ($fetch_id:expr, $job_id:expr, $patient_id:expr, $resource_type:expr) => {
        tracing::debug!(
            fetch_id = %$fetch_id,
            job_id = %$job_id,
            patient_id = %$patient_id,
            resource_type = %$resource_type,
            "Starting fetch"
        );
    };
}

/// Log the completion of a fetch
///
/// # Example
///
/// ```no_run
/// use meridian::log_fetch_complete;
/// use meridian::domain::ResourceType;
///
/// log_fetch_complete!(uuid::Uuid::new_v4(), ResourceType::ExplanationOfBenefit, 45, 3);
/// ```
#[macro_export]
macro_rules! log_fetch_complete {
    ($fetch_id:expr, $resource_type:expr, $count:expr, $pages:expr) => {
        tracing::debug!(
            fetch_id = %$fetch_id,
            resource_type = %$resource_type,
            count = $count,
            pages = $pages,
            "Fetch completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use meridian::log_error_with_context;
/// use meridian::domain::MeridianError;
///
/// let error = MeridianError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use meridian::log_retry_attempt;
///
/// log_retry_attempt!(1, 3, 0u64, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying request after error"
        );
    };
}
