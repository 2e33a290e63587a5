//! Aggregation job summary and reporting

use crate::domain::{JobId, MeridianError, PatientId, ResourceType, UpstreamError};
use std::collections::BTreeMap;
use std::time::Duration;

/// Kind of a fetch that ended in a propagated error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Upstream unreachable, including during identity lookup
    Connection,
    /// Unsupported resource type or bad settings
    Configuration,
    /// Identity lookup matched zero or several patients
    DataConsistency,
    /// Page carried a record of the wrong type
    Format,
    /// Page snapshot older than the transaction time
    Regression,
    /// Job-layer failure, including identity lookups that failed for
    /// reasons other than connectivity
    JobQueue,
    /// Anything else
    Unknown,
}

impl FetchErrorKind {
    /// Classifies a propagated fetch error
    pub fn of(error: &MeridianError) -> Self {
        match error.root() {
            MeridianError::JobQueue(failure) => match &failure.cause {
                Some(cause) if is_connectivity(cause) => Self::Connection,
                _ => Self::JobQueue,
            },
            MeridianError::DataConsistency { .. } => Self::DataConsistency,
            MeridianError::Configuration(_) => Self::Configuration,
            MeridianError::Format(_) => Self::Format,
            MeridianError::DataRegression { .. } => Self::Regression,
            MeridianError::Upstream(cause) if is_connectivity(cause) => Self::Connection,
            _ => Self::Unknown,
        }
    }
}

fn is_connectivity(error: &UpstreamError) -> bool {
    matches!(
        error,
        UpstreamError::ConnectionFailed(_) | UpstreamError::Timeout(_)
    )
}

/// A patient/resource-type pair whose fetch failed fatally
#[derive(Debug, Clone)]
pub struct FetchError {
    pub patient_id: PatientId,
    pub resource_type: ResourceType,
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(patient_id: PatientId, resource_type: ResourceType, error: &MeridianError) -> Self {
        Self {
            patient_id,
            resource_type,
            kind: FetchErrorKind::of(error),
            message: error.to_string(),
        }
    }
}

/// Summary of an aggregation job
#[derive(Debug, Clone)]
pub struct JobSummary {
    /// Job the summary belongs to
    pub job_id: JobId,

    /// Number of distinct patients requested
    pub total_patients: usize,

    /// Records written per resource type
    pub resources: BTreeMap<String, usize>,

    /// OperationOutcome records written
    pub outcomes: usize,

    /// Fetches that ended in a propagated error
    pub errors: Vec<FetchError>,

    /// Whether output files were skipped
    pub dry_run: bool,

    /// Wall-clock duration of the job
    pub duration: Duration,
}

impl JobSummary {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            total_patients: 0,
            resources: BTreeMap::new(),
            outcomes: 0,
            errors: Vec::new(),
            dry_run: false,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn record_resources(&mut self, resource_type: ResourceType, count: usize) {
        *self
            .resources
            .entry(resource_type.as_str().to_string())
            .or_insert(0) += count;
    }

    pub fn record_outcome(&mut self) {
        self.outcomes += 1;
    }

    pub fn add_error(&mut self, error: FetchError) {
        self.errors.push(error);
    }

    /// Records written across all resource types
    pub fn total_resources(&self) -> usize {
        self.resources.values().sum()
    }

    /// Records written for one resource type
    pub fn resources_for(&self, resource_type: ResourceType) -> usize {
        self.resources
            .get(resource_type.as_str())
            .copied()
            .unwrap_or(0)
    }

    /// No outcomes and no fatal errors
    pub fn is_successful(&self) -> bool {
        self.outcomes == 0 && self.errors.is_empty()
    }

    /// True when every failed fetch failed on connectivity
    pub fn only_connection_errors(&self) -> bool {
        !self.errors.is_empty()
            && self
                .errors
                .iter()
                .all(|e| e.kind == FetchErrorKind::Connection)
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            job_id = %self.job_id,
            total_patients = self.total_patients,
            total_resources = self.total_resources(),
            outcomes = self.outcomes,
            errors = self.errors.len(),
            dry_run = self.dry_run,
            duration_ms = self.duration.as_millis() as u64,
            "Aggregation job completed"
        );

        for error in &self.errors {
            tracing::warn!(
                patient_id = %error.patient_id,
                resource_type = %error.resource_type,
                kind = ?error.kind,
                message = %error.message,
                "Fetch failed"
            );
        }
    }
}
