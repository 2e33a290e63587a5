//! Per-invocation fetch context

use super::window::TimeWindow;
use crate::domain::{BatchId, JobId, MeridianError, ResourceType, Result};
use chrono::{DateTime, Utc};

/// Immutable inputs of one patient/resource-type fetch
///
/// Job and batch identifiers are only used to attribute failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchContext {
    job_id: JobId,
    batch_id: BatchId,
    resource_type: ResourceType,
    since: Option<DateTime<Utc>>,
    transaction_time: DateTime<Utc>,
}

impl FetchContext {
    /// Creates a context
    ///
    /// # Errors
    ///
    /// Returns [`MeridianError::Validation`] when `since` is not strictly
    /// earlier than `transaction_time`.
    pub fn new(
        job_id: JobId,
        batch_id: BatchId,
        resource_type: ResourceType,
        since: Option<DateTime<Utc>>,
        transaction_time: DateTime<Utc>,
    ) -> Result<Self> {
        if let Some(since) = since {
            if since >= transaction_time {
                return Err(MeridianError::Validation(format!(
                    "since ({since}) must be earlier than transaction time ({transaction_time})"
                )));
            }
        }

        Ok(Self {
            job_id,
            batch_id,
            resource_type,
            since,
            transaction_time,
        })
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn batch_id(&self) -> BatchId {
        self.batch_id
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn since(&self) -> Option<DateTime<Utc>> {
        self.since
    }

    pub fn transaction_time(&self) -> DateTime<Utc> {
        self.transaction_time
    }

    /// Query window derived from `since` and the transaction time
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.since, self.transaction_time)
    }

    /// Same job, batch and window for another resource type
    pub fn for_resource_type(&self, resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            ..self.clone()
        }
    }
}
