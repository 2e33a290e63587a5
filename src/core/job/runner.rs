//! Aggregation job runner
//!
//! Runs one fetch per (patient, resource type) pair with bounded
//! concurrency and writes the results as NDJSON.

use super::ndjson::NdjsonWriter;
use super::summary::{FetchError, JobSummary};
use crate::adapters::upstream::DataSource;
use crate::config::MeridianConfig;
use crate::core::fetch::{FetchContext, FetchResult, ResourceFetcher, RetryPolicy};
use crate::domain::context::ResultExt;
use crate::domain::{BatchId, JobId, MeridianError, PatientId, ResourceType, Result};
use crate::log_error_with_context;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Settings of one aggregation job
#[derive(Debug, Clone)]
pub struct JobSettings {
    /// Resource types fetched for every patient
    pub resource_types: Vec<ResourceType>,

    /// Retry policy applied to each first-page request
    pub retry: RetryPolicy,

    /// Fetches in flight at once
    pub parallelism: usize,

    /// Directory NDJSON files are written to
    pub output_dir: PathBuf,

    /// Skip writing output files
    pub dry_run: bool,

    /// Lower bound of the export window (exclusive)
    pub since: Option<DateTime<Utc>>,

    /// Fixed snapshot instant of the export
    pub transaction_time: DateTime<Utc>,
}

impl JobSettings {
    /// Settings taken from the `[fetch]`, `[output]` and `[application]` sections
    ///
    /// # Errors
    ///
    /// Returns [`MeridianError::Configuration`] if a configured resource type
    /// is unknown or not fetchable.
    pub fn from_config(config: &MeridianConfig, transaction_time: DateTime<Utc>) -> Result<Self> {
        let resource_types = config
            .fetch
            .parsed_resource_types()
            .map_err(MeridianError::Configuration)?;

        Ok(Self {
            resource_types,
            retry: RetryPolicy::from(&config.fetch.retry),
            parallelism: config.fetch.parallel_patients,
            output_dir: PathBuf::from(&config.output.directory),
            dry_run: config.application.dry_run,
            since: None,
            transaction_time,
        })
    }
}

/// Fans fetches out across patients and resource types
///
/// A fatal failure in one fetch is recorded against its pair and does not
/// stop the others.
///
/// # Example
///
/// ```no_run
/// use meridian::adapters::upstream::create_data_source;
/// use meridian::config::load_config;
/// use meridian::core::job::{AggregationJob, JobSettings};
/// use meridian::domain::PatientId;
///
/// # async fn example() -> meridian::domain::Result<()> {
/// let config = load_config("meridian.toml")?;
/// let source = create_data_source(&config.upstream)?;
/// let settings = JobSettings::from_config(&config, chrono::Utc::now())?;
///
/// let job = AggregationJob::new(source, settings);
/// let summary = job.run(&[PatientId::new("MBI123").unwrap()]).await?;
/// println!("{} records", summary.total_resources());
/// # Ok(())
/// # }
/// ```
pub struct AggregationJob {
    job_id: JobId,
    batch_id: BatchId,
    source: Arc<dyn DataSource>,
    settings: JobSettings,
}

impl AggregationJob {
    pub fn new(source: Arc<dyn DataSource>, settings: JobSettings) -> Self {
        Self {
            job_id: JobId::new(),
            batch_id: BatchId::new(),
            source,
            settings,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn batch_id(&self) -> BatchId {
        self.batch_id
    }

    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    /// Fetches every configured resource type for each patient
    ///
    /// Duplicate patient identifiers are fetched once.
    ///
    /// # Errors
    ///
    /// Returns an error when the job cannot start (no resource types, `since`
    /// not before the transaction time) or an output file cannot be written.
    /// Individual fetch failures are reported in the [`JobSummary`].
    pub async fn run(&self, patients: &[PatientId]) -> Result<JobSummary> {
        let start_time = Instant::now();
        let mut summary = JobSummary::new(self.job_id);
        summary.dry_run = self.settings.dry_run;

        let first_type = self.settings.resource_types.first().copied().ok_or_else(|| {
            MeridianError::Configuration("No resource types to fetch".to_string())
        })?;
        let base_context = FetchContext::new(
            self.job_id,
            self.batch_id,
            first_type,
            self.settings.since,
            self.settings.transaction_time,
        )?;

        let mut seen = HashSet::new();
        let patients: Vec<&PatientId> = patients.iter().filter(|p| seen.insert(*p)).collect();
        summary.total_patients = patients.len();

        tracing::info!(
            job_id = %self.job_id,
            batch_id = %self.batch_id,
            patients = patients.len(),
            resource_types = ?self.settings.resource_types,
            parallelism = self.settings.parallelism,
            transaction_time = %self.settings.transaction_time,
            "Starting aggregation job"
        );

        let pairs: Vec<(&PatientId, ResourceType)> = patients
            .iter()
            .flat_map(|p| self.settings.resource_types.iter().map(move |t| (*p, *t)))
            .collect();

        let base_context = &base_context;
        let mut results = stream::iter(pairs)
            .map(|(patient_id, resource_type)| async move {
                let fetcher = ResourceFetcher::new(
                    Arc::clone(&self.source),
                    base_context.for_resource_type(resource_type),
                    self.settings.retry,
                );
                let result = fetcher.fetch_resources(patient_id).await;
                (patient_id, resource_type, result)
            })
            .buffer_unordered(self.settings.parallelism.max(1));

        let mut writer = NdjsonWriter::new(&self.settings.output_dir, self.settings.dry_run);

        while let Some((patient_id, resource_type, result)) = results.next().await {
            match result {
                Ok(FetchResult::Resources(resources)) => {
                    summary.record_resources(resource_type, resources.len());
                    writer
                        .write_resources(resource_type, &resources)
                        .await
                        .with_context(|| {
                            format!("Failed to write {resource_type} records for {patient_id}")
                        })?;
                }
                Ok(FetchResult::Outcome(outcome)) => {
                    summary.record_outcome();
                    writer.write_outcome(&outcome).await.with_context(|| {
                        format!("Failed to write OperationOutcome for {patient_id}")
                    })?;
                }
                Err(e) => {
                    log_error_with_context!(
                        e,
                        format!("Fetch failed for {patient_id} ({resource_type})")
                    );
                    summary.add_error(FetchError::new(patient_id.clone(), resource_type, &e));
                }
            }
        }

        let written = writer.finish().await.context("Failed to flush export files")?;
        for path in &written {
            tracing::debug!(path = %path.display(), "Wrote export file");
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }
}
