//! Fetch command implementation
//!
//! Runs an aggregation job for the given patients and writes one NDJSON file
//! per resource type.

use crate::adapters::upstream::create_data_source;
use crate::config::load_config;
use crate::core::job::{AggregationJob, JobSettings, JobSummary};
use crate::domain::PatientId;
use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the fetch command
#[derive(Args, Debug, Default)]
pub struct FetchArgs {
    /// External patient identifier(s); repeat the flag or separate with commas
    #[arg(short, long = "patient", value_delimiter = ',')]
    pub patients: Vec<String>,

    /// File with one patient identifier per line (`#` starts a comment)
    #[arg(long)]
    pub patients_file: Option<PathBuf>,

    /// Override resource type(s) to fetch
    #[arg(long = "resource-type", value_delimiter = ',')]
    pub resource_types: Vec<String>,

    /// Only fetch resources updated after this instant (RFC 3339)
    #[arg(long, value_parser = parse_timestamp)]
    pub since: Option<DateTime<Utc>>,

    /// Snapshot instant of the export (RFC 3339); defaults to now
    #[arg(long, value_parser = parse_timestamp)]
    pub transaction_time: Option<DateTime<Utc>>,

    /// Override the output directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// Fetch without writing output files
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("'{raw}' is not an RFC 3339 timestamp: {e}"))
}

impl FetchArgs {
    /// Execute the fetch command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting fetch command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        // Apply CLI overrides
        if !self.resource_types.is_empty() {
            tracing::info!(resource_types = ?self.resource_types, "Overriding resource types from CLI");
            config.fetch.resource_types = self.resource_types.clone();
        }
        if let Some(output) = &self.output {
            tracing::info!(output = %output, "Overriding output directory from CLI");
            config.output.directory = output.clone();
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("❌ Configuration validation failed: {e}");
            return Ok(2);
        }

        let patients = match self.collect_patients() {
            Ok(p) if p.is_empty() => {
                eprintln!("❌ No patients given. Use --patient or --patients-file");
                return Ok(2);
            }
            Ok(p) => p,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let transaction_time = self.transaction_time.unwrap_or_else(Utc::now);
        let mut settings = JobSettings::from_config(&config, transaction_time)?;
        if let Some(since) = self.since {
            if since >= transaction_time {
                eprintln!("❌ --since must be earlier than the transaction time ({transaction_time})");
                return Ok(2);
            }
            settings.since = Some(since);
        }

        if settings.dry_run {
            println!("🔍 DRY RUN MODE - No files will be written");
            println!();
        }

        let source = match create_data_source(&config.upstream) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create upstream data source");
                eprintln!("❌ Failed to initialize upstream source: {e}");
                return Ok(4);
            }
        };

        println!(
            "🚀 Fetching {:?} for {} patient(s) from {}",
            settings.resource_types,
            patients.len(),
            source.base_url()
        );
        println!();

        let output_dir = settings.output_dir.clone();
        let job = AggregationJob::new(source, settings);
        let summary = match job.run(&patients).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Aggregation job failed");
                eprintln!("❌ Fetch failed: {e}");
                return Ok(5);
            }
        };

        print_summary(&summary, &output_dir);
        Ok(exit_code(&summary))
    }

    /// Patients from `--patient` followed by `--patients-file`
    fn collect_patients(&self) -> anyhow::Result<Vec<PatientId>> {
        let mut raw: Vec<String> = self.patients.clone();

        if let Some(path) = &self.patients_file {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                anyhow::anyhow!("Failed to read patients file {}: {e}", path.display())
            })?;
            raw.extend(
                contents
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(str::to_string),
            );
        }

        raw.into_iter()
            .map(|id| PatientId::new(id).map_err(|e| anyhow::anyhow!(e)))
            .collect()
    }
}

fn print_summary(summary: &JobSummary, output_dir: &std::path::Path) {
    println!("📊 Fetch Summary:");
    println!("  Job ID: {}", summary.job_id);
    println!("  Patients: {}", summary.total_patients);
    for (resource_type, count) in &summary.resources {
        println!("  {resource_type}: {count}");
    }
    println!("  OperationOutcomes: {}", summary.outcomes);
    println!("  Failed fetches: {}", summary.errors.len());
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    if !summary.dry_run {
        println!("  Output: {}", output_dir.display());
    }
    println!();

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in &summary.errors {
            println!(
                "  - {} {} ({:?}): {}",
                error.patient_id, error.resource_type, error.kind, error.message
            );
        }
        println!();
    }
}

fn exit_code(summary: &JobSummary) -> i32 {
    if summary.only_connection_errors() {
        println!("❌ Upstream source unreachable");
        4
    } else if !summary.errors.is_empty() {
        println!("❌ Fetch completed with fatal errors");
        5
    } else if summary.outcomes > 0 {
        println!("⚠️  Fetch completed with OperationOutcomes");
        1
    } else {
        println!("✅ Fetch completed successfully!");
        0
    }
}
