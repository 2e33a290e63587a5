//! Core business logic for Meridian.
//!
//! # Modules
//!
//! - [`fetch`] - Resilient paginated fetch for one patient and resource type
//! - [`job`] - Aggregation across many patients with NDJSON output
//!
//! # Fetch Workflow
//!
//! 1. **Resolve**: Map the external identifier to the beneficiary id
//! 2. **Window**: Bound the search by `_lastUpdated`
//! 3. **First page**: Request it under the retry policy
//! 4. **Walk**: Follow `next` links, checking freshness and record types
//! 5. **Report**: Emit the records, or one OperationOutcome if the upstream failed
//!
//! # Example
//!
//! ```rust,no_run
//! use meridian::adapters::upstream::create_data_source;
//! use meridian::config::load_config;
//! use meridian::core::job::{AggregationJob, JobSettings};
//! use meridian::domain::PatientId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("meridian.toml")?;
//! let source = create_data_source(&config.upstream)?;
//! let settings = JobSettings::from_config(&config, chrono::Utc::now())?;
//!
//! let summary = AggregationJob::new(source, settings)
//!     .run(&[PatientId::new("MBI123")?])
//!     .await?;
//!
//! println!("Records: {}", summary.total_resources());
//! println!("Outcomes: {}", summary.outcomes);
//! # Ok(())
//! # }
//! ```

pub mod fetch;
pub mod job;
