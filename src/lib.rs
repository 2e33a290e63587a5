// Meridian - Per-patient FHIR claims aggregation
// Copyright (c) 2025 Meridian Contributors
// Licensed under the MIT License

//! # Meridian - Per-patient FHIR claims aggregation
//!
//! Meridian collects a patient's claims history from an upstream FHIR source
//! and writes it out as NDJSON, one file per resource type.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Resolving** an external patient identifier (an MBI) to the upstream beneficiary id
//! - **Fetching** `Patient`, `ExplanationOfBenefit` and `Coverage` records page by page
//! - **Checking** every page for staleness and unexpected resource types
//! - **Reporting** upstream failures as FHIR `OperationOutcome` records
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Fetch engine and aggregation jobs
//! - [`adapters`] - Upstream data sources (FHIR over HTTP, local fixtures)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meridian::adapters::upstream::create_data_source;
//! use meridian::config::load_config;
//! use meridian::core::fetch::{FetchContext, FetchResult, ResourceFetcher, RetryPolicy};
//! use meridian::domain::{BatchId, JobId, PatientId, ResourceType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("meridian.toml")?;
//!     let source = create_data_source(&config.upstream)?;
//!
//!     let context = FetchContext::new(
//!         JobId::new(),
//!         BatchId::new(),
//!         ResourceType::ExplanationOfBenefit,
//!         None,
//!         chrono::Utc::now(),
//!     )?;
//!     let fetcher = ResourceFetcher::new(source, context, RetryPolicy::default());
//!
//!     match fetcher.fetch_resources(&PatientId::new("MBI123")?).await? {
//!         FetchResult::Resources(records) => println!("Fetched {} claims", records.len()),
//!         FetchResult::Outcome(outcome) => println!("Upstream failed: {outcome:?}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Meridian uses [`domain::MeridianError`] for all errors. Errors that describe
//! bad data or bad requests are fatal and always propagate; upstream
//! availability problems become an `OperationOutcome` instead.
//!
//! ## Logging
//!
//! Meridian uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(resource_type = "Coverage", count = 3, "Fetch completed");
//! warn!(attempt = 2, "Retrying first page");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
