//! Configuration management for Meridian.
//!
//! # Overview
//!
//! Meridian reads a single TOML file (by default `meridian.toml`) with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `MERIDIAN_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use meridian::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("meridian.toml")?;
//!
//! println!("Upstream: {}", config.upstream.base_url);
//! println!("Max attempts: {}", config.fetch.retry.max_attempts);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [upstream]
//! base_url = "https://fhir.example.com/v2/fhir"
//! auth_type = "bearer"
//! token = "${MERIDIAN_UPSTREAM_TOKEN}"
//!
//! [fetch]
//! resource_types = ["Patient", "ExplanationOfBenefit", "Coverage"]
//! parallel_patients = 8
//!
//! [fetch.retry]
//! max_attempts = 3
//!
//! [output]
//! directory = "./export"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, AuthType, Environment, FetchConfig, LoggingConfig, MeridianConfig,
    OutputConfig, RetryConfig, SourceType, UpstreamConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
