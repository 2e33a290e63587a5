//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Meridian configuration file.

use crate::config::{load_config, SourceType};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        match config.validate() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Environment: {:?}", config.environment);
                println!("  Log Level: {}", config.application.log_level);
                match config.upstream.source_type {
                    SourceType::Fhir => {
                        println!("  Upstream: {}", config.upstream.base_url);
                        println!("  Auth: {:?}", config.upstream.auth_type);
                        println!("  TLS Verify: {}", config.upstream.tls_verify);
                    }
                    SourceType::Fixture => {
                        println!(
                            "  Fixtures: {}",
                            config.upstream.fixture_dir.as_deref().unwrap_or_default()
                        );
                    }
                }
                println!("  Resource Types: {:?}", config.fetch.resource_types);
                println!("  Max Attempts: {}", config.fetch.retry.max_attempts);
                println!("  Parallel Patients: {}", config.fetch.parallel_patients);
                println!("  Output: {}", config.output.directory);
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}
