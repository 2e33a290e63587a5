//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "meridian.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Meridian configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your upstream FHIR server", self.output);
                println!("  2. Export credentials, e.g. MERIDIAN_UPSTREAM_TOKEN");
                println!("  3. Validate configuration: meridian validate-config");
                println!("  4. Run a fetch: meridian fetch --patient <MBI>");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# Meridian Configuration File

[application]
log_level = "info"
dry_run = false

[upstream]
base_url = "https://sandbox.bluebutton.cms.gov/v2/fhir"
auth_type = "bearer"
token = "${MERIDIAN_UPSTREAM_TOKEN}"

[fetch]
resource_types = ["ExplanationOfBenefit", "Coverage", "Patient"]

[fetch.retry]
max_attempts = 3
wait_ms = 0

[output]
directory = "./export"
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# Meridian Configuration File
# Per-patient FHIR claims aggregation
#
# Any value may reference an environment variable as ${NAME}.
# MERIDIAN_* environment variables override file values.

# development | staging | production
environment = "development"

[application]
# trace | debug | info | warn | error
log_level = "info"
# Fetch everything but skip writing NDJSON files
dry_run = false

[upstream]
# fhir: talk to a FHIR server over HTTP(S)
# fixture: read bundles from a local directory
source_type = "fhir"
base_url = "https://sandbox.bluebutton.cms.gov/v2/fhir"
# fixture_dir = "./fixtures"

# none | basic | bearer
auth_type = "bearer"
token = "${MERIDIAN_UPSTREAM_TOKEN}"
# username = "meridian"
# password = "${MERIDIAN_UPSTREAM_PASSWORD}"

# Cannot be disabled in production
tls_verify = true
timeout_seconds = 60
# Sent as _count on first-page searches
# page_size = 50

[fetch]
# Patient | ExplanationOfBenefit | Coverage
resource_types = ["ExplanationOfBenefit", "Coverage", "Patient"]
# Fetches run concurrently by a job
parallel_patients = 8

[fetch.retry]
# Attempts at the first page, including the first one
max_attempts = 3
# Pause between attempts
wait_ms = 0

[output]
# One <ResourceType>.ndjson per type
directory = "./export"

[logging]
# JSON log file in addition to the console
local_enabled = false
local_path = "/var/log/meridian"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config, AuthType};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meridian.toml");
        std::env::set_var("MERIDIAN_UPSTREAM_TOKEN", "init-test-token");

        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            with_examples: true,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 0);

        let config = load_config(&path).unwrap();
        assert_eq!(config.upstream.auth_type, AuthType::Bearer);
        assert_eq!(config.fetch.resource_types.len(), 3);
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meridian.toml");
        fs::write(&path, "existing").unwrap();

        let mut args = InitArgs {
            output: path.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing");

        args.force = true;
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&path).unwrap().contains("[upstream]"));
    }

    #[test]
    fn test_minimal_config_parses() {
        let value: toml::Value = toml::from_str(&InitArgs::generate_minimal_config()).unwrap();
        assert!(value.get("upstream").is_some());
    }
}
