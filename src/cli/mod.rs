//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Meridian using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Meridian - per-patient FHIR claims aggregation
#[derive(Parser, Debug)]
#[command(name = "meridian")]
#[command(version, about, long_about = None)]
#[command(author = "Meridian Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "meridian.toml", env = "MERIDIAN_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MERIDIAN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch resources for one or more patients into NDJSON files
    Fetch(commands::fetch::FetchArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_fetch() {
        let cli = Cli::parse_from(["meridian", "fetch", "--patient", "MBI123"]);
        assert_eq!(cli.config, "meridian.toml");
        match cli.command {
            Commands::Fetch(args) => assert_eq!(args.patients, vec!["MBI123"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_fetch_repeated_and_delimited() {
        let cli = Cli::parse_from([
            "meridian",
            "fetch",
            "--patient",
            "A,B",
            "--patient",
            "C",
            "--resource-type",
            "Coverage,Patient",
            "--dry-run",
        ]);
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.patients, vec!["A", "B", "C"]);
                assert_eq!(args.resource_types, vec!["Coverage", "Patient"]);
                assert!(args.dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["meridian", "--config", "custom.toml", "validate-config"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["meridian", "--log-level", "debug", "init"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_cli_rejects_bad_timestamp() {
        let result = Cli::try_parse_from(["meridian", "fetch", "--since", "yesterday"]);
        assert!(result.is_err());
    }
}
