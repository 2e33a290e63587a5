//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{AuthType, MeridianConfig, SourceType};
use super::secret::secret_string;
use crate::domain::errors::MeridianError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into MeridianConfig
/// 4. Applies environment variable overrides (MERIDIAN_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`MeridianError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, the TOML is malformed, or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use meridian::config::loader::load_config;
///
/// let config = load_config("meridian.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MeridianConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MeridianError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        MeridianError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: MeridianConfig = toml::from_str(&contents)
        .map_err(|e| MeridianError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        MeridianError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied through untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| MeridianError::Internal(format!("invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|m| m == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    cap[0].to_string()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(MeridianError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using MERIDIAN_* prefix
///
/// Environment variables follow the pattern: MERIDIAN_<SECTION>_<KEY>
/// For example: MERIDIAN_UPSTREAM_BASE_URL, MERIDIAN_FETCH_MAX_ATTEMPTS
fn apply_env_overrides(config: &mut MeridianConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("MERIDIAN_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("MERIDIAN_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Upstream overrides
    if let Ok(val) = std::env::var("MERIDIAN_UPSTREAM_SOURCE_TYPE") {
        config.upstream.source_type = match val.to_lowercase().as_str() {
            "fhir" => SourceType::Fhir,
            "fixture" => SourceType::Fixture,
            other => {
                return Err(MeridianError::Configuration(format!(
                    "MERIDIAN_UPSTREAM_SOURCE_TYPE: unknown source type '{other}'"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("MERIDIAN_UPSTREAM_BASE_URL") {
        config.upstream.base_url = val;
    }
    if let Ok(val) = std::env::var("MERIDIAN_UPSTREAM_FIXTURE_DIR") {
        config.upstream.fixture_dir = Some(val);
    }
    if let Ok(val) = std::env::var("MERIDIAN_UPSTREAM_AUTH_TYPE") {
        config.upstream.auth_type = match val.to_lowercase().as_str() {
            "none" => AuthType::None,
            "basic" => AuthType::Basic,
            "bearer" => AuthType::Bearer,
            other => {
                return Err(MeridianError::Configuration(format!(
                    "MERIDIAN_UPSTREAM_AUTH_TYPE: unknown auth type '{other}'"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("MERIDIAN_UPSTREAM_USERNAME") {
        config.upstream.username = Some(val);
    }
    if let Ok(val) = std::env::var("MERIDIAN_UPSTREAM_PASSWORD") {
        config.upstream.password = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("MERIDIAN_UPSTREAM_TOKEN") {
        config.upstream.token = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("MERIDIAN_UPSTREAM_TLS_VERIFY") {
        config.upstream.tls_verify = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("MERIDIAN_UPSTREAM_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.upstream.timeout_seconds = timeout;
        }
    }

    // Fetch overrides
    if let Ok(val) = std::env::var("MERIDIAN_FETCH_MAX_ATTEMPTS") {
        if let Ok(attempts) = val.parse() {
            config.fetch.retry.max_attempts = attempts;
        }
    }
    if let Ok(val) = std::env::var("MERIDIAN_FETCH_WAIT_MS") {
        if let Ok(wait) = val.parse() {
            config.fetch.retry.wait_ms = wait;
        }
    }
    if let Ok(val) = std::env::var("MERIDIAN_FETCH_PARALLEL_PATIENTS") {
        if let Ok(parallel) = val.parse() {
            config.fetch.parallel_patients = parallel;
        }
    }

    // Output overrides
    if let Ok(val) = std::env::var("MERIDIAN_OUTPUT_DIRECTORY") {
        config.output.directory = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("MERIDIAN_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("MERIDIAN_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
