//! Configuration schema types
//!
//! This module defines the configuration structure for Meridian.

use crate::config::SecretString;
use crate::domain::ResourceType;
use serde::Deserialize;

/// Upstream data source implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// FHIR REST server over HTTP(S)
    #[default]
    Fhir,
    /// Bundles read from a local directory
    Fixture,
}

/// Authentication scheme for the upstream source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// No Authorization header
    #[default]
    None,
    /// HTTP Basic with username/password
    Basic,
    /// Static bearer token
    Bearer,
}

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main Meridian configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct MeridianConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Upstream data source
    pub upstream: UpstreamConfig,

    /// Fetch engine settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Where exported NDJSON lands
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MeridianConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.upstream.validate(&self.environment)?;
        self.fetch.validate()?;
        self.output.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (fetch, but don't write output files)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Upstream FHIR source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Which implementation talks to the source
    #[serde(default)]
    pub source_type: SourceType,

    /// Base URL of the FHIR server (required for `fhir`)
    #[serde(default)]
    pub base_url: String,

    /// Directory holding bundle fixtures (required for `fixture`)
    #[serde(default)]
    pub fixture_dir: Option<String>,

    /// Authentication scheme
    #[serde(default)]
    pub auth_type: AuthType,

    /// Username for basic authentication
    #[serde(default)]
    pub username: Option<String>,

    /// Password for basic authentication
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Bearer token
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub token: Option<SecretString>,

    /// TLS certificate verification enabled
    ///
    /// Cannot be disabled when `environment = "production"`.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// `_count` sent with first-page searches; server default when unset
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl UpstreamConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        match self.source_type {
            SourceType::Fhir => {
                if self.base_url.is_empty() {
                    return Err("upstream.base_url cannot be empty".to_string());
                }
                if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://")
                {
                    return Err("upstream.base_url must start with http:// or https://".to_string());
                }
            }
            SourceType::Fixture => {
                if self.fixture_dir.as_deref().map_or(true, str::is_empty) {
                    return Err(
                        "upstream.fixture_dir is required when source_type is 'fixture'"
                            .to_string(),
                    );
                }
            }
        }

        match self.auth_type {
            AuthType::None => {}
            AuthType::Basic => {
                if self.username.as_deref().map_or(true, str::is_empty) {
                    return Err(
                        "upstream.username cannot be empty when auth_type is 'basic'".to_string()
                    );
                }
                if self
                    .password
                    .as_ref()
                    .map_or(true, |p| p.expose_secret().is_empty())
                {
                    return Err(
                        "upstream.password cannot be empty when auth_type is 'basic'".to_string()
                    );
                }
            }
            AuthType::Bearer => {
                if self
                    .token
                    .as_ref()
                    .map_or(true, |t| t.expose_secret().is_empty())
                {
                    return Err(
                        "upstream.token cannot be empty when auth_type is 'bearer'".to_string()
                    );
                }
            }
        }

        if self.timeout_seconds == 0 {
            return Err("upstream.timeout_seconds must be > 0".to_string());
        }

        if let Some(page_size) = self.page_size {
            if page_size == 0 {
                return Err("upstream.page_size must be > 0 when set".to_string());
            }
        }

        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments"
                    .to_string(),
            );
        }

        Ok(())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            source_type: SourceType::Fhir,
            base_url: "http://localhost:8080/fhir".to_string(),
            fixture_dir: None,
            auth_type: AuthType::None,
            username: None,
            password: None,
            token: None,
            tls_verify: true,
            timeout_seconds: default_timeout_seconds(),
            page_size: None,
        }
    }
}

/// Retry settings for the first-page request
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Pause between attempts in milliseconds
    #[serde(default)]
    pub wait_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            wait_ms: 0,
        }
    }
}

/// Fetch engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Resource types to fetch for every patient
    #[serde(default = "default_resource_types")]
    pub resource_types: Vec<String>,

    /// Retry settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Number of fetches run concurrently by an aggregation job
    #[serde(default = "default_parallel_patients")]
    pub parallel_patients: usize,
}

impl FetchConfig {
    fn validate(&self) -> Result<(), String> {
        if self.resource_types.is_empty() {
            return Err("fetch.resource_types cannot be empty".to_string());
        }

        self.parsed_resource_types()?;

        if self.retry.max_attempts == 0 || self.retry.max_attempts > 10 {
            return Err(format!(
                "fetch.retry.max_attempts must be between 1 and 10, got {}",
                self.retry.max_attempts
            ));
        }

        if self.parallel_patients == 0 || self.parallel_patients > 100 {
            return Err(format!(
                "fetch.parallel_patients must be between 1 and 100, got {}",
                self.parallel_patients
            ));
        }

        Ok(())
    }

    /// Configured resource types, parsed and checked to be fetchable
    pub fn parsed_resource_types(&self) -> Result<Vec<ResourceType>, String> {
        self.resource_types
            .iter()
            .map(|name| {
                let resource_type: ResourceType = name.parse()?;
                if !resource_type.is_fetchable() {
                    return Err(format!(
                        "fetch.resource_types: '{name}' cannot be fetched"
                    ));
                }
                Ok(resource_type)
            })
            .collect()
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            resource_types: default_resource_types(),
            retry: RetryConfig::default(),
            parallel_patients: default_parallel_patients(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory NDJSON files are written to
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.trim().is_empty() {
            return Err("output.directory cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }

    /// Console-only logging, used before a configuration file is available
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_attempts() -> usize {
    3
}

fn default_resource_types() -> Vec<String> {
    ResourceType::FETCHABLE
        .iter()
        .map(|t| t.as_str().to_string())
        .collect()
}

fn default_parallel_patients() -> usize {
    8
}

fn default_output_directory() -> String {
    "./export".to_string()
}

fn default_local_path() -> String {
    "/var/log/meridian".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn fhir_upstream() -> UpstreamConfig {
        UpstreamConfig {
            base_url: "https://fhir.example.com/v1/fhir".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_upstream_fhir_requires_http_url() {
        let mut config = fhir_upstream();
        assert!(config.validate(&Environment::Development).is_ok());

        config.base_url = String::new();
        assert!(config.validate(&Environment::Development).is_err());

        config.base_url = "ftp://fhir.example.com".to_string();
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_upstream_fixture_requires_dir() {
        let mut config = UpstreamConfig {
            source_type: SourceType::Fixture,
            base_url: String::new(),
            ..Default::default()
        };
        assert!(config.validate(&Environment::Development).is_err());

        config.fixture_dir = Some("./fixtures".to_string());
        assert!(config.validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_upstream_basic_auth_requires_credentials() {
        let mut config = UpstreamConfig {
            auth_type: AuthType::Basic,
            username: Some("svc".to_string()),
            ..fhir_upstream()
        };
        let err = config.validate(&Environment::Development).unwrap_err();
        assert!(err.contains("password"));

        config.password = Some(secret_string("hunter2".to_string()));
        assert!(config.validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_upstream_bearer_requires_token() {
        let mut config = UpstreamConfig {
            auth_type: AuthType::Bearer,
            ..fhir_upstream()
        };
        assert!(config.validate(&Environment::Development).is_err());

        config.token = Some(secret_string("abc".to_string()));
        assert!(config.validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_tls_verification_in_production() {
        let config = UpstreamConfig {
            tls_verify: false,
            ..fhir_upstream()
        };

        let result = config.validate(&Environment::Production);
        assert!(result
            .unwrap_err()
            .contains("TLS certificate verification cannot be disabled in production"));
        assert!(config.validate(&Environment::Development).is_ok());
        assert!(config.validate(&Environment::Staging).is_ok());
    }

    #[test]
    fn test_fetch_config_validation() {
        let mut config = FetchConfig::default();
        assert!(config.validate().is_ok());

        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
        config.retry.max_attempts = 11;
        assert!(config.validate().is_err());

        config.retry.max_attempts = 3;
        config.parallel_patients = 0;
        assert!(config.validate().is_err());
        config.parallel_patients = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fetch_config_resource_types() {
        let mut config = FetchConfig {
            resource_types: vec!["Coverage".to_string(), "Patient".to_string()],
            ..Default::default()
        };
        assert_eq!(
            config.parsed_resource_types().unwrap(),
            vec![ResourceType::Coverage, ResourceType::Patient]
        );

        config.resource_types = vec!["OperationOutcome".to_string()];
        assert!(config.validate().unwrap_err().contains("cannot be fetched"));

        config.resource_types = vec!["Claim".to_string()];
        assert!(config.validate().is_err());

        config.resource_types = vec![];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(!config.local_enabled);
        assert!(config.validate().is_ok());

        config.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());

        config.local_rotation = "hourly".to_string();
        config.local_enabled = true;
        config.local_path = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_max_attempts(), 3);
        assert_eq!(default_parallel_patients(), 8);
        assert_eq!(
            default_resource_types(),
            vec!["Patient", "ExplanationOfBenefit", "Coverage"]
        );
        assert_eq!(default_output_directory(), "./export");
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: MeridianConfig = toml::from_str(
            r#"
[upstream]
base_url = "https://fhir.example.com"
"#,
        )
        .unwrap();

        assert_eq!(config.upstream.source_type, SourceType::Fhir);
        assert_eq!(config.upstream.auth_type, AuthType::None);
        assert_eq!(config.fetch.retry.max_attempts, 3);
        assert_eq!(config.environment, Environment::Development);
        assert!(config.validate().is_ok());
    }
}
