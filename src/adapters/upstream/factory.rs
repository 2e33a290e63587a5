//! Data source factory

use super::fhir::FhirDataSource;
use super::fixture::FixtureDataSource;
use super::source::DataSource;
use crate::config::{SourceType, UpstreamConfig};
use crate::domain::{MeridianError, Result};
use std::sync::Arc;

/// Creates the data source selected by `upstream.source_type`
///
/// # Errors
///
/// Returns [`MeridianError::Configuration`] if the selected source cannot be
/// initialized from the given settings.
pub fn create_data_source(config: &UpstreamConfig) -> Result<Arc<dyn DataSource>> {
    let source: Arc<dyn DataSource> = match config.source_type {
        SourceType::Fhir => Arc::new(FhirDataSource::new(config)?),
        SourceType::Fixture => {
            let dir = config.fixture_dir.as_deref().ok_or_else(|| {
                MeridianError::Configuration(
                    "upstream.fixture_dir is required when source_type is 'fixture'".to_string(),
                )
            })?;
            Arc::new(FixtureDataSource::new(dir)?)
        }
    };

    tracing::info!(
        source_type = ?config.source_type,
        base_url = source.base_url(),
        "Upstream data source ready"
    );

    Ok(source)
}
