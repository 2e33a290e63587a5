//! Offline data source reading bundles from a directory
//!
//! Layout under the fixture root:
//!
//! ```text
//! Patient/identifier-<patient id>.json   identifier lookups
//! Patient/<bene id>.json                 first page of each search
//! ExplanationOfBenefit/<bene id>.json
//! Coverage/<bene id>.json
//! ```
//!
//! A bundle continues onto another file through a `next` link of the form
//! `fixture:<path relative to the root>`. The time window is not applied;
//! fixtures are returned as written.

use super::source::DataSource;
use crate::core::fetch::TimeWindow;
use crate::domain::{
    BeneficiaryId, Bundle, MeridianError, PatientId, ResourceType, Result, UpstreamError,
};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Scheme prefix of `next` links that point at another fixture file
pub const FIXTURE_SCHEME: &str = "fixture:";

/// [`DataSource`] that serves bundles from JSON files
pub struct FixtureDataSource {
    root: PathBuf,
    base_url: String,
}

impl FixtureDataSource {
    /// Creates a source rooted at `root`
    ///
    /// # Errors
    ///
    /// Returns [`MeridianError::Configuration`] if `root` is not a directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(MeridianError::Configuration(format!(
                "Fixture directory not found: {}",
                root.display()
            )));
        }
        let base_url = format!("{FIXTURE_SCHEME}{}", root.display());
        Ok(Self { root, base_url })
    }

    async fn first_page(
        &self,
        resource_type: ResourceType,
        bene_id: &BeneficiaryId,
    ) -> Result<Bundle> {
        let relative = Path::new(resource_type.as_str()).join(format!("{bene_id}.json"));
        self.read_bundle(&relative).await
    }

    async fn read_bundle(&self, relative: &Path) -> Result<Bundle> {
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(UpstreamError::InvalidResponse(format!(
                "Fixture path escapes the fixture root: {}",
                relative.display()
            ))
            .into());
        }

        let path = self.root.join(relative);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(UpstreamError::NotFound(relative.display().to_string()).into())
            }
            Err(e) => {
                return Err(UpstreamError::ConnectionFailed(format!(
                    "Failed to read {}: {e}",
                    path.display()
                ))
                .into())
            }
        };

        let bundle: Bundle = serde_json::from_str(&contents).map_err(|e| {
            UpstreamError::InvalidResponse(format!("{}: {e}", relative.display()))
        })?;
        Ok(bundle.ensure_bundle(&relative.display().to_string())?)
    }
}

#[async_trait]
impl DataSource for FixtureDataSource {
    async fn request_patient_by_identifier(&self, patient_id: &PatientId) -> Result<Bundle> {
        let relative = Path::new("Patient").join(format!("identifier-{patient_id}.json"));
        self.read_bundle(&relative).await
    }

    async fn request_patients(
        &self,
        bene_id: &BeneficiaryId,
        _window: &TimeWindow,
    ) -> Result<Bundle> {
        self.first_page(ResourceType::Patient, bene_id).await
    }

    async fn request_eobs(&self, bene_id: &BeneficiaryId, _window: &TimeWindow) -> Result<Bundle> {
        self.first_page(ResourceType::ExplanationOfBenefit, bene_id)
            .await
    }

    async fn request_coverage(
        &self,
        bene_id: &BeneficiaryId,
        _window: &TimeWindow,
    ) -> Result<Bundle> {
        self.first_page(ResourceType::Coverage, bene_id).await
    }

    async fn request_next_bundle(&self, bundle: &Bundle) -> Result<Bundle> {
        let next = bundle.next_link().ok_or_else(|| {
            UpstreamError::InvalidResponse("Bundle has no next link".to_string())
        })?;
        let relative = next.strip_prefix(FIXTURE_SCHEME).ok_or_else(|| {
            UpstreamError::InvalidResponse(format!("Not a fixture link: {next}"))
        })?;
        self.read_bundle(Path::new(relative)).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
