//! Upstream data source trait
//!
//! [`DataSource`] is the boundary between the fetch engine and whatever
//! actually serves FHIR bundles. Implementations issue one request per call
//! and never retry on their own; retrying is the fetch engine's decision.

use crate::core::fetch::TimeWindow;
use crate::domain::{BeneficiaryId, Bundle, PatientId, Result};
use async_trait::async_trait;

/// A paginated FHIR source
///
/// Errors are reported as [`crate::domain::MeridianError::Upstream`] so the
/// caller can tell "not found" and HTTP failures apart from everything else.
///
/// # Example
///
/// ```no_run
/// use meridian::adapters::upstream::{create_data_source, DataSource};
/// use meridian::config::UpstreamConfig;
/// use meridian::domain::PatientId;
///
/// # async fn example() -> meridian::domain::Result<()> {
/// let source = create_data_source(&UpstreamConfig::default())?;
/// let patient_id = PatientId::new("1SQ3F00AA00").unwrap();
/// let matches = source.request_patient_by_identifier(&patient_id).await?;
/// println!("{} match(es) at {}", matches.total.unwrap_or(0), source.base_url());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Searches Patient resources by external identifier
    async fn request_patient_by_identifier(&self, patient_id: &PatientId) -> Result<Bundle>;

    /// First page of the Patient search for a beneficiary
    async fn request_patients(&self, bene_id: &BeneficiaryId, window: &TimeWindow)
        -> Result<Bundle>;

    /// First page of the ExplanationOfBenefit search for a beneficiary
    async fn request_eobs(&self, bene_id: &BeneficiaryId, window: &TimeWindow) -> Result<Bundle>;

    /// First page of the Coverage search for a beneficiary
    async fn request_coverage(&self, bene_id: &BeneficiaryId, window: &TimeWindow)
        -> Result<Bundle>;

    /// Follows the `next` link of `bundle`
    ///
    /// Fails when the bundle has no `next` link or the link cannot be resolved.
    async fn request_next_bundle(&self, bundle: &Bundle) -> Result<Bundle>;

    /// Location of the source, for log lines
    fn base_url(&self) -> &str;
}
