//! External identifier to beneficiary id resolution

use super::context::FetchContext;
use crate::adapters::upstream::DataSource;
use crate::domain::{BeneficiaryId, JobFailure, MeridianError, PatientId, Resource, Result};

/// Identifier system carrying the beneficiary id on Patient resources
pub const BENE_ID_SYSTEM: &str = "https://bluebutton.cms.gov/resources/variables/bene_id";

/// Looks up the single Patient matching `patient_id` and returns its
/// beneficiary id
///
/// Not retried. Every failure here is fatal for the fetch:
/// - lookup failed: [`MeridianError::JobQueue`] ("Failed to retrieve Patient"),
///   carrying the upstream error as its cause
/// - zero or several matches: [`MeridianError::DataConsistency`]
/// - no beneficiary identifier: [`MeridianError::JobQueue`]
pub async fn resolve_beneficiary_id(
    source: &dyn DataSource,
    context: &FetchContext,
    patient_id: &PatientId,
) -> Result<BeneficiaryId> {
    let bundle = source
        .request_patient_by_identifier(patient_id)
        .await
        .map_err(|e| {
            tracing::warn!(
                job_id = %context.job_id(),
                batch_id = %context.batch_id(),
                error = %e,
                "Patient lookup failed"
            );
            let failure = JobFailure::new(
                context.job_id(),
                context.batch_id(),
                format!("Failed to retrieve Patient: {e}"),
            );
            match e.as_upstream() {
                Some(cause) => failure.caused_by(cause.clone()).into(),
                None => MeridianError::from(failure),
            }
        })?;

    let patients: Vec<&Resource> = bundle.resources().collect();
    let found = bundle.total.unwrap_or(patients.len() as u64);
    if found != 1 {
        return Err(MeridianError::DataConsistency {
            job_id: context.job_id(),
            batch_id: context.batch_id(),
            expected: 1,
            found,
        });
    }

    patients
        .first()
        .and_then(|patient| beneficiary_identifier(patient))
        .ok_or_else(|| job_failure(context, "No bene_id found in Patient resource"))
}

/// Value of the identifier whose system is [`BENE_ID_SYSTEM`]
fn beneficiary_identifier(patient: &Resource) -> Option<BeneficiaryId> {
    patient
        .content()
        .get("identifier")?
        .as_array()?
        .iter()
        .find(|identifier| {
            identifier.get("system").and_then(|s| s.as_str()) == Some(BENE_ID_SYSTEM)
        })
        .and_then(|identifier| identifier.get("value")?.as_str())
        .and_then(|value| BeneficiaryId::new(value).ok())
}

fn job_failure(context: &FetchContext, message: impl Into<String>) -> MeridianError {
    JobFailure::new(context.job_id(), context.batch_id(), message).into()
}
