//! Terminal failure classification
//!
//! After the first-page request has used up its attempts, the failure is
//! either propagated (fatal classes) or replaced by a single
//! [`OperationOutcome`] describing what went wrong.

use crate::domain::{
    IssueSeverity, IssueType, MeridianError, OperationOutcome, PatientId, ResourceType, Result,
    UpstreamError,
};

/// Converts a recoverable failure into an outcome, or hands a fatal one back
///
/// # Errors
///
/// Returns `error` unchanged when [`MeridianError::is_fatal`] holds.
///
/// # Examples
///
/// ```
/// use meridian::core::fetch::translate_failure;
/// use meridian::domain::{MeridianError, PatientId, ResourceType, UpstreamError};
///
/// let patient_id = PatientId::new("MBI123").unwrap();
/// let error = MeridianError::from(UpstreamError::Http { status: 502, message: String::new() });
///
/// let outcome = translate_failure(ResourceType::Coverage, &patient_id, error).unwrap();
/// assert_eq!(
///     outcome.details(),
///     Some("Upstream error fetching Coverage resource. HTTP return code: 502")
/// );
/// ```
pub fn translate_failure(
    resource_type: ResourceType,
    patient_id: &PatientId,
    error: MeridianError,
) -> Result<OperationOutcome> {
    if error.is_fatal() {
        return Err(error);
    }

    let details = describe(resource_type, patient_id, &error);
    tracing::warn!(
        patient_id = %patient_id,
        resource_type = %resource_type,
        error = %error,
        "Fetch failed; reporting OperationOutcome"
    );

    Ok(OperationOutcome::single(
        IssueSeverity::Error,
        IssueType::Exception,
        details,
        vec![
            "Patient".to_string(),
            "id".to_string(),
            patient_id.as_str().to_string(),
        ],
    ))
}

fn describe(resource_type: ResourceType, patient_id: &PatientId, error: &MeridianError) -> String {
    match error.as_upstream() {
        Some(UpstreamError::NotFound(_)) => format!(
            "{resource_type} resource not found in upstream source for id: {patient_id}"
        ),
        Some(UpstreamError::Http { status, .. }) => format!(
            "Upstream error fetching {resource_type} resource. HTTP return code: {status}"
        ),
        _ => format!("Internal error: {}", error.root()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BatchId, JobFailure, JobId};

    fn patient() -> PatientId {
        PatientId::new("MBI123").unwrap()
    }

    #[test]
    fn test_not_found_names_type_and_id() {
        let error = UpstreamError::NotFound("Coverage".into()).into();
        let outcome = translate_failure(ResourceType::Coverage, &patient(), error).unwrap();

        assert_eq!(
            outcome.details(),
            Some("Coverage resource not found in upstream source for id: MBI123")
        );
        assert_eq!(outcome.location(), ["Patient", "id", "MBI123"]);
        assert_eq!(outcome.issue[0].severity, IssueSeverity::Error);
        assert_eq!(outcome.issue[0].code, IssueType::Exception);
    }

    #[test]
    fn test_http_error_names_status() {
        let error = UpstreamError::Http {
            status: 500,
            message: "boom".into(),
        }
        .into();
        let outcome =
            translate_failure(ResourceType::ExplanationOfBenefit, &patient(), error).unwrap();

        assert_eq!(
            outcome.details(),
            Some("Upstream error fetching ExplanationOfBenefit resource. HTTP return code: 500")
        );
    }

    #[test]
    fn test_other_errors_are_internal() {
        let error = UpstreamError::Timeout("60s".into()).into();
        let outcome = translate_failure(ResourceType::Patient, &patient(), error).unwrap();

        assert_eq!(
            outcome.details(),
            Some("Internal error: Upstream error: Request timeout: 60s")
        );
    }

    #[test]
    fn test_context_does_not_hide_status() {
        let error = MeridianError::Context {
            context: "first page".into(),
            source: Box::new(
                UpstreamError::Http {
                    status: 429,
                    message: String::new(),
                }
                .into(),
            ),
        };
        let outcome = translate_failure(ResourceType::Coverage, &patient(), error).unwrap();
        assert!(outcome.details().unwrap().ends_with("HTTP return code: 429"));
    }

    #[test]
    fn test_job_failure_propagates() {
        let error: MeridianError = JobFailure::new(JobId::new(), BatchId::new(), "queue").into();
        let result = translate_failure(ResourceType::Coverage, &patient(), error);
        assert!(matches!(result, Err(MeridianError::JobQueue(_))));
    }
}
