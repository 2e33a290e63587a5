//! FHIR OperationOutcome representation
//!
//! An [`OperationOutcome`] stands in for the records of a fetch that failed
//! for reasons attributable to the upstream source. It is written to the
//! export alongside regular resources so operators can triage failures.

use serde::{Deserialize, Serialize};

/// FHIR issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

/// FHIR issue type code (subset used by Meridian)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    Exception,
    NotFound,
    Processing,
}

/// Human-readable issue details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDetails {
    pub text: String,
}

/// A single issue within an outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeIssue {
    pub severity: IssueSeverity,
    pub code: IssueType,
    pub details: IssueDetails,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub location: Vec<String>,
}

/// Minimal FHIR OperationOutcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    /// Always `"OperationOutcome"`
    pub resource_type: String,
    pub issue: Vec<OutcomeIssue>,
}

impl OperationOutcome {
    /// Outcome with a single issue
    pub fn single(
        severity: IssueSeverity,
        code: IssueType,
        details: impl Into<String>,
        location: Vec<String>,
    ) -> Self {
        Self {
            resource_type: "OperationOutcome".to_string(),
            issue: vec![OutcomeIssue {
                severity,
                code,
                details: IssueDetails {
                    text: details.into(),
                },
                location,
            }],
        }
    }

    /// Details text of the first issue
    pub fn details(&self) -> Option<&str> {
        self.issue.first().map(|i| i.details.text.as_str())
    }

    /// Location of the first issue
    pub fn location(&self) -> &[String] {
        self.issue
            .first()
            .map(|i| i.location.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_as_fhir() {
        let outcome = OperationOutcome::single(
            IssueSeverity::Error,
            IssueType::Exception,
            "Coverage resource not found",
            vec!["Patient".into(), "id".into(), "MBI123".into()],
        );

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "resourceType": "OperationOutcome",
                "issue": [{
                    "severity": "error",
                    "code": "exception",
                    "details": {"text": "Coverage resource not found"},
                    "location": ["Patient", "id", "MBI123"]
                }]
            })
        );
    }

    #[test]
    fn test_accessors() {
        let outcome = OperationOutcome::single(
            IssueSeverity::Warning,
            IssueType::NotFound,
            "nothing here",
            vec![],
        );
        assert_eq!(outcome.details(), Some("nothing here"));
        assert!(outcome.location().is_empty());
    }

    #[test]
    fn test_issue_type_codes() {
        assert_eq!(
            serde_json::to_value(IssueType::NotFound).unwrap(),
            json!("not-found")
        );
        assert_eq!(
            serde_json::to_value(IssueSeverity::Fatal).unwrap(),
            json!("fatal")
        );
    }
}
