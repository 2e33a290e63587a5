//! FHIR resource domain model
//!
//! This module defines the resource categories Meridian understands and the
//! [`Resource`] record type carried through the fetch pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// FHIR resource types that can appear in an upstream page
///
/// Only [`ResourceType::FETCHABLE`] types can be requested; the remaining
/// variants exist so that a page carrying them is recognised and rejected as a
/// format error rather than silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Patient,
    ExplanationOfBenefit,
    Coverage,
    OperationOutcome,
}

impl ResourceType {
    /// Resource types that can be requested from the upstream source
    pub const FETCHABLE: [ResourceType; 3] = [
        ResourceType::Patient,
        ResourceType::ExplanationOfBenefit,
        ResourceType::Coverage,
    ];

    /// Exact FHIR name of this resource type
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Patient => "Patient",
            ResourceType::ExplanationOfBenefit => "ExplanationOfBenefit",
            ResourceType::Coverage => "Coverage",
            ResourceType::OperationOutcome => "OperationOutcome",
        }
    }

    /// Whether first-page requests exist for this type
    pub fn is_fetchable(&self) -> bool {
        Self::FETCHABLE.contains(self)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Patient" => Ok(ResourceType::Patient),
            "ExplanationOfBenefit" => Ok(ResourceType::ExplanationOfBenefit),
            "Coverage" => Ok(ResourceType::Coverage),
            "OperationOutcome" => Ok(ResourceType::OperationOutcome),
            other => Err(format!(
                "Unknown resource type '{other}'. Must be one of: Patient, ExplanationOfBenefit, Coverage"
            )),
        }
    }
}

/// A single FHIR resource as returned by the upstream source
///
/// The JSON body is kept verbatim so that records are exported exactly as
/// they were received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(Value);

impl Resource {
    /// Wraps a raw JSON resource
    pub fn new(content: Value) -> Self {
        Self(content)
    }

    /// Raw `resourceType` field, if present
    pub fn resource_type_name(&self) -> Option<&str> {
        self.0.get("resourceType").and_then(Value::as_str)
    }

    /// Parsed resource type, if it is one Meridian knows
    pub fn resource_type(&self) -> Option<ResourceType> {
        self.resource_type_name().and_then(|s| s.parse().ok())
    }

    /// Logical id of the resource, if present
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Borrow the JSON body
    pub fn content(&self) -> &Value {
        &self.0
    }

    /// Consume and return the JSON body
    pub fn into_content(self) -> Value {
        self.0
    }
}

impl From<Value> for Resource {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("Patient", ResourceType::Patient)]
    #[test_case("ExplanationOfBenefit", ResourceType::ExplanationOfBenefit)]
    #[test_case("Coverage", ResourceType::Coverage)]
    #[test_case("OperationOutcome", ResourceType::OperationOutcome)]
    fn test_resource_type_parse(name: &str, expected: ResourceType) {
        let parsed: ResourceType = name.parse().unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.to_string(), name);
    }

    #[test_case("patient")]
    #[test_case("EOB")]
    #[test_case("")]
    fn test_resource_type_parse_rejects(name: &str) {
        assert!(name.parse::<ResourceType>().is_err());
    }

    #[test]
    fn test_fetchable() {
        assert!(ResourceType::Patient.is_fetchable());
        assert!(ResourceType::Coverage.is_fetchable());
        assert!(!ResourceType::OperationOutcome.is_fetchable());
    }

    #[test]
    fn test_resource_accessors() {
        let resource = Resource::new(json!({
            "resourceType": "Coverage",
            "id": "part-a-1",
            "status": "active"
        }));

        assert_eq!(resource.resource_type(), Some(ResourceType::Coverage));
        assert_eq!(resource.id(), Some("part-a-1"));
        assert_eq!(resource.content()["status"], "active");
    }

    #[test]
    fn test_resource_unknown_type() {
        let resource = Resource::new(json!({"resourceType": "Claim"}));
        assert_eq!(resource.resource_type_name(), Some("Claim"));
        assert_eq!(resource.resource_type(), None);
    }

    #[test]
    fn test_resource_serializes_transparently() {
        let body = json!({"resourceType": "Patient", "id": "p1"});
        let resource = Resource::new(body.clone());
        assert_eq!(serde_json::to_value(&resource).unwrap(), body);
    }
}
