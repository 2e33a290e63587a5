//! Domain identifier types with validation
//!
//! Newtype wrappers keep the external patient identifier, the upstream
//! correlating identifier, and the job/batch identifiers from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Export job identifier
///
/// Opaque to the fetch engine; only used to attribute log lines and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    /// Creates a new random job ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for JobId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid job ID '{s}': {e}"))
    }
}

/// Batch identifier within an export job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(Uuid);

impl BatchId {
    /// Creates a new random batch ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for BatchId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BatchId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid batch ID '{s}': {e}"))
    }
}

/// External patient identifier (e.g. an MBI)
///
/// This is the identifier a caller hands to the fetch engine. It is resolved
/// to a [`BeneficiaryId`] before any resource can be requested.
///
/// # Examples
///
/// ```
/// use meridian::domain::ids::PatientId;
/// use std::str::FromStr;
///
/// let patient_id = PatientId::from_str("1SQ3F00AA00").unwrap();
/// assert_eq!(patient_id.as_str(), "1SQ3F00AA00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new PatientId from a string
    ///
    /// Surrounding whitespace is trimmed. Returns `Err` if nothing is left.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Patient identifier cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the patient ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Correlating identifier used to address the upstream source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeneficiaryId(String);

impl BeneficiaryId {
    /// Creates a new BeneficiaryId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Beneficiary ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the beneficiary ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BeneficiaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BeneficiaryId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for BeneficiaryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_id_valid() {
        let id = PatientId::new("1SQ3F00AA00").unwrap();
        assert_eq!(id.as_str(), "1SQ3F00AA00");
        assert_eq!(id.to_string(), "1SQ3F00AA00");
    }

    #[test]
    fn test_patient_id_trims() {
        let id = PatientId::new("  MBI123 \n").unwrap();
        assert_eq!(id.as_str(), "MBI123");
    }

    #[test]
    fn test_patient_id_empty() {
        assert!(PatientId::new("").is_err());
        assert!(PatientId::new("   ").is_err());
    }

    #[test]
    fn test_beneficiary_id_empty() {
        assert!(BeneficiaryId::new("").is_err());
        assert_eq!(
            BeneficiaryId::new("-19990000000001").unwrap().as_str(),
            "-19990000000001"
        );
    }

    #[test]
    fn test_job_id_roundtrip() {
        let id = JobId::new();
        let parsed = JobId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_batch_id_invalid() {
        assert!(BatchId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn test_job_ids_are_unique() {
        assert_ne!(JobId::new(), JobId::new());
        assert_ne!(BatchId::new(), BatchId::new());
    }

    #[test]
    fn test_patient_id_serialization() {
        let id = PatientId::new("MBI123").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"MBI123\"");
        let back: PatientId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
