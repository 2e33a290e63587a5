//! Domain models and types for Meridian.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`], [`BeneficiaryId`], [`JobId`], [`BatchId`])
//! - **FHIR models** ([`Resource`], [`ResourceType`], [`Bundle`], [`OperationOutcome`])
//! - **Error types** ([`MeridianError`], [`UpstreamError`], [`JobFailure`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! The external identifier a caller supplies and the correlating identifier
//! the upstream source expects are distinct types:
//!
//! ```rust
//! use meridian::domain::{BeneficiaryId, PatientId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let patient_id = PatientId::new("1SQ3F00AA00")?;
//! let bene_id = BeneficiaryId::new("-19990000000001")?;
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: PatientId = bene_id;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Classes
//!
//! Every [`MeridianError`] is either fatal (always propagated) or recoverable
//! (eligible to become an [`OperationOutcome`]):
//!
//! ```rust
//! use meridian::domain::{MeridianError, UpstreamError};
//!
//! let upstream: MeridianError = UpstreamError::Timeout("30s".into()).into();
//! assert!(!upstream.is_fatal());
//!
//! let format = MeridianError::Format("unexpected Coverage".into());
//! assert!(format.is_fatal());
//! ```

pub mod bundle;
pub mod context;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod resource;
pub mod result;

// Re-export commonly used types for convenience
pub use bundle::{Bundle, BundleEntry, BundleLink, BundleMeta};
pub use errors::{JobFailure, MeridianError, UpstreamError};
pub use ids::{BatchId, BeneficiaryId, JobId, PatientId};
pub use outcome::{IssueSeverity, IssueType, OperationOutcome};
pub use resource::{Resource, ResourceType};
pub use result::Result;
