//! Adapters for external systems
//!
//! Meridian reads from one upstream FHIR source per run. See [`upstream`].

pub mod upstream;
