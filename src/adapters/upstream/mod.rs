//! Upstream FHIR data sources
//!
//! - [`FhirDataSource`] talks to a FHIR REST server
//! - [`FixtureDataSource`] replays bundles from a local directory
//!
//! Use [`create_data_source`] to pick one from configuration.

pub mod factory;
pub mod fhir;
pub mod fixture;
pub mod source;

pub use factory::create_data_source;
pub use fhir::FhirDataSource;
pub use fixture::FixtureDataSource;
pub use source::DataSource;
