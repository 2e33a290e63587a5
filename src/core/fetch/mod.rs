//! Resilient paginated fetch engine
//!
//! Given one external patient identifier and one resource type, produces the
//! complete, time-consistent set of records for that patient:
//!
//! - [`resolve_beneficiary_id`] maps the identifier onto the upstream id
//! - [`TimeWindow`] bounds every search by `_lastUpdated`
//! - [`RetryPolicy`] wraps the first-page request only
//! - the page walker follows `next` links, checking freshness and category
//! - [`translate_failure`] turns recoverable failures into an outcome record
//! - [`ResourceFetcher`] composes them
//!
//! Fan-out across patients is left to the caller (see [`crate::core::job`]).

pub mod context;
pub mod fetcher;
pub mod identity;
pub mod outcome;
pub mod pager;
pub mod retry;
pub mod window;

pub use context::FetchContext;
pub use fetcher::{FetchResult, FetchedItem, ResourceFetcher};
pub use identity::{resolve_beneficiary_id, BENE_ID_SYSTEM};
pub use outcome::translate_failure;
pub use pager::{check_category, check_freshness};
pub use retry::RetryPolicy;
pub use window::TimeWindow;
