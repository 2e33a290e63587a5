//! Result type alias for Meridian

use super::errors::MeridianError;

/// Result type used by every fallible Meridian operation
///
/// # Examples
///
/// ```
/// use meridian::domain::result::Result;
/// use meridian::domain::errors::MeridianError;
///
/// fn parse_count(raw: &str) -> Result<u64> {
///     raw.parse()
///         .map_err(|_| MeridianError::Validation(format!("not a count: {raw}")))
/// }
///
/// assert_eq!(parse_count("3").unwrap(), 3);
/// assert!(parse_count("three").is_err());
/// ```
pub type Result<T> = std::result::Result<T, MeridianError>;
