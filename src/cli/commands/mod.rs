//! CLI command implementations
//!
//! Every command returns the process exit code:
//! 0 success, 1 partial (outcome records written), 2 configuration error,
//! 4 connection error, 5 fatal error.

pub mod fetch;
pub mod init;
pub mod validate;
