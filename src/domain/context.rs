//! Error context extension trait
//!
//! This module provides a context extension trait similar to `anyhow::Context`
//! that works with `Result<T, MeridianError>`. Unlike a string-wrapping
//! context, the original error is kept as the source so its class (fatal or
//! recoverable) survives.
//!
//! # Examples
//!
//! ```rust
//! use meridian::domain::{MeridianError, Result};
//! use meridian::domain::context::ResultExt;
//!
//! fn read_fixture(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .context(format!("Failed to read fixture: {}", path))
//! }
//! ```

use crate::domain::errors::MeridianError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// The context is evaluated eagerly, so use `.with_context()` if the
    /// context string is expensive to compute.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation)
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<MeridianError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| MeridianError::Context {
            context: context.to_string(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| MeridianError::Context {
            context: f().to_string(),
            source: Box::new(e.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::UpstreamError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_context_with_meridian_error() {
        let result: Result<()> = Err(MeridianError::Configuration("Invalid config".to_string()));
        let with_context = result.context("Failed to load configuration");

        let err_msg = with_context.unwrap_err().to_string();
        assert!(err_msg.contains("Failed to load configuration"));
        assert!(err_msg.contains("Invalid config"));
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();

        let result: Result<i32> = Ok(42);
        let with_context = result.with_context(|| {
            called_clone.store(true, Ordering::SeqCst);
            "Expensive context"
        });

        assert!(with_context.is_ok());
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_context_with_upstream_error() {
        let result: std::result::Result<(), UpstreamError> =
            Err(UpstreamError::ConnectionFailed("Network timeout".to_string()));
        let err = result
            .context("Failed to fetch next bundle")
            .unwrap_err();

        assert!(err.to_string().contains("Failed to fetch next bundle"));
        assert!(err.to_string().contains("Network timeout"));
        assert!(err.as_upstream().is_some());
    }

    #[test]
    fn test_context_chaining_keeps_fatal_class() {
        let result: Result<()> = Err(MeridianError::Format("unexpected Coverage".into()));
        let err = result
            .context("Failed to read page 2")
            .context("Failed to fetch ExplanationOfBenefit")
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("Failed to fetch ExplanationOfBenefit"));
        assert!(msg.contains("Failed to read page 2"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_io_error_with_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let result: std::result::Result<(), std::io::Error> = Err(io_error);
        let err = result.context("Failed to read 'meridian.toml'").unwrap_err();

        assert!(err.to_string().contains("Failed to read"));
        assert!(matches!(err.root(), MeridianError::Io(_)));
    }
}
