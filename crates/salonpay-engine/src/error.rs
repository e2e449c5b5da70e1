//! # Engine Error Types
//!
//! ## Error Flow
//! ```text
//! CoreError (bad amount, unknown regime) ──┐
//!                                          ├──► EngineError ──► caller
//! store failure (DbError, ...) ─── boxed ──┘
//! ```
//!
//! Store errors are boxed, not converted: the caller can still
//! `downcast_ref` to the concrete type. Nothing here is retried.

use salonpay_core::CoreError;
use thiserror::Error;

/// Errors surfaced by [`SplitEngine`](crate::SplitEngine).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Domain rule failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A collaborator store failed.
    #[error("Repository failure: {0}")]
    Repository(Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    /// Wraps a store failure.
    pub fn repository(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        EngineError::Repository(err.into())
    }

    /// Returns the domain error, if this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            EngineError::Core(err) => Some(err),
            EngineError::Repository(_) => None,
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_repository_error_keeps_source() {
        let err = EngineError::repository(io::Error::new(io::ErrorKind::Other, "disk gone"));
        assert_eq!(err.to_string(), "Repository failure: disk gone");

        let EngineError::Repository(source) = err else {
            panic!("expected repository error");
        };
        assert!(source.downcast_ref::<io::Error>().is_some());
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: EngineError = CoreError::UnsupportedTaxRegime("X".to_string()).into();
        assert_eq!(err.to_string(), "Unsupported tax regime: X");
        assert!(err.as_core().is_some());
    }
}
