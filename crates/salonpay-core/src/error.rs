//! # Error Types
//!
//! Domain-specific error types for salonpay-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  salonpay-core errors (this file)                                      │
//! │  ├── CoreError        - Split / rule / regime failures                 │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  salonpay-engine errors                                                │
//! │  └── EngineError      - CoreError or a boxed repository failure        │
//! │                                                                         │
//! │  salonpay-db errors                                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, value, regime)
//! 3. Errors are enum variants, never String
//! 4. None of these are retried: they describe bad input or bad config

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A monetary input is outside its allowed range.
    ///
    /// ## When This Occurs
    /// - `gross_amount_cents` is zero or negative
    /// - `product_cost_cents` is negative
    ///
    /// Raised before any repository lookup.
    #[error("Invalid amount for {field}: {value}")]
    InvalidAmount { field: String, value: i64 },

    /// The configured tax regime is not one of the known variants.
    ///
    /// ## When This Occurs
    /// - The settings row holds a regime string this build does not know
    ///   (e.g. a row written by a newer release)
    #[error("Unsupported tax regime: {0}")]
    UnsupportedTaxRegime(String),

    /// A commission rule does not have the ids its type requires.
    #[error("Invalid commission rule: {reason}")]
    InvalidCommissionRule { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidAmount error.
    pub fn invalid_amount(field: impl Into<String>, value: i64) -> Self {
        CoreError::InvalidAmount {
            field: field.into(),
            value,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A fraction is outside `[0, 1]` or not finite.
    #[error("{field} must be a fraction between 0 and 1, got {value}")]
    RateOutOfRange { field: String, value: f64 },

    /// Value must be zero or positive.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::invalid_amount("gross_amount_cents", 0);
        assert_eq!(err.to_string(), "Invalid amount for gross_amount_cents: 0");

        let err = CoreError::UnsupportedTaxRegime("LUCRO_ARBITRADO".to_string());
        assert_eq!(err.to_string(), "Unsupported tax regime: LUCRO_ARBITRADO");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::RateOutOfRange {
            field: "tax_rate".to_string(),
            value: 1.5,
        };
        assert_eq!(
            err.to_string(),
            "tax_rate must be a fraction between 0 and 1, got 1.5"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "service_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
