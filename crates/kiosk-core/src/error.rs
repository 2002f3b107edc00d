//! # Error Types
//!
//! Domain-specific error types for kiosk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Error Types                                    │
//! │                                                                         │
//! │  kiosk-core errors (this file)                                          │
//! │  ├── CoreError        - Business-rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  kiosk-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  kiosk-sales errors (service layer)                                     │
//! │  └── ServiceError     - What callers see (stable code + message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, quantities, ids)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a stable caller-facing code

use thiserror::Error;

use crate::types::TransactionStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are recovered at
/// the service boundary and translated to structured failures; none of them
/// ever aborts the process.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found, or exists but is deactivated.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Requested quantity exceeds available stock.
    ///
    /// Also raised when a concurrent reservation wins the race for the last
    /// units between the availability read and the stock decrement.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Caller-declared total diverges from the computed total by more than
    /// the tolerance. Guards against a stale client-side cart.
    #[error("Total amount mismatch: expected {computed_cents}, received {declared_cents}")]
    TotalMismatch {
        computed_cents: i64,
        declared_cents: i64,
    },

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Attempted transition out of a settled status, or a transition the
    /// state machine does not allow.
    #[error("Transaction {transaction_id} is {current}, cannot change status")]
    InvalidStateTransition {
        transaction_id: String,
        current: TransactionStatus,
    },

    /// Role/ownership violation: a restricted principal acting on a record
    /// it does not own, or a non-admin managing the catalog.
    #[error("Access denied")]
    AccessDenied,

    /// Identifier collision (duplicate active product name, or a transaction
    /// id uniqueness violation on insert — fatal, never retried).
    #[error("Duplicate {field}: '{value}' already exists")]
    DuplicateIdentifier { field: String, value: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a DuplicateIdentifier error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        CoreError::DuplicateIdentifier {
            field: field.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request payload doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Collection has too many entries.
    #[error("{field} cannot have more than {max} entries")]
    TooManyEntries { field: String, max: usize },
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
        let err = CoreError::InsufficientStock {
            name: "Kopi Susu".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Kopi Susu: available 3, requested 5"
        );

        let err = CoreError::TotalMismatch {
            computed_cents: 3000,
            declared_cents: 2999,
        };
        assert_eq!(
            err.to_string(),
            "Total amount mismatch: expected 3000, received 2999"
        );
    }

    #[test]
    fn test_state_transition_message() {
        let err = CoreError::InvalidStateTransition {
            transaction_id: "TRX17".to_string(),
            current: TransactionStatus::Paid,
        };
        assert_eq!(err.to_string(), "Transaction TRX17 is paid, cannot change status");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
