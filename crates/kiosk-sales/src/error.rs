//! # Service Error Type
//!
//! Unified error type for service operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Error Flow in Kiosk POS                             │
//! │                                                                         │
//! │  Service operation                                                      │
//! │  Result<T, ServiceError>                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Business rule broken? ── CoreError::InsufficientStock ──┐              │
//! │         │                                                │              │
//! │         ▼                                                ▼              │
//! │  Storage failed? ──────── DbError::UniqueViolation ── ServiceError      │
//! │         │                                                │              │
//! │         ▼                                                │              │
//! │  Gateway failed? ──────── GatewayError ──────────────────┘              │
//! │                                                                         │
//! │  Callers receive { code: "INSUFFICIENT_STOCK", message: "..." } and     │
//! │  branch on the stable code, not the message text.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use kiosk_core::CoreError;
use kiosk_db::DbError;

use crate::gateway::GatewayError;

/// Error returned from service operations.
///
/// ## Serialization
/// This is what a transport layer forwards when an operation fails:
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Kopi Susu: available 3, requested 5"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Stable error codes for service responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Requested product is absent or deactivated
    ProductNotFound,

    /// Requested quantity exceeds available stock
    InsufficientStock,

    /// Caller-declared total diverges from the computed total
    TotalMismatch,

    /// Transition out of a settled status, or an illegal transition
    InvalidStateTransition,

    /// Role/ownership violation
    AccessDenied,

    /// Name or id collision
    DuplicateIdentifier,

    /// Resource not found (transactions, generic lookups)
    NotFound,

    /// Input validation failed
    ValidationError,

    /// External payment gateway call failed
    GatewayError,

    /// Database operation failed
    DatabaseError,

    /// Internal error
    Internal,
}

impl ServiceError {
    /// Creates a new service error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ServiceError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an access denied error.
    pub fn access_denied() -> Self {
        ServiceError::new(ErrorCode::AccessDenied, "Access denied")
    }
}

/// Converts business rule errors to service errors.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ProductNotFound(_) => ErrorCode::ProductNotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::TotalMismatch { .. } => ErrorCode::TotalMismatch,
            CoreError::TransactionNotFound(_) => ErrorCode::NotFound,
            CoreError::InvalidStateTransition { .. } => ErrorCode::InvalidStateTransition,
            CoreError::AccessDenied => ErrorCode::AccessDenied,
            CoreError::DuplicateIdentifier { .. } => ErrorCode::DuplicateIdentifier,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ServiceError::new(code, err.to_string())
    }
}

/// Converts database errors to service errors.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ServiceError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => ServiceError::new(
                ErrorCode::DuplicateIdentifier,
                format!("Duplicate {field}: '{value}' already exists"),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {message}");
                ServiceError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!("Database error: {other}");
                ServiceError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts gateway errors to service errors.
///
/// Only used on paths where the gateway failure is fatal (session
/// creation); status checks degrade to the local status instead.
impl From<GatewayError> for ServiceError {
    fn from(err: GatewayError) -> Self {
        ServiceError::new(ErrorCode::GatewayError, err.to_string())
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================
