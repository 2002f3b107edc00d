//! # Transaction State Machine
//!
//! Legal status transitions for a sale.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Transaction Lifecycle                              │
//! │                                                                         │
//! │                 ┌──────────┐                                            │
//! │    create() ──► │ pending  │                                            │
//! │                 └────┬─────┘                                            │
//! │            settle    │    cancel (restores stock)                       │
//! │          ┌───────────┴───────────┐                                      │
//! │          ▼                       ▼                                      │
//! │     ┌─────────┐            ┌───────────┐                                │
//! │     │  paid   │            │ cancelled │                                │
//! │     └─────────┘            └───────────┘                                │
//! │      terminal                terminal                                   │
//! │                                                                         │
//! │  Any transition out of a terminal status fails with                     │
//! │  InvalidStateTransition and leaves all state unchanged.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::TransactionStatus;

/// Checks whether `current → target` is a legal transition.
#[inline]
pub fn can_transition(current: TransactionStatus, target: TransactionStatus) -> bool {
    matches!(
        (current, target),
        (TransactionStatus::Pending, TransactionStatus::Paid)
            | (TransactionStatus::Pending, TransactionStatus::Cancelled)
    )
}

/// Validates a transition, producing the taxonomy error on violation.
///
/// The transaction id is carried into the error for caller-facing context.
pub fn ensure_transition(
    transaction_id: &str,
    current: TransactionStatus,
    target: TransactionStatus,
) -> CoreResult<()> {
    if can_transition(current, target) {
        Ok(())
    } else {
        Err(CoreError::InvalidStateTransition {
            transaction_id: transaction_id.to_string(),
            current,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
