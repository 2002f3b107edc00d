//! # Gateway Status Mapping
//!
//! Deterministic translation of an external payment gateway's status pair
//! `(transaction_status, fraud_status)` into a local settlement action.
//!
//! ## Mapping Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  gateway status        fraud signal        local action                 │
//! │  ──────────────        ────────────        ────────────                 │
//! │  capture               accept              mark paid                    │
//! │  capture               challenge/other     no change                    │
//! │  settlement            any                 mark paid                    │
//! │  deny                  any                 mark cancelled               │
//! │  cancel                any                 mark cancelled               │
//! │  expire                any                 mark cancelled               │
//! │  pending               any                 no change                    │
//! │  (anything else)       any                 no change                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The function is pure so that webhook ingestion and the synchronous
//! status-check path apply the exact same policy. Idempotence is a
//! property of the caller: applying the resulting action twice must land
//! in the same end state, which holds because `MarkPaid`/`MarkCancelled`
//! only apply to a pending transaction and `NoChange` applies to nothing.

use serde::{Deserialize, Serialize};

use crate::types::TransactionStatus;

/// What a gateway status pair means for the local transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementAction {
    /// Payment confirmed: drive `pending → paid`.
    MarkPaid,
    /// Payment denied/voided/expired: drive `pending → cancelled`.
    MarkCancelled,
    /// Nothing to apply (still pending, challenged, or unrecognized).
    NoChange,
}

impl SettlementAction {
    /// The target status this action drives toward, if any.
    pub const fn target(&self) -> Option<TransactionStatus> {
        match self {
            SettlementAction::MarkPaid => Some(TransactionStatus::Paid),
            SettlementAction::MarkCancelled => Some(TransactionStatus::Cancelled),
            SettlementAction::NoChange => None,
        }
    }
}

/// Maps a gateway notification's status pair to a settlement action.
///
/// Unrecognized statuses map to `NoChange`: the gateway will retry or the
/// poll path will pick the final state up later, and an unknown value must
/// never settle money.
pub fn map_gateway_status(
    transaction_status: &str,
    fraud_status: Option<&str>,
) -> SettlementAction {
    match transaction_status {
        "capture" => match fraud_status {
            Some("accept") => SettlementAction::MarkPaid,
            _ => SettlementAction::NoChange,
        },
        "settlement" => SettlementAction::MarkPaid,
        "deny" | "cancel" | "expire" => SettlementAction::MarkCancelled,
        _ => SettlementAction::NoChange,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
