//! # Payment Gateway Seam
//!
//! The external payment gateway is an asynchronous collaborator: Kiosk POS
//! creates a payment session for a pending transaction, and the gateway
//! later reports the outcome either by webhook notification or when polled.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Gateway Integration                               │
//! │                                                                         │
//! │  PaymentService ──► PaymentGateway (trait, this module)                 │
//! │                        │                                                │
//! │            ┌───────────┴───────────┐                                    │
//! │            ▼                       ▼                                    │
//! │      HttpGateway              MockGateway                               │
//! │      (gateway/http.rs)        (gateway/mock.rs)                         │
//! │      reqwest + server key     scripted statuses for tests              │
//! │                                                                         │
//! │  The order id sent to the gateway IS the local transaction id, so       │
//! │  notifications resolve back to a transaction without a mapping table.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod http;
pub mod mock;

pub use http::HttpGateway;
pub use mock::MockGateway;

// =============================================================================
// Errors
// =============================================================================

/// Errors from the external payment gateway.
///
/// These are non-fatal on the status-check path (reconciliation falls back
/// to the last known local status) and fatal on session creation.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network-level failure (DNS, connect, timeout).
    #[error("Gateway request failed: {0}")]
    RequestFailed(String),

    /// Gateway answered with a non-success status.
    #[error("Gateway returned {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Gateway response body was not in the expected shape.
    #[error("Gateway response could not be parsed: {0}")]
    ResponseParseFailed(String),

    /// Gateway has no record of this order id.
    #[error("Order not found on gateway: {0}")]
    OrderNotFound(String),
}

// =============================================================================
// Wire Types
// =============================================================================

/// One line item forwarded to the gateway's session endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionItem {
    pub id: i64,
    /// Unit price in cents.
    pub price: i64,
    pub quantity: i64,
    pub name: String,
}

/// Customer details forwarded to the gateway (all optional upstream; the
/// service fills fallbacks from the transaction metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Outbound create-payment-session request.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRequest {
    /// Same as the local transaction id, by construction.
    pub order_id: String,
    /// Gross amount in cents.
    pub gross_amount: i64,
    pub items: Vec<SessionItem>,
    pub customer: Option<CustomerDetails>,
}

/// Opaque session handle returned by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Token stored on the transaction for later status polling.
    pub token: String,
    /// Hosted payment page, when the gateway provides one.
    pub redirect_url: Option<String>,
}

/// An asynchronous status notification (webhook payload or poll response).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayNotification {
    pub order_id: String,
    /// Gateway-side transaction status (capture, settlement, deny, ...).
    pub transaction_status: String,
    /// Fraud screening signal (accept, challenge), when present.
    pub fraud_status: Option<String>,
}

// =============================================================================
// Trait
// =============================================================================

/// The seam between the reconciliation adapter and the actual gateway.
///
/// Implementations must be cheap to clone behind an `Arc` and safe to call
/// concurrently.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a payment session for a pending transaction.
    async fn create_session(&self, request: &SessionRequest)
        -> Result<PaymentSession, GatewayError>;

    /// Polls the authoritative status for an order.
    async fn fetch_status(&self, order_id: &str) -> Result<GatewayNotification, GatewayError>;

    /// Requests cancellation of an order on the gateway side.
    async fn cancel(&self, order_id: &str) -> Result<(), GatewayError>;
}
