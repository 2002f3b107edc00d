//! # Payment Service
//!
//! Gateway session management and payment reconciliation.
//!
//! ## Reconciliation Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Ways Status Comes Home                           │
//! │                                                                         │
//! │  1. ASYNC WEBHOOK (handle_notification)                                 │
//! │     gateway ──► {order_id, transaction_status, fraud_status}            │
//! │        map_gateway_status() → settle_with_stock_restore()               │
//! │        replays / late arrivals → logged no-op, never an error           │
//! │                                                                         │
//! │  2. SYNC POLL (check_status)                                            │
//! │     caller asks; we poll the gateway, apply the SAME mapping,           │
//! │     persist a changed status before answering.                          │
//! │     Gateway down → answer with the last known local status.             │
//! │     A settled local status is never regressed to pending.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use kiosk_core::reconcile::map_gateway_status;
use kiosk_core::{CoreError, PaymentMethod, Principal, Transaction, TransactionStatus};
use kiosk_db::Database;

use crate::error::{ServiceError, ServiceResult};
use crate::gateway::{
    CustomerDetails, GatewayNotification, PaymentGateway, SessionItem, SessionRequest,
};
use crate::services::sales_service::{settle_with_stock_restore, TransitionOutcome};

// =============================================================================
// Response Types
// =============================================================================

/// Result of creating a gateway payment session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSessionView {
    pub transaction_id: String,
    pub token: String,
    pub redirect_url: Option<String>,
}

/// Outcome of ingesting one gateway notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A transition was applied.
    Applied(TransactionStatus),
    /// Nothing to do: replay, unknown order, challenged or still pending.
    NoOp,
}

/// Answer of the synchronous status-check path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub transaction_id: String,
    /// Local status after reconciliation (or the last known one when the
    /// gateway was unreachable).
    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
    /// Raw gateway answer, when the gateway was reachable.
    pub gateway_status: Option<GatewayNotification>,
}

// =============================================================================
// Service
// =============================================================================

/// Payment sessions and reconciliation against the external gateway.
#[derive(Clone)]
pub struct PaymentService {
    db: Database,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    /// Creates a new PaymentService.
    pub fn new(db: Database, gateway: Arc<dyn PaymentGateway>) -> Self {
        PaymentService { db, gateway }
    }

    /// Creates a gateway payment session for a pending transaction and
    /// stores the returned token for later polling.
    ///
    /// The order id sent out IS the transaction id, so notifications and
    /// polls resolve back without a mapping table.
    pub async fn create_session(
        &self,
        principal: &Principal,
        transaction_id: &str,
        customer: Option<CustomerDetails>,
    ) -> ServiceResult<PaymentSessionView> {
        debug!(transaction_id, "create_session");

        let transaction = self.load_owned(principal, transaction_id).await?;

        if transaction.status != TransactionStatus::Pending {
            return Err(CoreError::InvalidStateTransition {
                transaction_id: transaction_id.to_string(),
                current: transaction.status,
            }
            .into());
        }

        let lines = self.db.transactions().get_lines(transaction_id).await?;

        let request = SessionRequest {
            order_id: transaction.id.clone(),
            gross_amount: transaction.total_cents,
            items: lines
                .iter()
                .map(|line| SessionItem {
                    id: line.product_id,
                    price: line.unit_price_cents,
                    quantity: line.quantity,
                    name: line.product_name.clone(),
                })
                .collect(),
            customer: Some(customer.unwrap_or_else(|| CustomerDetails {
                first_name: transaction
                    .customer_name
                    .clone()
                    .unwrap_or_else(|| "Customer".to_string()),
                email: None,
                phone: transaction.customer_phone.clone(),
            })),
        };

        // Session creation is the one path where a gateway failure is
        // fatal: without a token there is nothing to reconcile later.
        let session = self.gateway.create_session(&request).await?;

        self.db
            .transactions()
            .set_payment_token(transaction_id, &session.token)
            .await?;

        info!(transaction_id, "Payment session created");

        Ok(PaymentSessionView {
            transaction_id: transaction_id.to_string(),
            token: session.token,
            redirect_url: session.redirect_url,
        })
    }

    /// Ingests an asynchronous gateway notification. Idempotent: replays
    /// and notifications for already-settled transactions are logged
    /// no-ops, never errors — the transport layer always acks the gateway.
    pub async fn handle_notification(
        &self,
        notification: &GatewayNotification,
    ) -> ServiceResult<ReconcileOutcome> {
        let action = map_gateway_status(
            &notification.transaction_status,
            notification.fraud_status.as_deref(),
        );

        info!(
            order_id = %notification.order_id,
            gateway_status = %notification.transaction_status,
            fraud_status = ?notification.fraud_status,
            action = ?action,
            "Payment notification received"
        );

        let Some(target) = action.target() else {
            return Ok(ReconcileOutcome::NoOp);
        };

        match settle_with_stock_restore(&self.db, &notification.order_id, target).await? {
            TransitionOutcome::Applied(updated) => {
                info!(order_id = %notification.order_id, status = %updated.status, "Notification applied");
                Ok(ReconcileOutcome::Applied(updated.status))
            }
            TransitionOutcome::NotApplicable(current) => {
                // Gateways retry notifications; a late or duplicate one
                // landing on a settled transaction is expected traffic.
                info!(
                    order_id = %notification.order_id,
                    current = %current.status,
                    "Notification is a no-op"
                );
                Ok(ReconcileOutcome::NoOp)
            }
            TransitionOutcome::NotFound => {
                warn!(order_id = %notification.order_id, "Notification for unknown order");
                Ok(ReconcileOutcome::NoOp)
            }
        }
    }

    /// Synchronous reconcile-on-read: polls the gateway, persists a
    /// changed status (same mapping as the webhook), and answers with the
    /// result.
    ///
    /// A gateway failure is non-fatal: the last known local status is
    /// returned and the degradation is logged.
    pub async fn check_status(
        &self,
        principal: &Principal,
        transaction_id: &str,
    ) -> ServiceResult<StatusView> {
        let transaction = self.load_owned(principal, transaction_id).await?;

        // Nothing to poll for cash sales or before a session exists.
        if transaction.payment_method != PaymentMethod::Gateway
            || transaction.payment_token.is_none()
        {
            return Ok(StatusView {
                transaction_id: transaction_id.to_string(),
                status: transaction.status,
                payment_method: transaction.payment_method,
                gateway_status: None,
            });
        }

        let notification = match self.gateway.fetch_status(transaction_id).await {
            Ok(notification) => notification,
            Err(err) => {
                // Degrade to the last known local status.
                warn!(transaction_id, error = %err, "Gateway status check failed");
                return Ok(StatusView {
                    transaction_id: transaction_id.to_string(),
                    status: transaction.status,
                    payment_method: transaction.payment_method,
                    gateway_status: None,
                });
            }
        };

        let action = map_gateway_status(
            &notification.transaction_status,
            notification.fraud_status.as_deref(),
        );

        let mut status = transaction.status;
        if let Some(target) = action.target() {
            if target != status {
                // The transition unit enforces the state machine, so a
                // settled local status can never regress here.
                if let TransitionOutcome::Applied(updated) =
                    settle_with_stock_restore(&self.db, transaction_id, target).await?
                {
                    info!(transaction_id, status = %updated.status, "Status reconciled on read");
                    status = updated.status;
                }
            }
        }

        Ok(StatusView {
            transaction_id: transaction_id.to_string(),
            status,
            payment_method: transaction.payment_method,
            gateway_status: Some(notification),
        })
    }

    /// Cancels a pending payment: best-effort cancel on the gateway,
    /// then the local `pending → cancelled` transition with stock
    /// restoration.
    pub async fn cancel_payment(
        &self,
        principal: &Principal,
        transaction_id: &str,
    ) -> ServiceResult<Transaction> {
        debug!(transaction_id, "cancel_payment");

        let transaction = self.load_owned(principal, transaction_id).await?;

        if transaction.payment_method == PaymentMethod::Gateway
            && transaction.payment_token.is_some()
        {
            // Local cancellation proceeds even when the gateway call
            // fails; the webhook/poll paths converge later.
            if let Err(err) = self.gateway.cancel(transaction_id).await {
                warn!(transaction_id, error = %err, "Gateway cancel failed");
            }
        }

        match settle_with_stock_restore(&self.db, transaction_id, TransactionStatus::Cancelled)
            .await?
        {
            TransitionOutcome::Applied(updated) => {
                info!(transaction_id, "Payment cancelled");
                Ok(updated)
            }
            TransitionOutcome::NotApplicable(current) => Err(CoreError::InvalidStateTransition {
                transaction_id: transaction_id.to_string(),
                current: current.status,
            }
            .into()),
            TransitionOutcome::NotFound => {
                Err(CoreError::TransactionNotFound(transaction_id.to_string()).into())
            }
        }
    }

    /// Loads a transaction and enforces the ownership rule.
    async fn load_owned(
        &self,
        principal: &Principal,
        transaction_id: &str,
    ) -> ServiceResult<Transaction> {
        let transaction = self
            .db
            .transactions()
            .get_by_id(transaction_id)
            .await?
            .ok_or_else(|| CoreError::TransactionNotFound(transaction_id.to_string()))?;

        if !principal.can_act_on(transaction.user_id) {
            return Err(ServiceError::access_denied());
        }

        Ok(transaction)
    }
}
