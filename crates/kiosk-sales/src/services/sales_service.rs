//! # Sales Service
//!
//! Sale creation and the transaction lifecycle.
//!
//! ## Creation Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      create_sale, one unit of work                      │
//! │                                                                         │
//! │  begin()                                                                │
//! │    │                                                                    │
//! │    ├── read each product row            (repository)                    │
//! │    ├── plan_reservation()               (kiosk-core, pure)              │
//! │    ├── conditional stock decrement × N  (guard against races)           │
//! │    ├── insert transaction (pending)                                     │
//! │    └── insert line snapshots × N                                        │
//! │  commit()                                                               │
//! │                                                                         │
//! │  Any failure before commit() drops the unit of work and rolls every     │
//! │  effect back; a partial stock decrement is never observable.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Settlement (`pending → paid` / `pending → cancelled`) goes through
//! [`settle_with_stock_restore`]: the one place that pairs a status write
//! with the stock reversal, shared by the caller-facing status update and
//! the payment reconciliation paths.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kiosk_core::reservation::{plan_reservation, LineRequest};
use kiosk_core::validation::validate_optional_text;
use kiosk_core::{
    lifecycle, CoreError, PaymentMethod, Principal, Transaction, TransactionLine,
    TransactionStatus,
};
use kiosk_db::repository::{product as product_repo, transaction as txn_repo};
use kiosk_db::{Database, DbError, TransactionFilter};

use crate::error::{ServiceError, ServiceResult};

// =============================================================================
// Request / Response Types
// =============================================================================

/// Inbound create-sale request (already authenticated and deserialized).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    /// Caller-declared total in cents. Sanity check only; the computed
    /// total is authoritative.
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub items: Vec<LineRequest>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
}

/// A transaction together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleView {
    pub transaction: Transaction,
    pub lines: Vec<TransactionLine>,
}

/// Listing filter for transactions, as exposed to callers.
#[derive(Debug, Clone, Default)]
pub struct SaleListFilter {
    pub status: Option<TransactionStatus>,
    pub payment_method: Option<PaymentMethod>,
    /// Only honored for unrestricted principals; cashiers are always
    /// pinned to their own transactions.
    pub user_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// =============================================================================
// Service
// =============================================================================

/// Sale creation and lifecycle operations.
#[derive(Debug, Clone)]
pub struct SalesService {
    db: Database,
}

impl SalesService {
    /// Creates a new SalesService over a database handle.
    pub fn new(db: Database) -> Self {
        SalesService { db }
    }

    /// Records a sale: validates and reserves stock, then persists the
    /// transaction with its line snapshots, all inside one unit of work.
    ///
    /// ## Errors
    /// * `PRODUCT_NOT_FOUND` - a requested product is absent or inactive
    /// * `INSUFFICIENT_STOCK` - requested quantity exceeds current stock
    /// * `TOTAL_MISMATCH` - declared total diverges beyond one cent
    /// * `DUPLICATE_IDENTIFIER` - generated id collided (fatal, not retried)
    pub async fn create_sale(
        &self,
        principal: &Principal,
        request: &CreateSaleRequest,
    ) -> ServiceResult<SaleView> {
        debug!(user_id = principal.id, items = request.items.len(), "create_sale");

        validate_optional_text("customer_name", request.customer_name.as_deref(), 200)
            .map_err(CoreError::from)?;
        validate_optional_text("customer_phone", request.customer_phone.as_deref(), 32)
            .map_err(CoreError::from)?;
        validate_optional_text("notes", request.notes.as_deref(), 1000)
            .map_err(CoreError::from)?;

        let mut tx = self.db.begin().await?;

        // Resolve every requested product inside the unit of work so the
        // plan prices against the rows this unit will decrement.
        let mut resolved = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let product = product_repo::find_for_reservation(&mut tx, item.product_id)
                .await?
                .ok_or(CoreError::ProductNotFound(item.product_id))?;
            resolved.push((product, item.quantity));
        }

        let plan = plan_reservation(&resolved, request.total_cents)?;

        // Decrement stock with the conditional guard. A failed guard means
        // a concurrent reservation emptied the shelf after our read; the
        // whole unit rolls back on return.
        for line in &plan.lines {
            let applied =
                product_repo::decrement_stock(&mut tx, line.product_id, line.quantity).await?;
            if !applied {
                let available = product_repo::find_for_reservation(&mut tx, line.product_id)
                    .await?
                    .map(|p| p.stock)
                    .unwrap_or(0);
                return Err(CoreError::InsufficientStock {
                    name: line.product_name.clone(),
                    available,
                    requested: line.quantity,
                }
                .into());
            }
        }

        let now = Utc::now();
        let transaction = Transaction {
            id: generate_transaction_id(),
            user_id: principal.id,
            total_cents: plan.total_cents,
            status: TransactionStatus::Pending,
            payment_method: request.payment_method,
            customer_name: request.customer_name.clone(),
            customer_phone: request.customer_phone.clone(),
            notes: request.notes.clone(),
            payment_token: None,
            created_at: now,
            updated_at: now,
        };

        // A UNIQUE violation here surfaces as DUPLICATE_IDENTIFIER: id
        // collisions are a fatal creation error, never silently retried.
        txn_repo::insert(&mut tx, &transaction).await?;

        let mut lines = Vec::with_capacity(plan.lines.len());
        for planned in &plan.lines {
            let line = TransactionLine {
                id: txn_repo::generate_line_id(),
                transaction_id: transaction.id.clone(),
                product_id: planned.product_id,
                product_name: planned.product_name.clone(),
                unit_price_cents: planned.unit_price_cents,
                quantity: planned.quantity,
                subtotal_cents: planned.subtotal_cents,
                created_at: now,
            };
            txn_repo::insert_line(&mut tx, &line).await?;
            lines.push(line);
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            transaction_id = %transaction.id,
            total = transaction.total_cents,
            lines = lines.len(),
            "Sale created"
        );

        Ok(SaleView { transaction, lines })
    }

    /// Gets a transaction with its lines, enforcing the ownership rule.
    pub async fn get_sale(&self, principal: &Principal, id: &str) -> ServiceResult<SaleView> {
        let transaction = self
            .db
            .transactions()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;

        if !principal.can_act_on(transaction.user_id) {
            return Err(ServiceError::access_denied());
        }

        let lines = self.db.transactions().get_lines(id).await?;

        Ok(SaleView { transaction, lines })
    }

    /// Lists transactions, newest first. Cashiers only ever see their own.
    pub async fn list_sales(
        &self,
        principal: &Principal,
        filter: &SaleListFilter,
    ) -> ServiceResult<Vec<Transaction>> {
        let user_id = if principal.is_admin() {
            filter.user_id
        } else {
            Some(principal.id)
        };

        let transactions = self
            .db
            .transactions()
            .list(&TransactionFilter {
                status: filter.status,
                payment_method: filter.payment_method,
                user_id,
                limit: filter.limit,
                offset: filter.offset,
            })
            .await?;

        Ok(transactions)
    }

    /// Drives a transaction to `paid` or `cancelled` on behalf of a
    /// principal.
    ///
    /// Cancellation restores the stock deducted at creation, inside the
    /// same unit of work as the status write. Transitions out of a settled
    /// status fail with `INVALID_STATE_TRANSITION` and change nothing.
    pub async fn update_status(
        &self,
        principal: &Principal,
        id: &str,
        target: TransactionStatus,
    ) -> ServiceResult<Transaction> {
        debug!(id, target = %target, user_id = principal.id, "update_status");

        let existing = self
            .db
            .transactions()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;

        if !principal.can_act_on(existing.user_id) {
            return Err(ServiceError::access_denied());
        }

        match settle_with_stock_restore(&self.db, id, target).await? {
            TransitionOutcome::Applied(updated) => {
                info!(id, status = %updated.status, "Transaction status updated");
                Ok(updated)
            }
            TransitionOutcome::NotFound => {
                Err(CoreError::TransactionNotFound(id.to_string()).into())
            }
            TransitionOutcome::NotApplicable(current) => Err(CoreError::InvalidStateTransition {
                transaction_id: id.to_string(),
                current: current.status,
            }
            .into()),
        }
    }
}

// =============================================================================
// Shared Transition Unit
// =============================================================================

/// Outcome of attempting a settlement transition.
#[derive(Debug)]
pub(crate) enum TransitionOutcome {
    /// Transition applied; carries the updated transaction.
    Applied(Transaction),
    /// No such transaction.
    NotFound,
    /// The state machine rejected the transition (already settled, or a
    /// concurrent settle won). Carries the current row, untouched.
    NotApplicable(Transaction),
}

/// Applies `pending → target` with stock restoration on cancellation, as
/// one unit of work.
///
/// This is the single implementation behind the caller-facing status
/// update, webhook ingestion and reconcile-on-read, which differ only in
/// how they interpret a `NotApplicable` outcome (error vs. logged no-op).
/// The conditional status write makes concurrent invocations apply at most
/// once.
pub(crate) async fn settle_with_stock_restore(
    db: &Database,
    id: &str,
    target: TransactionStatus,
) -> ServiceResult<TransitionOutcome> {
    let mut tx = db.begin().await?;

    let Some(existing) = txn_repo::find_by_id(&mut tx, id).await? else {
        return Ok(TransitionOutcome::NotFound);
    };

    if !lifecycle::can_transition(existing.status, target) {
        return Ok(TransitionOutcome::NotApplicable(existing));
    }

    if target == TransactionStatus::Cancelled {
        // Restore exactly what creation deducted, line by line, in the
        // same unit as the status write.
        let lines = txn_repo::find_lines(&mut tx, id).await?;
        for line in &lines {
            product_repo::increment_stock(&mut tx, line.product_id, line.quantity).await?;
        }
    }

    let applied = txn_repo::settle_pending(&mut tx, id, target).await?;
    if !applied {
        // A concurrent settle slipped between our read and the guard.
        // Dropping the unit rolls back any stock increments above.
        drop(tx);
        return match db.transactions().get_by_id(id).await? {
            Some(current) => Ok(TransitionOutcome::NotApplicable(current)),
            None => Ok(TransitionOutcome::NotFound),
        };
    }

    let updated = txn_repo::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;

    tx.commit().await.map_err(DbError::from)?;

    Ok(TransitionOutcome::Applied(updated))
}

// =============================================================================
// ID Generation
// =============================================================================

/// Generates a transaction id: `TRX` + millisecond timestamp + hex suffix.
///
/// Collision probability within operational timeframes is negligible; the
/// UNIQUE primary key catches the residual case and creation fails rather
/// than retries.
fn generate_transaction_id() -> String {
    let now = Utc::now();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("TRX{}{:04X}", now.timestamp_millis(), nanos % 0x1_0000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_id_shape() {
        let id = generate_transaction_id();
        assert!(id.starts_with("TRX"));
        assert!(id.len() > 13);
    }

    #[test]
    fn test_transaction_ids_differ() {
        // Not a collision-resistance proof, just a sanity check that the
        // suffix varies within a single millisecond.
        let a = generate_transaction_id();
        let b = generate_transaction_id();
        let c = generate_transaction_id();
        assert!(a != b || b != c);
    }
}
