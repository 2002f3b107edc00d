//! # Transaction Repository
//!
//! Database operations for sales transactions and their line items.
//!
//! ## Write Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Transaction Write Discipline                           │
//! │                                                                         │
//! │  CREATE (kiosk-sales::SalesService::create_sale)                        │
//! │     one unit of work:                                                   │
//! │     └── stock decrements + insert() + insert_line() × N                 │
//! │                                                                         │
//! │  SETTLE / CANCEL (update_status)                                        │
//! │     one unit of work:                                                   │
//! │     └── [stock increments on cancel] + conditional status UPDATE        │
//! │                                                                         │
//! │  The status UPDATE carries `AND status = 'pending'` so a concurrent     │
//! │  settle observes zero affected rows instead of double-applying.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kiosk_core::{PaymentMethod, Transaction, TransactionLine, TransactionStatus};

const TXN_COLUMNS: &str = "id, user_id, total_cents, status, payment_method, \
     customer_name, customer_phone, notes, payment_token, created_at, updated_at";

const LINE_COLUMNS: &str = "id, transaction_id, product_id, product_name, \
     unit_price_cents, quantity, subtotal_cents, created_at";

// =============================================================================
// Filters
// =============================================================================

/// Transaction listing filter.
///
/// `user_id` is mandatory for restricted principals (the service layer
/// pins it to the caller); unrestricted principals may leave it unset.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub status: Option<TransactionStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub user_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Gets a transaction by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let txn = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TXN_COLUMNS} FROM transactions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(txn)
    }

    /// Gets all line items for a transaction, in insertion order.
    pub async fn get_lines(&self, transaction_id: &str) -> DbResult<Vec<TransactionLine>> {
        let lines = sqlx::query_as::<_, TransactionLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM transaction_lines \
             WHERE transaction_id = ?1 ORDER BY created_at, id"
        ))
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists transactions, newest first, with optional filters.
    pub async fn list(&self, filter: &TransactionFilter) -> DbResult<Vec<Transaction>> {
        let mut sql = format!("SELECT {TXN_COLUMNS} FROM transactions WHERE 1=1");

        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if filter.payment_method.is_some() {
            sql.push_str(" AND payment_method = ?");
        }
        if filter.user_id.is_some() {
            sql.push_str(" AND user_id = ?");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, Transaction>(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(method) = filter.payment_method {
            query = query.bind(method);
        }
        if let Some(user_id) = filter.user_id {
            query = query.bind(user_id);
        }
        query = query
            .bind(filter.limit.unwrap_or(50).max(1))
            .bind(filter.offset.unwrap_or(0).max(0));

        let transactions = query.fetch_all(&self.pool).await?;

        debug!(count = transactions.len(), "Listed transactions");
        Ok(transactions)
    }

    /// Stores the opaque gateway session token on a transaction.
    pub async fn set_payment_token(&self, id: &str, token: &str) -> DbResult<()> {
        debug!(id, "Storing payment token");

        let now = Utc::now();

        let result =
            sqlx::query("UPDATE transactions SET payment_token = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(token)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit-of-Work Operations
// =============================================================================
// These run inside a caller-owned database transaction.

/// Inserts a transaction row inside the caller's unit of work.
///
/// A `DbError::UniqueViolation` here means the generated id collided with
/// an existing row; the service layer treats that as a fatal creation
/// error, never a silent retry.
pub async fn insert(conn: &mut SqliteConnection, txn: &Transaction) -> DbResult<()> {
    debug!(id = %txn.id, total = txn.total_cents, "Inserting transaction");

    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, user_id, total_cents, status, payment_method,
            customer_name, customer_phone, notes, payment_token,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&txn.id)
    .bind(txn.user_id)
    .bind(txn.total_cents)
    .bind(txn.status)
    .bind(txn.payment_method)
    .bind(&txn.customer_name)
    .bind(&txn.customer_phone)
    .bind(&txn.notes)
    .bind(&txn.payment_token)
    .bind(txn.created_at)
    .bind(txn.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Inserts a line item inside the caller's unit of work.
///
/// Line items are immutable: there is deliberately no update counterpart.
pub async fn insert_line(conn: &mut SqliteConnection, line: &TransactionLine) -> DbResult<()> {
    debug!(
        transaction_id = %line.transaction_id,
        product_id = line.product_id,
        "Inserting transaction line"
    );

    sqlx::query(
        r#"
        INSERT INTO transaction_lines (
            id, transaction_id, product_id, product_name,
            unit_price_cents, quantity, subtotal_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&line.id)
    .bind(&line.transaction_id)
    .bind(line.product_id)
    .bind(&line.product_name)
    .bind(line.unit_price_cents)
    .bind(line.quantity)
    .bind(line.subtotal_cents)
    .bind(line.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Reads a transaction row inside the caller's unit of work.
pub async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Transaction>> {
    let txn = sqlx::query_as::<_, Transaction>(&format!(
        "SELECT {TXN_COLUMNS} FROM transactions WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(txn)
}

/// Reads a transaction's lines inside the caller's unit of work.
pub async fn find_lines(
    conn: &mut SqliteConnection,
    transaction_id: &str,
) -> DbResult<Vec<TransactionLine>> {
    let lines = sqlx::query_as::<_, TransactionLine>(&format!(
        "SELECT {LINE_COLUMNS} FROM transaction_lines \
         WHERE transaction_id = ?1 ORDER BY created_at, id"
    ))
    .bind(transaction_id)
    .fetch_all(conn)
    .await?;

    Ok(lines)
}

/// Conditionally settles a pending transaction inside the caller's unit of
/// work.
///
/// Returns `false` when no row matched: the transaction either doesn't
/// exist or already left `pending` (a concurrent settle/cancel won). The
/// caller decides whether that is `InvalidStateTransition` or an
/// idempotent no-op.
pub async fn settle_pending(
    conn: &mut SqliteConnection,
    id: &str,
    target: TransactionStatus,
) -> DbResult<bool> {
    debug!(id, target = %target, "Updating transaction status");

    let now = Utc::now();

    let result = sqlx::query(
        "UPDATE transactions SET status = ?2, updated_at = ?3 \
         WHERE id = ?1 AND status = 'pending'",
    )
    .bind(id)
    .bind(target)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Generates a new line-item ID.
pub fn generate_line_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn sample_transaction(id: &str) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: id.to_string(),
            user_id: 1,
            total_cents: 3000,
            status: TransactionStatus::Pending,
            payment_method: PaymentMethod::Cash,
            customer_name: Some("Budi".to_string()),
            customer_phone: None,
            notes: None,
            payment_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;

        let mut tx = db.begin().await.unwrap();
        insert(&mut tx, &sample_transaction("TRX100")).await.unwrap();
        tx.commit().await.unwrap();

        let fetched = db.transactions().get_by_id("TRX100").await.unwrap().unwrap();
        assert_eq!(fetched.status, TransactionStatus::Pending);
        assert_eq!(fetched.total_cents, 3000);
        assert_eq!(fetched.customer_name.as_deref(), Some("Budi"));
    }

    #[tokio::test]
    async fn test_duplicate_id_is_unique_violation() {
        let db = test_db().await;

        let mut tx = db.begin().await.unwrap();
        insert(&mut tx, &sample_transaction("TRX100")).await.unwrap();
        let err = insert(&mut tx, &sample_transaction("TRX100")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_settle_pending_applies_once() {
        let db = test_db().await;

        let mut tx = db.begin().await.unwrap();
        insert(&mut tx, &sample_transaction("TRX100")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = db.begin().await.unwrap();
        assert!(settle_pending(&mut tx, "TRX100", TransactionStatus::Paid)
            .await
            .unwrap());
        // Already settled inside the same unit: the guard refuses.
        assert!(!settle_pending(&mut tx, "TRX100", TransactionStatus::Cancelled)
            .await
            .unwrap());
        tx.commit().await.unwrap();

        let fetched = db.transactions().get_by_id("TRX100").await.unwrap().unwrap();
        assert_eq!(fetched.status, TransactionStatus::Paid);
    }

    #[tokio::test]
    async fn test_list_filters_by_user_and_status() {
        let db = test_db().await;

        let mut tx = db.begin().await.unwrap();
        insert(&mut tx, &sample_transaction("TRX1")).await.unwrap();
        let mut other = sample_transaction("TRX2");
        other.user_id = 2;
        insert(&mut tx, &other).await.unwrap();
        settle_pending(&mut tx, "TRX2", TransactionStatus::Paid)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let repo = db.transactions();

        let mine = repo
            .list(&TransactionFilter {
                user_id: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "TRX1");

        let paid = repo
            .list(&TransactionFilter {
                status: Some(TransactionStatus::Paid),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].id, "TRX2");
    }

    #[tokio::test]
    async fn test_payment_token_round_trip() {
        let db = test_db().await;

        let mut tx = db.begin().await.unwrap();
        insert(&mut tx, &sample_transaction("TRX100")).await.unwrap();
        tx.commit().await.unwrap();

        let repo = db.transactions();
        repo.set_payment_token("TRX100", "tok-abc123").await.unwrap();

        let fetched = repo.get_by_id("TRX100").await.unwrap().unwrap();
        assert_eq!(fetched.payment_token.as_deref(), Some("tok-abc123"));
    }
}
