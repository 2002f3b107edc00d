//! End-to-end tests for payment-gateway reconciliation: session creation,
//! webhook ingestion (including replays), the synchronous status check and
//! its degraded mode, against an in-memory database and a scripted gateway.

use std::sync::Arc;

use kiosk_core::{LineRequest, PaymentMethod, Principal, TransactionStatus};
use kiosk_db::{Database, DbConfig, NewProduct};
use kiosk_sales::error::ErrorCode;
use kiosk_sales::gateway::GatewayNotification;
use kiosk_sales::services::{CreateSaleRequest, ReconcileOutcome};
use kiosk_sales::{MockGateway, PaymentService, SalesService};

struct Harness {
    db: Database,
    sales: SalesService,
    payments: PaymentService,
    gateway: Arc<MockGateway>,
}

async fn setup() -> Harness {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let gateway = Arc::new(MockGateway::new());
    Harness {
        db: db.clone(),
        sales: SalesService::new(db.clone()),
        payments: PaymentService::new(db, gateway.clone()),
        gateway,
    }
}

impl Harness {
    /// Seeds a product and creates a pending gateway sale with a session.
    async fn pending_gateway_sale(&self, stock: i64, quantity: i64) -> (i64, String) {
        let product_id = self
            .db
            .products()
            .insert(&NewProduct {
                name: "Kopi Susu".to_string(),
                description: None,
                category: None,
                price_cents: 1000,
                stock,
            })
            .await
            .unwrap()
            .id;

        let sale = self
            .sales
            .create_sale(
                &Principal::cashier(1),
                &CreateSaleRequest {
                    total_cents: 1000 * quantity,
                    payment_method: PaymentMethod::Gateway,
                    items: vec![LineRequest {
                        product_id,
                        quantity,
                    }],
                    customer_name: Some("Budi".to_string()),
                    customer_phone: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        self.payments
            .create_session(&Principal::cashier(1), &sale.transaction.id, None)
            .await
            .unwrap();

        (product_id, sale.transaction.id)
    }

    async fn status_of(&self, id: &str) -> TransactionStatus {
        self.db
            .transactions()
            .get_by_id(id)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    async fn stock_of(&self, id: i64) -> i64 {
        self.db.products().get_by_id(id).await.unwrap().unwrap().stock
    }
}

fn notification(order_id: &str, status: &str, fraud: Option<&str>) -> GatewayNotification {
    GatewayNotification {
        order_id: order_id.to_string(),
        transaction_status: status.to_string(),
        fraud_status: fraud.map(str::to_string),
    }
}

#[tokio::test]
async fn create_session_stores_token() {
    let h = setup().await;
    let (_, txn_id) = h.pending_gateway_sale(5, 2).await;

    assert!(h.gateway.has_session(&txn_id));

    let txn = h.db.transactions().get_by_id(&txn_id).await.unwrap().unwrap();
    assert_eq!(txn.payment_token.as_deref(), Some(&*format!("mock-token-{txn_id}")));
}

#[tokio::test]
async fn create_session_requires_pending() {
    let h = setup().await;
    let (_, txn_id) = h.pending_gateway_sale(5, 2).await;

    h.sales
        .update_status(&Principal::admin(9), &txn_id, TransactionStatus::Paid)
        .await
        .unwrap();

    let err = h
        .payments
        .create_session(&Principal::cashier(1), &txn_id, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidStateTransition);
}

#[tokio::test]
async fn settlement_notification_marks_paid_and_replay_is_noop() {
    let h = setup().await;
    let (product_id, txn_id) = h.pending_gateway_sale(5, 2).await;

    let outcome = h
        .payments
        .handle_notification(&notification(&txn_id, "settlement", None))
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Applied(TransactionStatus::Paid));
    assert_eq!(h.status_of(&txn_id).await, TransactionStatus::Paid);

    // Identical replay: same end state, reported as a no-op.
    let outcome = h
        .payments
        .handle_notification(&notification(&txn_id, "settlement", None))
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::NoOp);
    assert_eq!(h.status_of(&txn_id).await, TransactionStatus::Paid);
    assert_eq!(h.stock_of(product_id).await, 3);
}

#[tokio::test]
async fn capture_accept_marks_paid_capture_challenge_holds() {
    let h = setup().await;
    let (_, txn_id) = h.pending_gateway_sale(5, 2).await;

    let outcome = h
        .payments
        .handle_notification(&notification(&txn_id, "capture", Some("challenge")))
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::NoOp);
    assert_eq!(h.status_of(&txn_id).await, TransactionStatus::Pending);

    let outcome = h
        .payments
        .handle_notification(&notification(&txn_id, "capture", Some("accept")))
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Applied(TransactionStatus::Paid));
}

#[tokio::test]
async fn deny_notification_cancels_and_restores_stock() {
    let h = setup().await;
    let (product_id, txn_id) = h.pending_gateway_sale(5, 2).await;
    assert_eq!(h.stock_of(product_id).await, 3);

    let outcome = h
        .payments
        .handle_notification(&notification(&txn_id, "deny", None))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ReconcileOutcome::Applied(TransactionStatus::Cancelled)
    );
    assert_eq!(h.status_of(&txn_id).await, TransactionStatus::Cancelled);
    assert_eq!(h.stock_of(product_id).await, 5);

    // Expire arriving after the cancel settles nothing further.
    let outcome = h
        .payments
        .handle_notification(&notification(&txn_id, "expire", None))
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::NoOp);
    assert_eq!(h.stock_of(product_id).await, 5);
}

#[tokio::test]
async fn notification_after_settled_is_noop_not_error() {
    let h = setup().await;
    let (product_id, txn_id) = h.pending_gateway_sale(5, 2).await;

    h.sales
        .update_status(&Principal::admin(9), &txn_id, TransactionStatus::Paid)
        .await
        .unwrap();

    // Gateway says cancel, but the transaction is already settled locally.
    let outcome = h
        .payments
        .handle_notification(&notification(&txn_id, "cancel", None))
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::NoOp);
    assert_eq!(h.status_of(&txn_id).await, TransactionStatus::Paid);
    assert_eq!(h.stock_of(product_id).await, 3);
}

#[tokio::test]
async fn notification_for_unknown_order_is_noop() {
    let h = setup().await;

    let outcome = h
        .payments
        .handle_notification(&notification("TRXnope", "settlement", None))
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::NoOp);
}

#[tokio::test]
async fn concurrent_replays_apply_once() {
    let h = setup().await;
    let (product_id, txn_id) = h.pending_gateway_sale(5, 2).await;

    let p1 = h.payments.clone();
    let p2 = h.payments.clone();
    let n1 = notification(&txn_id, "deny", None);
    let n2 = notification(&txn_id, "deny", None);

    let a = tokio::spawn(async move { p1.handle_notification(&n1).await });
    let b = tokio::spawn(async move { p2.handle_notification(&n2).await });
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    // Stock restored exactly once regardless of delivery count.
    assert_eq!(h.stock_of(product_id).await, 5);
    assert_eq!(h.status_of(&txn_id).await, TransactionStatus::Cancelled);
}

#[tokio::test]
async fn check_status_reconciles_on_read() {
    let h = setup().await;
    let (_, txn_id) = h.pending_gateway_sale(5, 2).await;

    h.gateway.set_status(&txn_id, "settlement", None);

    let view = h
        .payments
        .check_status(&Principal::cashier(1), &txn_id)
        .await
        .unwrap();

    assert_eq!(view.status, TransactionStatus::Paid);
    assert_eq!(
        view.gateway_status.as_ref().unwrap().transaction_status,
        "settlement"
    );
    // Corrected status was persisted before returning.
    assert_eq!(h.status_of(&txn_id).await, TransactionStatus::Paid);
}

#[tokio::test]
async fn check_status_degrades_to_local_on_gateway_failure() {
    let h = setup().await;
    let (_, txn_id) = h.pending_gateway_sale(5, 2).await;

    h.gateway.set_unavailable(true);

    let view = h
        .payments
        .check_status(&Principal::cashier(1), &txn_id)
        .await
        .unwrap();

    assert_eq!(view.status, TransactionStatus::Pending);
    assert!(view.gateway_status.is_none());
}

#[tokio::test]
async fn check_status_never_regresses_a_settled_transaction() {
    let h = setup().await;
    let (_, txn_id) = h.pending_gateway_sale(5, 2).await;

    h.sales
        .update_status(&Principal::admin(9), &txn_id, TransactionStatus::Paid)
        .await
        .unwrap();

    // Gateway still reports pending (e.g. webhook raced ahead of its view).
    h.gateway.set_status(&txn_id, "pending", None);

    let view = h
        .payments
        .check_status(&Principal::cashier(1), &txn_id)
        .await
        .unwrap();

    assert_eq!(view.status, TransactionStatus::Paid);
    assert_eq!(h.status_of(&txn_id).await, TransactionStatus::Paid);
}

#[tokio::test]
async fn check_status_skips_gateway_for_cash_sales() {
    let h = setup().await;
    let product_id = h
        .db
        .products()
        .insert(&NewProduct {
            name: "Teh Manis".to_string(),
            description: None,
            category: None,
            price_cents: 500,
            stock: 3,
        })
        .await
        .unwrap()
        .id;

    let sale = h
        .sales
        .create_sale(
            &Principal::cashier(1),
            &CreateSaleRequest {
                total_cents: 500,
                payment_method: PaymentMethod::Cash,
                items: vec![LineRequest {
                    product_id,
                    quantity: 1,
                }],
                customer_name: None,
                customer_phone: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    // Gateway down; a cash sale's status check must not care.
    h.gateway.set_unavailable(true);

    let view = h
        .payments
        .check_status(&Principal::cashier(1), &sale.transaction.id)
        .await
        .unwrap();
    assert_eq!(view.status, TransactionStatus::Pending);
    assert!(view.gateway_status.is_none());
}

#[tokio::test]
async fn cancel_payment_cancels_gateway_and_restores_stock() {
    let h = setup().await;
    let (product_id, txn_id) = h.pending_gateway_sale(5, 2).await;

    let cancelled = h
        .payments
        .cancel_payment(&Principal::cashier(1), &txn_id)
        .await
        .unwrap();

    assert_eq!(cancelled.status, TransactionStatus::Cancelled);
    assert!(h.gateway.was_cancelled(&txn_id));
    assert_eq!(h.stock_of(product_id).await, 5);
}

#[tokio::test]
async fn cancel_payment_proceeds_when_gateway_is_down() {
    let h = setup().await;
    let (product_id, txn_id) = h.pending_gateway_sale(5, 2).await;

    h.gateway.set_unavailable(true);

    // Best-effort gateway cancel: local cancellation still lands.
    let cancelled = h
        .payments
        .cancel_payment(&Principal::cashier(1), &txn_id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, TransactionStatus::Cancelled);
    assert_eq!(h.stock_of(product_id).await, 5);
}

#[tokio::test]
async fn cancel_payment_rejects_settled_transactions() {
    let h = setup().await;
    let (product_id, txn_id) = h.pending_gateway_sale(5, 2).await;

    h.sales
        .update_status(&Principal::admin(9), &txn_id, TransactionStatus::Paid)
        .await
        .unwrap();

    let err = h
        .payments
        .cancel_payment(&Principal::cashier(1), &txn_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    assert_eq!(h.stock_of(product_id).await, 3);
}

#[tokio::test]
async fn payment_paths_enforce_ownership() {
    let h = setup().await;
    let (_, txn_id) = h.pending_gateway_sale(5, 2).await;
    let stranger = Principal::cashier(42);

    let err = h
        .payments
        .check_status(&stranger, &txn_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AccessDenied);

    let err = h
        .payments
        .cancel_payment(&stranger, &txn_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AccessDenied);
}
