//! End-to-end tests for sale creation and the transaction lifecycle,
//! running against an in-memory SQLite database.

use kiosk_core::{LineRequest, PaymentMethod, Principal, TransactionStatus};
use kiosk_db::{Database, DbConfig, NewProduct};
use kiosk_sales::error::ErrorCode;
use kiosk_sales::services::{CreateSaleRequest, SalesService, UpdateProductRequest};
use kiosk_sales::ProductService;

async fn setup() -> (Database, SalesService) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    (db.clone(), SalesService::new(db))
}

async fn seed_product(db: &Database, name: &str, price_cents: i64, stock: i64) -> i64 {
    db.products()
        .insert(&NewProduct {
            name: name.to_string(),
            description: None,
            category: None,
            price_cents,
            stock,
        })
        .await
        .unwrap()
        .id
}

fn sale_request(product_id: i64, quantity: i64, total_cents: i64) -> CreateSaleRequest {
    CreateSaleRequest {
        total_cents,
        payment_method: PaymentMethod::Cash,
        items: vec![LineRequest {
            product_id,
            quantity,
        }],
        customer_name: None,
        customer_phone: None,
        notes: None,
    }
}

async fn stock_of(db: &Database, id: i64) -> i64 {
    db.products().get_by_id(id).await.unwrap().unwrap().stock
}

#[tokio::test]
async fn create_sale_deducts_stock_and_snapshots_lines() {
    let (db, sales) = setup().await;
    let cashier = Principal::cashier(1);

    // stock=5, price=1000; sell 3 declaring 3000
    let product_id = seed_product(&db, "Kopi Susu", 1000, 5).await;

    let sale = sales
        .create_sale(&cashier, &sale_request(product_id, 3, 3000))
        .await
        .unwrap();

    assert_eq!(sale.transaction.status, TransactionStatus::Pending);
    assert_eq!(sale.transaction.total_cents, 3000);
    assert_eq!(sale.transaction.user_id, 1);
    assert!(sale.transaction.id.starts_with("TRX"));

    assert_eq!(sale.lines.len(), 1);
    assert_eq!(sale.lines[0].product_name, "Kopi Susu");
    assert_eq!(sale.lines[0].unit_price_cents, 1000);
    assert_eq!(sale.lines[0].subtotal_cents, 3000);

    // Sum of line subtotals equals the transaction total.
    let line_sum: i64 = sale.lines.iter().map(|l| l.subtotal_cents).sum();
    assert_eq!(line_sum, sale.transaction.total_cents);

    assert_eq!(stock_of(&db, product_id).await, 2);
}

#[tokio::test]
async fn total_mismatch_fails_and_leaves_stock_untouched() {
    let (db, sales) = setup().await;
    let cashier = Principal::cashier(1);
    let product_id = seed_product(&db, "Kopi Susu", 1000, 5).await;

    let err = sales
        .create_sale(&cashier, &sale_request(product_id, 3, 2999))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::TotalMismatch);
    assert_eq!(stock_of(&db, product_id).await, 5);
}

#[tokio::test]
async fn declared_total_within_one_cent_is_accepted() {
    let (db, sales) = setup().await;
    let cashier = Principal::cashier(1);
    let product_id = seed_product(&db, "Kopi Susu", 1000, 5).await;

    let sale = sales
        .create_sale(&cashier, &sale_request(product_id, 3, 3001))
        .await
        .unwrap();

    // The computed total wins over the declared one.
    assert_eq!(sale.transaction.total_cents, 3000);
}

#[tokio::test]
async fn insufficient_stock_fails_whole_sale() {
    let (db, sales) = setup().await;
    let cashier = Principal::cashier(1);
    let coffee = seed_product(&db, "Kopi Susu", 1000, 5).await;
    let tea = seed_product(&db, "Teh Manis", 500, 1).await;

    // First line would fit, second doesn't; nothing may be deducted.
    let err = sales
        .create_sale(
            &cashier,
            &CreateSaleRequest {
                total_cents: 4000,
                payment_method: PaymentMethod::Cash,
                items: vec![
                    LineRequest {
                        product_id: coffee,
                        quantity: 3,
                    },
                    LineRequest {
                        product_id: tea,
                        quantity: 2,
                    },
                ],
                customer_name: None,
                customer_phone: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InsufficientStock);
    assert_eq!(stock_of(&db, coffee).await, 5);
    assert_eq!(stock_of(&db, tea).await, 1);
}

#[tokio::test]
async fn unknown_product_fails_creation() {
    let (_db, sales) = setup().await;
    let cashier = Principal::cashier(1);

    let err = sales
        .create_sale(&cashier, &sale_request(404, 1, 1000))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ProductNotFound);
}

#[tokio::test]
async fn price_snapshot_survives_later_price_change() {
    let (db, sales) = setup().await;
    let cashier = Principal::cashier(1);
    let admin = Principal::admin(99);
    let products = ProductService::new(db.clone());

    let product_id = seed_product(&db, "Kopi Susu", 1000, 5).await;

    let sale = sales
        .create_sale(&cashier, &sale_request(product_id, 2, 2000))
        .await
        .unwrap();

    // Reprice the product after the sale.
    products
        .update_product(
            &admin,
            product_id,
            &UpdateProductRequest {
                price_cents: Some(1500),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let view = sales.get_sale(&cashier, &sale.transaction.id).await.unwrap();
    assert_eq!(view.lines[0].unit_price_cents, 1000);
    assert_eq!(view.transaction.total_cents, 2000);
}

#[tokio::test]
async fn cancel_restores_stock_and_is_terminal() {
    let (db, sales) = setup().await;
    let cashier = Principal::cashier(1);
    let product_id = seed_product(&db, "Kopi Susu", 1000, 5).await;

    let sale = sales
        .create_sale(&cashier, &sale_request(product_id, 3, 3000))
        .await
        .unwrap();
    assert_eq!(stock_of(&db, product_id).await, 2);

    // Cancel: stock returns to the pre-creation level.
    let cancelled = sales
        .update_status(&cashier, &sale.transaction.id, TransactionStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, TransactionStatus::Cancelled);
    assert_eq!(stock_of(&db, product_id).await, 5);

    // A second cancel must fail and change nothing.
    let err = sales
        .update_status(&cashier, &sale.transaction.id, TransactionStatus::Cancelled)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    assert_eq!(stock_of(&db, product_id).await, 5);
}

#[tokio::test]
async fn paid_is_terminal_and_keeps_deduction() {
    let (db, sales) = setup().await;
    let cashier = Principal::cashier(1);
    let product_id = seed_product(&db, "Kopi Susu", 1000, 5).await;

    let sale = sales
        .create_sale(&cashier, &sale_request(product_id, 3, 3000))
        .await
        .unwrap();

    let paid = sales
        .update_status(&cashier, &sale.transaction.id, TransactionStatus::Paid)
        .await
        .unwrap();
    assert_eq!(paid.status, TransactionStatus::Paid);
    // Paying has no inventory effect: stock was deducted at creation.
    assert_eq!(stock_of(&db, product_id).await, 2);

    // Neither cancelling nor re-paying a paid transaction is legal.
    for target in [TransactionStatus::Cancelled, TransactionStatus::Paid] {
        let err = sales
            .update_status(&cashier, &sale.transaction.id, target)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }
    assert_eq!(stock_of(&db, product_id).await, 2);
}

#[tokio::test]
async fn concurrent_sales_of_last_unit_oversell_is_prevented() {
    let (db, sales) = setup().await;
    let product_id = seed_product(&db, "Kopi Susu", 1000, 1).await;

    let sales_a = sales.clone();
    let sales_b = sales.clone();
    let req_a = sale_request(product_id, 1, 1000);
    let req_b = sale_request(product_id, 1, 1000);

    let task_a =
        tokio::spawn(async move { sales_a.create_sale(&Principal::cashier(1), &req_a).await });
    let task_b =
        tokio::spawn(async move { sales_b.create_sale(&Principal::cashier(2), &req_b).await });

    let result_a = task_a.await.unwrap();
    let result_b = task_b.await.unwrap();

    // Exactly one wins the last unit.
    let successes = [&result_a, &result_b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);

    let failure = [result_a, result_b]
        .into_iter()
        .find(|r| r.is_err())
        .unwrap()
        .unwrap_err();
    assert_eq!(failure.code, ErrorCode::InsufficientStock);

    assert_eq!(stock_of(&db, product_id).await, 0);
}

#[tokio::test]
async fn cashier_cannot_touch_another_cashiers_sale() {
    let (db, sales) = setup().await;
    let owner = Principal::cashier(1);
    let other = Principal::cashier(2);
    let admin = Principal::admin(99);
    let product_id = seed_product(&db, "Kopi Susu", 1000, 5).await;

    let sale = sales
        .create_sale(&owner, &sale_request(product_id, 1, 1000))
        .await
        .unwrap();

    let err = sales.get_sale(&other, &sale.transaction.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AccessDenied);

    let err = sales
        .update_status(&other, &sale.transaction.id, TransactionStatus::Paid)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AccessDenied);

    // Unrestricted principals act on anything.
    assert!(sales.get_sale(&admin, &sale.transaction.id).await.is_ok());
    assert!(sales
        .update_status(&admin, &sale.transaction.id, TransactionStatus::Paid)
        .await
        .is_ok());
}

#[tokio::test]
async fn cashier_listing_is_pinned_to_own_sales() {
    let (db, sales) = setup().await;
    let first = Principal::cashier(1);
    let second = Principal::cashier(2);
    let admin = Principal::admin(99);
    let product_id = seed_product(&db, "Kopi Susu", 1000, 10).await;

    sales
        .create_sale(&first, &sale_request(product_id, 1, 1000))
        .await
        .unwrap();
    sales
        .create_sale(&second, &sale_request(product_id, 1, 1000))
        .await
        .unwrap();

    let mine = sales
        .list_sales(&first, &Default::default())
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].user_id, 1);

    let all = sales
        .list_sales(&admin, &Default::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn create_then_cancel_round_trip_for_multiple_products() {
    let (db, sales) = setup().await;
    let cashier = Principal::cashier(1);
    let coffee = seed_product(&db, "Kopi Susu", 1000, 7).await;
    let tea = seed_product(&db, "Teh Manis", 500, 4).await;

    let sale = sales
        .create_sale(
            &cashier,
            &CreateSaleRequest {
                total_cents: 4000,
                payment_method: PaymentMethod::Cash,
                items: vec![
                    LineRequest {
                        product_id: coffee,
                        quantity: 3,
                    },
                    LineRequest {
                        product_id: tea,
                        quantity: 2,
                    },
                ],
                customer_name: Some("Budi".to_string()),
                customer_phone: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(stock_of(&db, coffee).await, 4);
    assert_eq!(stock_of(&db, tea).await, 2);

    sales
        .update_status(&cashier, &sale.transaction.id, TransactionStatus::Cancelled)
        .await
        .unwrap();

    // Every touched product is back at its pre-creation level.
    assert_eq!(stock_of(&db, coffee).await, 7);
    assert_eq!(stock_of(&db, tea).await, 4);
}
