//! # Service Layer
//!
//! Service implementations composing kiosk-core rules with kiosk-db
//! storage.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Service Layer                                   │
//! │                                                                         │
//! │  SalesService     create_sale, get_sale, list_sales, update_status      │
//! │  ProductService   catalog CRUD + delete policy                          │
//! │  PaymentService   create_session, handle_notification,                  │
//! │                   check_status, cancel_payment                          │
//! │                                                                         │
//! │  Every operation takes the authenticated Principal explicitly;          │
//! │  there is no ambient caller state.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod payment_service;
pub mod product_service;
pub mod sales_service;

pub use payment_service::{PaymentService, PaymentSessionView, ReconcileOutcome, StatusView};
pub use product_service::{
    CreateProductRequest, DeleteOutcome, ProductService, UpdateProductRequest,
};
pub use sales_service::{CreateSaleRequest, SaleListFilter, SaleView, SalesService};
