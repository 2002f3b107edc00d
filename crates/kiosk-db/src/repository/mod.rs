//! # Repository Module
//!
//! Database repository implementations for Kiosk POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Repository Pattern Explained                        │
//! │                                                                         │
//! │  Service operation                                                      │
//! │       │                                                                 │
//! │       │  db.products().get_by_id(7)                                     │
//! │       ▼                                                                 │
//! │  ProductRepository / TransactionRepository                              │
//! │       │  SQL query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Pool-scoped methods live on the repository structs. Operations that    │
//! │  only make sense inside a unit of work (stock decrements, transaction   │
//! │  inserts, conditional status updates) are module-level functions        │
//! │  taking `&mut SqliteConnection` - the caller owns begin/commit.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD and the stock counter
//! - [`transaction::TransactionRepository`] - Transactions and line items

pub mod product;
pub mod transaction;
