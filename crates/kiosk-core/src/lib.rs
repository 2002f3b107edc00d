//! # kiosk-core: Pure Business Logic for Kiosk POS
//!
//! This crate is the **heart** of Kiosk POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kiosk POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 kiosk-sales (Service Layer)                     │   │
//! │  │   SalesService, ProductService, PaymentService, gateway client  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kiosk-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌───────────┐ ┌───────────┐ ┌───────────────────┐ │   │
//! │  │  │  types  │ │   money   │ │reservation│ │ lifecycle/reconcile│ │   │
//! │  │  │ Product │ │   Money   │ │ stock +   │ │  state machine +  │ │   │
//! │  │  │ Txn,Line│ │  (cents)  │ │ pricing   │ │  gateway mapping  │ │   │
//! │  │  └─────────┘ └───────────┘ └───────────┘ └───────────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kiosk-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Transaction, TransactionLine, Principal)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error taxonomy
//! - [`reservation`] - Inventory reservation calculator
//! - [`lifecycle`] - Transaction state machine
//! - [`reconcile`] - Gateway status mapping
//! - [`validation`] - Field-level validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod money;
pub mod reconcile;
pub mod reservation;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kiosk_core::Money` instead of
// `use kiosk_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use reconcile::SettlementAction;
pub use reservation::{LineRequest, ReservationPlan, ReservedLine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tolerance, in cents, for the caller-declared total sanity check.
///
/// ## Why one cent?
/// The declared total exists only to catch a stale client-side cart (price
/// changed between display and submit). With integer money the historical
/// 0.01 decimal tolerance is exactly one cent; the computed total is always
/// what gets persisted.
pub const TOTAL_EPSILON_CENTS: i64 = 1;

/// Maximum number of line items in a single sale.
///
/// ## Business Reason
/// Prevents runaway requests and keeps a single unit of work bounded.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
