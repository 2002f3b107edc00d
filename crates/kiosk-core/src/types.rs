//! # Domain Types
//!
//! Core domain types used throughout Kiosk POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌───────────────────┐   ┌──────────────────┐    │
//! │  │    Product      │   │   Transaction     │   │ TransactionLine  │    │
//! │  │  ─────────────  │   │  ───────────────  │   │  ──────────────  │    │
//! │  │  id (i64)       │   │  id (TRX string)  │   │  id (UUID)       │    │
//! │  │  name (unique)  │   │  status           │   │  product_name*   │    │
//! │  │  price_cents    │   │  total_cents      │   │  unit_price*     │    │
//! │  │  stock          │   │  payment_method   │   │  subtotal_cents  │    │
//! │  └─────────────────┘   └───────────────────┘   └──────────────────┘    │
//! │                                                  * frozen snapshots    │
//! │  ┌───────────────────┐   ┌─────────────────┐   ┌──────────────────┐   │
//! │  │ TransactionStatus │   │  PaymentMethod  │   │    Principal     │   │
//! │  │  ───────────────  │   │  ─────────────  │   │  ──────────────  │   │
//! │  │  Pending          │   │  Cash           │   │  id (i64)        │   │
//! │  │  Paid             │   │  Gateway        │   │  role            │   │
//! │  │  Cancelled        │   └─────────────────┘   └──────────────────┘   │
//! │  └───────────────────┘                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (database-assigned).
    pub id: i64,

    /// Display name. Unique among active products.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Optional category for catalog filtering.
    pub category: Option<String>,

    /// Unit price in cents (smallest currency unit). Never negative.
    pub price_cents: i64,

    /// Current stock level. Never negative.
    pub stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can be reserved from current stock.
    #[inline]
    pub fn can_reserve(&self, quantity: i64) -> bool {
        self.is_active && quantity <= self.stock
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

/// The status of a sale transaction.
///
/// `Paid` and `Cancelled` are terminal: once settled, a transaction admits
/// no further status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Sale recorded, stock reserved, payment not yet settled.
    Pending,
    /// Payment confirmed. Terminal.
    Paid,
    /// Sale cancelled, stock restored. Terminal.
    Cancelled,
}

impl TransactionStatus {
    /// Stable lowercase name, matching the stored representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Paid => "paid",
            TransactionStatus::Cancelled => "cancelled",
        }
    }

    /// Whether this status admits no further transition.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Paid | TransactionStatus::Cancelled)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment, settled at the counter.
    Cash,
    /// External payment gateway (settled asynchronously via notification).
    Gateway,
}

impl PaymentMethod {
    /// Stable lowercase name, matching the stored representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Gateway => "gateway",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A recorded sale.
///
/// The id is an opaque time-derived string (`TRX{millis}{suffix}`), globally
/// unique; a uniqueness violation on insert is a fatal creation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: String,
    /// Principal that created the sale.
    pub user_id: i64,
    /// Authoritative total: sum of line subtotals.
    pub total_cents: i64,
    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    /// Opaque gateway session token, stored for later status polling.
    pub payment_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Transaction Line
// =============================================================================

/// A line item in a transaction.
/// Uses the snapshot pattern to freeze product data at time of sale, so
/// historical records survive later product edits. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionLine {
    pub id: String,
    pub transaction_id: String,
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Quantity sold. Always positive.
    pub quantity: i64,
    /// unit_price × quantity.
    pub subtotal_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl TransactionLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Principal
// =============================================================================

/// Role attached to an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unrestricted: may act on any transaction and manage the catalog.
    Admin,
    /// Restricted: may only read or transition transactions it created.
    Cashier,
}

/// The authenticated caller of a service operation.
///
/// Authentication itself (sessions, tokens) is an upstream concern; services
/// receive an already-resolved principal and enforce the ownership rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub role: Role,
}

impl Principal {
    pub const fn admin(id: i64) -> Self {
        Principal { id, role: Role::Admin }
    }

    pub const fn cashier(id: i64) -> Self {
        Principal { id, role: Role::Cashier }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Ownership rule: admins act on anything, cashiers only on records
    /// they own.
    #[inline]
    pub const fn can_act_on(&self, owner_id: i64) -> bool {
        self.is_admin() || self.id == owner_id
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
