//! # Inventory Reservation Calculator
//!
//! Pure validation and pricing for a prospective sale.
//!
//! ## Where This Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sale Creation Data Flow                              │
//! │                                                                         │
//! │  Caller request: [{product_id, qty}, ...] + declared total              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  kiosk-sales: open unit of work, load each product row                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  plan_reservation()  ← THIS MODULE (pure, no I/O)                       │
//! │    • product active? stock sufficient? quantity sane?                   │
//! │    • subtotal = current price × qty (caller prices are never trusted)   │
//! │    • computed total vs declared total within 1 cent                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  kiosk-sales: conditional stock decrements + inserts, commit            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All-or-nothing: the first failing line aborts the whole plan; the caller
//! rolls back the enclosing unit of work, so no partial decrement is ever
//! observable.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::{MAX_LINE_QUANTITY, MAX_SALE_LINES, TOTAL_EPSILON_CENTS};

// =============================================================================
// Request / Plan Types
// =============================================================================

/// One requested line of a candidate sale: which product, how many.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LineRequest {
    pub product_id: i64,
    pub quantity: i64,
}

/// A validated line, ready for persistence: the frozen product snapshot
/// plus the computed subtotal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservedLine {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub subtotal_cents: i64,
}

/// The outcome of a successful reservation plan.
#[derive(Debug, Clone)]
pub struct ReservationPlan {
    pub lines: Vec<ReservedLine>,
    /// Authoritative total: sum of line subtotals.
    pub total_cents: i64,
}

// =============================================================================
// Planning
// =============================================================================

/// Validates a candidate sale against current product state and prices it.
///
/// `resolved` pairs each requested quantity with the product row the caller
/// loaded inside the enclosing unit of work, in request order. Lookup
/// misses never reach this function; an inactive row still fails here with
/// [`CoreError::ProductNotFound`] so a deactivated product can't be sold
/// through a stale id.
///
/// ## Failure Modes
/// - `ProductNotFound` — product is inactive
/// - `Validation` — quantity not in 1..=MAX_LINE_QUANTITY, or too many lines
/// - `InsufficientStock` — quantity exceeds current stock
/// - `TotalMismatch` — declared total off by more than [`TOTAL_EPSILON_CENTS`]
pub fn plan_reservation(
    resolved: &[(Product, i64)],
    declared_total_cents: i64,
) -> CoreResult<ReservationPlan> {
    if resolved.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        }
        .into());
    }

    if resolved.len() > MAX_SALE_LINES {
        return Err(ValidationError::TooManyEntries {
            field: "items".to_string(),
            max: MAX_SALE_LINES,
        }
        .into());
    }

    let mut lines = Vec::with_capacity(resolved.len());
    let mut computed_total = Money::zero();

    for (product, quantity) in resolved {
        let quantity = *quantity;

        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if quantity > MAX_LINE_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: MAX_LINE_QUANTITY,
            }
            .into());
        }

        if !product.is_active {
            return Err(CoreError::ProductNotFound(product.id));
        }

        if quantity > product.stock {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.stock,
                requested: quantity,
            });
        }

        // Price from the product row, never from the caller.
        let subtotal = product.price().multiply_quantity(quantity);
        computed_total += subtotal;

        lines.push(ReservedLine {
            product_id: product.id,
            product_name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
            subtotal_cents: subtotal.cents(),
        });
    }

    let declared = Money::from_cents(declared_total_cents);
    if computed_total.difference_cents(declared) > TOTAL_EPSILON_CENTS {
        return Err(CoreError::TotalMismatch {
            computed_cents: computed_total.cents(),
            declared_cents: declared_total_cents,
        });
    }

    Ok(ReservationPlan {
        lines,
        total_cents: computed_total.cents(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: i64, name: &str, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id,
            name: name.to_string(),
            description: None,
            category: None,
            price_cents,
            stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_plan_computes_snapshots_and_total() {
        let resolved = vec![
            (product(1, "Kopi Susu", 1000, 5), 3),
            (product(2, "Teh Manis", 500, 10), 2),
        ];

        let plan = plan_reservation(&resolved, 4000).unwrap();

        assert_eq!(plan.total_cents, 4000);
        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].product_name, "Kopi Susu");
        assert_eq!(plan.lines[0].unit_price_cents, 1000);
        assert_eq!(plan.lines[0].subtotal_cents, 3000);
        assert_eq!(plan.lines[1].subtotal_cents, 1000);
    }

    #[test]
    fn test_declared_total_within_epsilon_accepted() {
        let resolved = vec![(product(1, "Kopi Susu", 1000, 5), 3)];

        // One cent off: tolerated (stale rounding on the client side).
        assert!(plan_reservation(&resolved, 3001).is_ok());
        // Authoritative total is still the computed one.
        let plan = plan_reservation(&resolved, 3001).unwrap();
        assert_eq!(plan.total_cents, 3000);
    }

    #[test]
    fn test_total_mismatch_rejected() {
        let resolved = vec![(product(1, "Kopi Susu", 1000, 5), 3)];

        let err = plan_reservation(&resolved, 2998).unwrap_err();
        assert!(matches!(
            err,
            CoreError::TotalMismatch {
                computed_cents: 3000,
                declared_cents: 2998,
            }
        ));
    }

    #[test]
    fn test_insufficient_stock() {
        let resolved = vec![(product(1, "Kopi Susu", 1000, 2), 3)];

        let err = plan_reservation(&resolved, 3000).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                name,
                available,
                requested,
            } => {
                assert_eq!(name, "Kopi Susu");
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_inactive_product_rejected() {
        let mut p = product(9, "Gone", 100, 10);
        p.is_active = false;

        let err = plan_reservation(&[(p, 1)], 100).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(9)));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let resolved = vec![(product(1, "Kopi Susu", 1000, 5), 0)];
        assert!(matches!(
            plan_reservation(&resolved, 0).unwrap_err(),
            CoreError::Validation(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_empty_request_rejected() {
        assert!(matches!(
            plan_reservation(&[], 0).unwrap_err(),
            CoreError::Validation(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_failure_is_all_or_nothing() {
        // Second line fails: no plan is produced at all.
        let resolved = vec![
            (product(1, "Kopi Susu", 1000, 5), 2),
            (product(2, "Teh Manis", 500, 1), 4),
        ];
        assert!(plan_reservation(&resolved, 4000).is_err());
    }
}
