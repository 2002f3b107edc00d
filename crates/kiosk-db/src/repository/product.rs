//! # Product Repository
//!
//! Database operations for the product catalog and its stock counter.
//!
//! ## Stock Mutation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read-then-write outside a transaction                        │
//! │     let p = get(id); update(stock = p.stock - qty)                      │
//! │     Two concurrent sales of the last unit both succeed.                 │
//! │                                                                         │
//! │  ✅ CORRECT: conditional decrement inside the caller's transaction      │
//! │     UPDATE products SET stock = stock - ?2                              │
//! │     WHERE id = ?1 AND stock >= ?2                                       │
//! │                                                                         │
//! │  rows_affected = 0 means a concurrent reservation won the race;         │
//! │  the caller rolls back the whole unit of work.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional statements live as module-level functions taking a
//! `&mut SqliteConnection`: they are only meaningful inside a unit of work
//! the caller owns (see `Database::begin`).

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kiosk_core::Product;

// =============================================================================
// Inputs
// =============================================================================

/// Fields for a new catalog entry. The id is database-assigned.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
}

/// Catalog listing filter.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Substring match against name or description.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

const SELECT_COLUMNS: &str =
    "id, name, description, category, price_cents, stock, is_active, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID (active or not).
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets an active product by its ID.
    pub async fn get_active_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1 AND is_active = 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Finds an active product by exact name (names are unique among
    /// active products).
    pub async fn find_active_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE name = ?1 AND is_active = 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products with optional category/search filters.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM products WHERE is_active = 1");

        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if filter.search.is_some() {
            sql.push_str(" AND (name LIKE ? OR description LIKE ?)");
        }
        sql.push_str(" ORDER BY name LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, Product>(&sql);
        if let Some(category) = &filter.category {
            query = query.bind(category.clone());
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            query = query.bind(pattern.clone()).bind(pattern);
        }
        query = query
            .bind(filter.limit.unwrap_or(100).max(1))
            .bind(filter.offset.unwrap_or(0).max(0));

        let products = query.fetch_all(&self.pool).await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Inserts a new product and returns it with the assigned id.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - an active product with this name exists
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        debug!(name = %new.name, "Inserting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, description, category, price_cents, stock,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.category)
        .bind(new.price_cents)
        .bind(new.stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            name: new.name.clone(),
            description: new.description.clone(),
            category: new.category.clone(),
            price_cents: new.price_cents,
            stock: new.stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Updates an existing product (full row, including an absolute stock
    /// edit).
    ///
    /// ## Errors
    /// * `DbError::NotFound` - product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                category = ?4,
                price_cents = ?5,
                stock = ?6,
                is_active = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Used when the product is referenced by historical transaction lines:
    /// the rows must keep resolving, so the product only disappears from
    /// the catalog.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Soft-deleting product");

        let now = Utc::now();

        let result =
            sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Hard-deletes a product. Only legal when no transaction line
    /// references it; the foreign key enforces that as a backstop.
    pub async fn hard_delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Hard-deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Checks whether any transaction line references this product.
    pub async fn is_referenced_by_lines(&self, id: i64) -> DbResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transaction_lines WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Counts active products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit-of-Work Operations
// =============================================================================
// These run inside a caller-owned database transaction; they take the
// connection explicitly instead of the pool.

/// Reads a product row inside the caller's transaction (active or not -
/// the reservation calculator decides what an inactive row means).
pub async fn find_for_reservation(
    conn: &mut SqliteConnection,
    id: i64,
) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(product)
}

/// Conditionally decrements stock inside the caller's transaction.
///
/// Returns `false` when the guard failed (stock below the requested
/// quantity at execution time): a concurrent reservation won the race and
/// the caller must roll back.
pub async fn decrement_stock(conn: &mut SqliteConnection, id: i64, qty: i64) -> DbResult<bool> {
    debug!(id, qty, "Decrementing stock");

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND is_active = 1 AND stock >= ?2
        "#,
    )
    .bind(id)
    .bind(qty)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Increments stock inside the caller's transaction (cancellation
/// reversal).
///
/// The product row must exist: lines only ever reference products that are
/// at most soft-deactivated.
pub async fn increment_stock(conn: &mut SqliteConnection, id: i64, qty: i64) -> DbResult<()> {
    debug!(id, qty, "Restoring stock");

    let now = Utc::now();

    let result = sqlx::query("UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1")
        .bind(id)
        .bind(qty)
        .bind(now)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", id));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
