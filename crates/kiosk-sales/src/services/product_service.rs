//! # Product Service
//!
//! Catalog management: create, update, list, and the two-tier delete
//! policy (hard delete only while nothing references the product).
//!
//! Catalog writes are admin-only; reads are open to any principal.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kiosk_core::validation::{
    validate_optional_text, validate_price_cents, validate_product_name, validate_stock,
};
use kiosk_core::{CoreError, Principal, Product};
use kiosk_db::{Database, NewProduct, ProductFilter};

use crate::error::{ServiceError, ServiceResult};

// =============================================================================
// Request Types
// =============================================================================

/// Inbound create-product request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
}

/// Inbound update-product request. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    /// Absolute stock edit (receiving goods, stocktake correction).
    pub stock: Option<i64>,
}

/// What delete_product actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// No transaction line references the product: the row is gone.
    Deleted,
    /// Historical lines reference it: deactivated, row kept.
    Deactivated,
}

// =============================================================================
// Service
// =============================================================================

/// Catalog management operations.
#[derive(Debug, Clone)]
pub struct ProductService {
    db: Database,
}

impl ProductService {
    /// Creates a new ProductService over a database handle.
    pub fn new(db: Database) -> Self {
        ProductService { db }
    }

    /// Creates a product. Admin only.
    ///
    /// ## Errors
    /// * `ACCESS_DENIED` - caller is not an admin
    /// * `DUPLICATE_IDENTIFIER` - an active product already uses this name
    /// * `VALIDATION_ERROR` - bad name/price/stock
    pub async fn create_product(
        &self,
        principal: &Principal,
        request: &CreateProductRequest,
    ) -> ServiceResult<Product> {
        self.require_admin(principal)?;

        validate_product_name(&request.name).map_err(CoreError::from)?;
        validate_price_cents(request.price_cents).map_err(CoreError::from)?;
        validate_stock(request.stock).map_err(CoreError::from)?;
        validate_optional_text("description", request.description.as_deref(), 1000)
            .map_err(CoreError::from)?;

        // Friendly pre-check; the partial unique index still catches races.
        if let Some(existing) = self.db.products().find_active_by_name(&request.name).await? {
            return Err(CoreError::duplicate("product name", existing.name).into());
        }

        let product = self
            .db
            .products()
            .insert(&NewProduct {
                name: request.name.trim().to_string(),
                description: request.description.clone(),
                category: request.category.clone(),
                price_cents: request.price_cents,
                stock: request.stock,
            })
            .await?;

        info!(id = product.id, name = %product.name, "Product created");

        Ok(product)
    }

    /// Updates a product (including absolute stock edits). Admin only.
    pub async fn update_product(
        &self,
        principal: &Principal,
        id: i64,
        request: &UpdateProductRequest,
    ) -> ServiceResult<Product> {
        self.require_admin(principal)?;
        debug!(id, "update_product");

        let mut product = self
            .db
            .products()
            .get_active_by_id(id)
            .await?
            .ok_or(CoreError::ProductNotFound(id))?;

        if let Some(name) = &request.name {
            validate_product_name(name).map_err(CoreError::from)?;

            // Renaming onto another active product's name is a collision.
            if name != &product.name {
                if let Some(conflict) = self.db.products().find_active_by_name(name).await? {
                    if conflict.id != id {
                        return Err(CoreError::duplicate("product name", conflict.name).into());
                    }
                }
            }
            product.name = name.trim().to_string();
        }

        if let Some(description) = &request.description {
            validate_optional_text("description", Some(description), 1000)
                .map_err(CoreError::from)?;
            product.description = Some(description.clone());
        }

        if let Some(category) = &request.category {
            product.category = Some(category.clone());
        }

        if let Some(price_cents) = request.price_cents {
            validate_price_cents(price_cents).map_err(CoreError::from)?;
            product.price_cents = price_cents;
        }

        if let Some(stock) = request.stock {
            validate_stock(stock).map_err(CoreError::from)?;
            product.stock = stock;
        }

        self.db.products().update(&product).await?;

        info!(id, name = %product.name, "Product updated");

        Ok(product)
    }

    /// Deletes a product. Admin only.
    ///
    /// Products referenced by historical transaction lines are only
    /// deactivated so those lines keep resolving; unreferenced products
    /// are removed outright.
    pub async fn delete_product(
        &self,
        principal: &Principal,
        id: i64,
    ) -> ServiceResult<DeleteOutcome> {
        self.require_admin(principal)?;
        debug!(id, "delete_product");

        let product = self
            .db
            .products()
            .get_active_by_id(id)
            .await?
            .ok_or(CoreError::ProductNotFound(id))?;

        let outcome = if self.db.products().is_referenced_by_lines(id).await? {
            self.db.products().soft_delete(id).await?;
            DeleteOutcome::Deactivated
        } else {
            self.db.products().hard_delete(id).await?;
            DeleteOutcome::Deleted
        };

        info!(id, name = %product.name, ?outcome, "Product deleted");

        Ok(outcome)
    }

    /// Gets an active product by id.
    pub async fn get_product(&self, id: i64) -> ServiceResult<Product> {
        self.db
            .products()
            .get_active_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id).into())
    }

    /// Lists active products with optional filters.
    pub async fn list_products(&self, filter: &ProductFilter) -> ServiceResult<Vec<Product>> {
        Ok(self.db.products().list(filter).await?)
    }

    fn require_admin(&self, principal: &Principal) -> ServiceResult<()> {
        if principal.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::access_denied())
        }
    }
}
