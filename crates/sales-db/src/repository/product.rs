//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Case-insensitive search over name and manufacturer
//! - Lookup by id (the authoritative read checkout depends on)
//! - Absolute stock updates (restocking, corrections)
//!
//! The stock *decrement* at sale time is deliberately NOT here - it lives
//! inside the sale transaction in [`crate::repository::sale`] so it can
//! commit or roll back together with the sale lines.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use async_trait::async_trait;
use sales_core::error::{CoreError, CoreResult, ValidationError};
use sales_core::repository::ProductRepository;
use sales_core::types::Product;
use sales_core::validation::{validate_price_cents, validate_product_name};

use crate::error::DbError;

/// SQLite-backed product catalog.
#[derive(Debug, Clone)]
pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    /// Creates a new repository over the shared pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteProductRepository { pool }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, manufacturer, price_cents, quantity_in_stock";

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    async fn find_all(&self) -> CoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(products)
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(product)
    }

    async fn search(&self, term: &str) -> CoreResult<Vec<Product>> {
        let pattern = format!("%{}%", term.trim().to_lowercase());

        debug!(term = %term, "searching products");

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE LOWER(name) LIKE ?1 OR LOWER(manufacturer) LIKE ?1 \
             ORDER BY name"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        debug!(count = products.len(), "search returned products");
        Ok(products)
    }

    async fn insert(&self, product: &Product) -> CoreResult<Product> {
        validate_product_name(&product.name)?;
        validate_price_cents(product.price_cents)?;

        debug!(name = %product.name, "inserting product");

        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO products (name, manufacturer, price_cents, quantity_in_stock, \
             created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        )
        .bind(product.name.trim())
        .bind(product.manufacturer.trim())
        .bind(product.price_cents)
        .bind(product.quantity_in_stock)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        let mut saved = product.clone();
        saved.id = result.last_insert_rowid();
        Ok(saved)
    }

    async fn update_quantity(&self, id: i64, new_quantity: i64) -> CoreResult<()> {
        if new_quantity < 0 {
            return Err(CoreError::Validation(ValidationError::OutOfRange {
                field: "quantity_in_stock".to_string(),
                min: 0,
                max: i64::MAX,
            }));
        }

        debug!(id, new_quantity, "updating stock");

        let result = sqlx::query(
            "UPDATE products SET quantity_in_stock = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(new_quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductMissing { product_id: id });
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
