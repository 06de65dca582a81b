//! # Customer Repository
//!
//! Database operations for customer identity records.
//!
//! Email is the business key. The `customers.email` column carries
//! `COLLATE NOCASE UNIQUE`, so the database itself refuses duplicates that
//! differ only in case; the queries here lean on the same collation for
//! lookups.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use async_trait::async_trait;
use sales_core::error::CoreResult;
use sales_core::repository::CustomerRepository;
use sales_core::types::Customer;
use sales_core::validation::{validate_customer_name, validate_email};

use crate::error::DbError;

/// SQLite-backed customer store.
#[derive(Debug, Clone)]
pub struct SqliteCustomerRepository {
    pool: SqlitePool,
}

impl SqliteCustomerRepository {
    /// Creates a new repository over the shared pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteCustomerRepository { pool }
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Option<Customer>, DbError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, email FROM customers WHERE email = ?1 COLLATE NOCASE",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }
}

#[async_trait]
impl CustomerRepository for SqliteCustomerRepository {
    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, email FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(customer)
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<Customer>> {
        Ok(self.fetch_by_email(email).await?)
    }

    async fn find_all(&self) -> CoreResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id, name, email FROM customers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(customers)
    }

    async fn create_or_get_by_email(&self, name: &str, email: &str) -> CoreResult<Customer> {
        validate_customer_name(name)?;
        validate_email(email)?;

        // Read first: the common case is a returning customer.
        if let Some(existing) = self.fetch_by_email(email).await? {
            return Ok(existing);
        }

        debug!(email = %email, "creating customer");

        let insert = sqlx::query(
            "INSERT INTO customers (name, email, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(name.trim())
        .bind(email.trim())
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        match insert {
            Ok(result) => Ok(Customer::with_id(
                result.last_insert_rowid(),
                name.trim(),
                email.trim(),
            )),
            // Someone inserted the same email between our read and write;
            // the UNIQUE index caught it, so the record now exists.
            Err(err) => match DbError::from(err) {
                DbError::UniqueViolation { .. } => {
                    let existing = self.fetch_by_email(email).await?;
                    existing.ok_or_else(|| {
                        DbError::not_found("customer", email.trim()).into()
                    })
                }
                other => Err(other.into()),
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
