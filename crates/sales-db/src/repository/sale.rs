//! # Sale Repository
//!
//! The persistence boundary for checkout: the sale transaction and the
//! report summaries over persisted sales.
//!
//! ## The Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      save(sale) - one transaction                       │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   │                                                                     │
//! │   ├─ INSERT sale header ──► exactly 1 row? id generated?                │
//! │   │                          no → ROLLBACK                              │
//! │   │                                                                     │
//! │   ├─ INSERT every line, tied to the generated id                        │
//! │   │                          0 rows → ROLLBACK                          │
//! │   │                                                                     │
//! │   ├─ UPDATE stock per line:                                             │
//! │   │      SET quantity_in_stock = quantity_in_stock - qty                │
//! │   │      WHERE id = ? AND quantity_in_stock >= qty                      │
//! │   │                          0 rows → ROLLBACK (short or missing)       │
//! │   │                                                                     │
//! │  COMMIT ──► sale.id assigned, exactly once                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional `WHERE quantity_in_stock >= qty` is what makes overselling
//! impossible even when the orchestrator's validation pass raced a concurrent
//! write: the decrement simply matches no row and the whole sale rolls back.
//!
//! Rollback is the drop path: any early return before `commit()` drops the
//! transaction guard, and sqlx rolls it back.

use sqlx::SqlitePool;
use tracing::{debug, info};

use async_trait::async_trait;
use sales_core::error::{CoreError, CoreResult};
use sales_core::repository::{check_sale_preconditions, SaleRepository};
use sales_core::types::{Sale, SaleSummary};

use crate::error::DbError;

/// SQLite-backed sale store.
#[derive(Debug, Clone)]
pub struct SqliteSaleRepository {
    pool: SqlitePool,
}

impl SqliteSaleRepository {
    /// Creates a new repository over the shared pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteSaleRepository { pool }
    }
}

#[async_trait]
impl SaleRepository for SqliteSaleRepository {
    async fn save(&self, mut sale: Sale) -> CoreResult<Sale> {
        // Preconditions run before any write; a violation means the
        // transaction below is never even opened.
        check_sale_preconditions(&sale)?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        // Sale header first: it produces the generated id everything else
        // hangs off.
        let header = sqlx::query("INSERT INTO sales (customer_id, created_at) VALUES (?1, ?2)")
            .bind(sale.customer.id)
            .bind(sale.created_at)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        if header.rows_affected() != 1 {
            return Err(CoreError::Persistence(format!(
                "sale header insert affected {} rows",
                header.rows_affected()
            )));
        }

        let sale_id = header.last_insert_rowid();
        if sale_id <= 0 {
            return Err(CoreError::Persistence(
                "sale header insert produced no identifier".to_string(),
            ));
        }

        debug!(sale_id, lines = sale.lines.len(), "inserting sale lines");

        // All lines, tied to the generated header id.
        let mut lines_written: u64 = 0;
        for line in &sale.lines {
            let result = sqlx::query(
                "INSERT INTO sale_lines (sale_id, product_id, product_name, quantity, \
                 unit_price_cents, line_total_cents) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.line_total_cents())
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            lines_written += result.rows_affected();
        }

        if lines_written == 0 {
            return Err(CoreError::Persistence(
                "sale line insert affected no rows".to_string(),
            ));
        }

        // Inventory decrement, still inside the transaction. The conditional
        // WHERE clause refuses to go below zero; a miss means the stock can
        // no longer cover this sale and everything above rolls back.
        for line in &sale.lines {
            let result = sqlx::query(
                "UPDATE products \
                 SET quantity_in_stock = quantity_in_stock - ?2, updated_at = ?3 \
                 WHERE id = ?1 AND quantity_in_stock >= ?2",
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(chrono::Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            if result.rows_affected() == 0 {
                // Distinguish "gone" from "short" for the caller; the read
                // happens inside the open transaction, so it is consistent
                // with what the decrement saw.
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT quantity_in_stock FROM products WHERE id = ?1")
                        .bind(line.product_id)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(DbError::from)?;

                return Err(match available {
                    None => CoreError::ProductMissing {
                        product_id: line.product_id,
                    },
                    Some(available) => CoreError::InsufficientStock {
                        product_id: line.product_id,
                        name: line.product_name.clone(),
                        requested: line.quantity,
                        available,
                    },
                });
            }
        }

        tx.commit().await.map_err(DbError::from)?;

        sale.id = sale_id;
        info!(
            sale_id,
            customer_id = sale.customer.id,
            total_cents = sale.total_cents(),
            "sale committed"
        );

        Ok(sale)
    }

    async fn recent_summaries(&self, limit: u32) -> CoreResult<Vec<SaleSummary>> {
        // The total is derived here, never read from a stored column, so it
        // recomputes identically from the lines on every call.
        let summaries = sqlx::query_as::<_, SaleSummary>(
            "SELECT s.id AS sale_id, \
                    s.created_at AS created_at, \
                    c.name AS customer_name, \
                    c.email AS customer_email, \
                    SUM(l.line_total_cents) AS total_cents \
             FROM sales s \
             JOIN customers c ON c.id = s.customer_id \
             JOIN sale_lines l ON l.sale_id = s.id \
             GROUP BY s.id, s.created_at, c.name, c.email \
             ORDER BY s.created_at DESC, s.id DESC \
             LIMIT ?1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(summaries)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use sales_core::repository::{CustomerRepository, ProductRepository};
    use sales_core::types::{Customer, Product};

    /// Fresh in-memory database with two catalog products and one customer.
    async fn setup() -> (Database, Product, Product, Customer) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mouse = db
            .products()
            .insert(&Product::new("Wireless Mouse", "Logitech", 2499, 30))
            .await
            .unwrap();
        let keyboard = db
            .products()
            .insert(&Product::new("Mechanical Keyboard", "Keychron", 3999, 20))
            .await
            .unwrap();
        let customer = db
            .customers()
            .create_or_get_by_email("Ada Lovelace", "ada@example.com")
            .await
            .unwrap();

        (db, mouse, keyboard, customer)
    }

    async fn stock_of(db: &Database, id: i64) -> i64 {
        db.products()
            .find_by_id(id)
            .await
            .unwrap()
            .unwrap()
            .quantity_in_stock
    }

    #[tokio::test]
    async fn test_save_commits_header_lines_and_stock_together() {
        let (db, mouse, keyboard, customer) = setup().await;

        let mut sale = Sale::new(customer);
        sale.add_line(&mouse, 5);
        sale.add_line(&keyboard, 2);

        let saved = db.sales().save(sale).await.unwrap();

        assert!(saved.id > 0);
        assert_eq!(saved.total_cents(), 20493); // $204.93

        assert_eq!(stock_of(&db, mouse.id).await, 25);
        assert_eq!(stock_of(&db, keyboard.id).await, 18);

        // The derived total recomputes identically after reload.
        let summaries = db.sales().recent_summaries(10).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].sale_id, saved.id);
        assert_eq!(summaries[0].total_cents, 20493);
        assert_eq!(summaries[0].customer_email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_save_is_not_idempotent() {
        let (db, mouse, _, customer) = setup().await;

        let mut sale = Sale::new(customer);
        sale.add_line(&mouse, 1);

        let first = db.sales().save(sale.clone()).await.unwrap();
        let second = db.sales().save(sale).await.unwrap();

        // Two distinct persisted sales, two distinct ids, two decrements.
        assert_ne!(first.id, second.id);
        assert_eq!(db.sales().recent_summaries(10).await.unwrap().len(), 2);
        assert_eq!(stock_of(&db, mouse.id).await, 28);
    }

    #[tokio::test]
    async fn test_save_rejects_unsaved_customer_with_no_writes() {
        let (db, mouse, _, _) = setup().await;

        let mut sale = Sale::new(Customer::new("Walk In", "walkin@example.com"));
        sale.add_line(&mouse, 5);

        let err = db.sales().save(sale).await.unwrap_err();
        assert!(matches!(err, CoreError::CustomerNotPersisted { .. }));

        assert_eq!(stock_of(&db, mouse.id).await, 30);
        assert!(db.sales().recent_summaries(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_rejects_empty_sale() {
        let (db, _, _, customer) = setup().await;

        let sale = Sale::new(customer);
        let err = db.sales().save(sale).await.unwrap_err();
        assert!(matches!(err, CoreError::EmptySale));
    }

    #[tokio::test]
    async fn test_short_stock_rolls_back_the_whole_sale() {
        let (db, mouse, keyboard, customer) = setup().await;

        let mut sale = Sale::new(customer);
        sale.add_line(&mouse, 5); // coverable
        sale.add_line(&keyboard, 100); // only 20 in stock

        let err = db.sales().save(sale).await.unwrap_err();
        match err {
            CoreError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 100);
                assert_eq!(available, 20);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // Nothing survived the rollback: no sale, no lines, no decrement -
        // including the coverable first line.
        assert_eq!(stock_of(&db, mouse.id).await, 30);
        assert_eq!(stock_of(&db, keyboard.id).await, 20);
        assert!(db.sales().recent_summaries(10).await.unwrap().is_empty());

        let line_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_lines")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(line_count, 0);
    }

    #[tokio::test]
    async fn test_vanished_product_rolls_back_as_missing() {
        let (db, mouse, _, customer) = setup().await;

        let mut ghost = Product::new("Discontinued Webcam", "Acme", 1500, 10);
        ghost.id = 99;

        let mut sale = Sale::new(customer);
        sale.add_line(&mouse, 1);
        sale.add_line(&ghost, 1);

        let err = db.sales().save(sale).await.unwrap_err();
        // The line insert trips the foreign key before the decrement runs;
        // either way the transaction must roll back completely.
        assert!(matches!(
            err,
            CoreError::ProductMissing { .. } | CoreError::Persistence(_)
        ));

        assert_eq!(stock_of(&db, mouse.id).await, 30);
        assert!(db.sales().recent_summaries(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exact_stock_boundary_drains_to_zero() {
        let (db, _, keyboard, customer) = setup().await;

        let mut sale = Sale::new(customer);
        sale.add_line(&keyboard, 20);

        db.sales().save(sale).await.unwrap();
        assert_eq!(stock_of(&db, keyboard.id).await, 0);
    }

    #[tokio::test]
    async fn test_recent_summaries_orders_newest_first_and_limits() {
        let (db, mouse, _, customer) = setup().await;

        let mut ids = Vec::new();
        for qty in 1..=3 {
            let mut sale = Sale::new(customer.clone());
            sale.add_line(&mouse, qty);
            ids.push(db.sales().save(sale).await.unwrap().id);
        }

        let summaries = db.sales().recent_summaries(2).await.unwrap();
        assert_eq!(summaries.len(), 2);
        // Newest first: the last-created sale leads.
        assert_eq!(summaries[0].sale_id, ids[2]);
        assert_eq!(summaries[1].sale_id, ids[1]);
        assert_eq!(summaries[0].total_cents, 3 * 2499);
    }
}
