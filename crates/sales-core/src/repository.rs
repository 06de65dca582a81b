//! # Repository Traits
//!
//! Storage capability traits for the three durable entity families.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The checkout orchestrator talks to storage exclusively through these   │
//! │  traits, so the same protocol runs against:                             │
//! │                                                                         │
//! │  InMemoryStore (this crate)      - tests, ephemeral runs                │
//! │  Sqlite*Repository (sales-db)    - production, SQLite                   │
//! │                                                                         │
//! │  The backing store is selected by construction (whoever builds the      │
//! │  CheckoutService decides), never by inheritance.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Contract
//! `find_*` methods report "not found" as `Ok(None)`, never as an error;
//! errors are reserved for storage failures. `SaleRepository::save` is the
//! one place with rich typed failures - see its docs.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{Customer, Product, Sale, SaleSummary};

// =============================================================================
// Product Catalog
// =============================================================================

/// The catalog: owns Product records and authoritative stock levels.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Returns all products currently stored.
    async fn find_all(&self) -> CoreResult<Vec<Product>>;

    /// Finds a product by its unique id.
    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Product>>;

    /// Searches products whose name or manufacturer contains the term,
    /// case-insensitively.
    async fn search(&self, term: &str) -> CoreResult<Vec<Product>>;

    /// Stores a new product and returns it with its assigned id.
    async fn insert(&self, product: &Product) -> CoreResult<Product>;

    /// Sets the stock level for a product to an absolute value.
    ///
    /// This is the only write path for stock outside the sale transaction
    /// (restocking, corrections). The new quantity must be non-negative.
    async fn update_quantity(&self, id: i64, new_quantity: i64) -> CoreResult<()>;
}

// =============================================================================
// Customer Store
// =============================================================================

/// The customer store: identity records, unique by email.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Finds a customer by id.
    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Customer>>;

    /// Finds a customer by email, case-insensitively.
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<Customer>>;

    /// Returns all customers, ordered by name.
    async fn find_all(&self) -> CoreResult<Vec<Customer>>;

    /// Creates the customer if no record with this email exists (matched
    /// case-insensitively); otherwise returns the existing record.
    async fn create_or_get_by_email(&self, name: &str, email: &str) -> CoreResult<Customer>;
}

// =============================================================================
// Sale Store
// =============================================================================

/// The sale store: the persistence boundary for checkout.
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// Durably writes a sale header plus all of its lines, and applies the
    /// stock decrement for every line, as one all-or-nothing unit.
    ///
    /// ## Contract
    /// - Preconditions (checked before any write): the customer has a
    ///   positive id; lines are non-empty; every line has a positive product
    ///   id and a positive quantity.
    /// - The header insert yields the generated sale id; the lines are tied
    ///   to it; each line's stock decrement only applies where the stock
    ///   still covers the quantity. Any violation rolls the whole
    ///   transaction back - the caller never sees a partially-assigned id.
    /// - On success, returns the sale with its id set. The total stays
    ///   derived from the lines.
    ///
    /// ## Not Idempotent - By Design
    /// Calling `save` twice with the same content produces two distinct
    /// persisted sales with different ids. Retry loops must only re-invoke
    /// after a failure outcome.
    async fn save(&self, sale: Sale) -> CoreResult<Sale>;

    /// Returns summaries of the most recent sales, newest first.
    async fn recent_summaries(&self, limit: u32) -> CoreResult<Vec<SaleSummary>>;
}

// =============================================================================
// Save Preconditions
// =============================================================================

/// Checks the [`SaleRepository::save`] preconditions.
///
/// Every store implementation runs this before touching storage, so a
/// violation aborts with no write performed regardless of backend.
pub fn check_sale_preconditions(sale: &Sale) -> CoreResult<()> {
    use crate::error::CoreError;

    if !sale.customer.is_saved() {
        return Err(CoreError::CustomerNotPersisted {
            customer_id: sale.customer.id,
        });
    }

    if sale.lines.is_empty() {
        return Err(CoreError::EmptySale);
    }

    for line in &sale.lines {
        if line.product_id <= 0 {
            return Err(CoreError::InvalidSaleLine {
                product_id: line.product_id,
                reason: "product has no persisted id".to_string(),
            });
        }
        if line.quantity <= 0 {
            return Err(CoreError::InvalidSaleLine {
                product_id: line.product_id,
                reason: format!("quantity must be positive, got {}", line.quantity),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::types::{Customer, Product, Sale};

    fn saved_product() -> Product {
        let mut product = Product::new("Wireless Mouse", "Logitech", 2499, 30);
        product.id = 2;
        product
    }

    #[test]
    fn test_preconditions_accept_valid_sale() {
        let mut sale = Sale::new(Customer::with_id(7, "Ada", "ada@example.com"));
        sale.add_line(&saved_product(), 5);
        assert!(check_sale_preconditions(&sale).is_ok());
    }

    #[test]
    fn test_preconditions_reject_unsaved_customer() {
        let mut sale = Sale::new(Customer::new("Ada", "ada@example.com"));
        sale.add_line(&saved_product(), 5);
        assert!(matches!(
            check_sale_preconditions(&sale),
            Err(CoreError::CustomerNotPersisted { customer_id: 0 })
        ));
    }

    #[test]
    fn test_preconditions_reject_empty_sale() {
        let sale = Sale::new(Customer::with_id(7, "Ada", "ada@example.com"));
        assert!(matches!(
            check_sale_preconditions(&sale),
            Err(CoreError::EmptySale)
        ));
    }

    #[test]
    fn test_preconditions_reject_bad_lines() {
        let mut unsaved = Product::new("Ghost", "Nobody", 100, 1);
        unsaved.id = 0;
        let mut sale = Sale::new(Customer::with_id(7, "Ada", "ada@example.com"));
        sale.add_line(&unsaved, 1);
        assert!(matches!(
            check_sale_preconditions(&sale),
            Err(CoreError::InvalidSaleLine { .. })
        ));
    }
}
