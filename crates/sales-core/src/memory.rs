//! # In-Memory Stores
//!
//! In-memory implementations of the repository traits, backed by one shared
//! state behind a mutex.
//!
//! ## Why Shared State?
//! The sale transaction touches two entity families at once: it writes the
//! sale and decrements product stock, all-or-nothing. Holding products,
//! customers, and sales behind one mutex gives the in-memory save the same
//! atomicity the SQLite implementation gets from a database transaction -
//! validate every line under the lock, then apply every effect under the
//! same lock, with no interleaving in between.
//!
//! ## Id Assignment
//! Each [`InMemoryStore`] carries its own monotonically increasing counters,
//! mirroring how the database assigns rowids. The counters are scoped to the
//! instance - two stores never share id sequences, and nothing here is a
//! process-wide singleton.
//!
//! ## Usage
//! The store hands out per-trait repository handles, the same shape the
//! SQLite `Database` uses:
//!
//! ```rust
//! use sales_core::InMemoryStore;
//!
//! let store = InMemoryStore::new();
//! let catalog = store.products();   // impl ProductRepository
//! let customers = store.customers(); // impl CustomerRepository
//! let sales = store.sales();         // impl SaleRepository
//! ```
//!
//! Intended for tests and ephemeral runs; production uses sales-db.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::repository::{
    check_sale_preconditions, CustomerRepository, ProductRepository, SaleRepository,
};
use crate::types::{Customer, Product, Sale, SaleSummary};
use crate::validation::{
    validate_customer_name, validate_email, validate_price_cents, validate_product_name,
};

#[derive(Debug, Default)]
struct StoreInner {
    products: Vec<Product>,
    customers: Vec<Customer>,
    sales: Vec<Sale>,
    next_product_id: i64,
    next_customer_id: i64,
    next_sale_id: i64,
}

impl StoreInner {
    fn product(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn product_mut(&mut self, id: i64) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    fn customer_by_email(&self, email: &str) -> Option<&Customer> {
        let needle = email.trim().to_lowercase();
        self.customers
            .iter()
            .find(|c| c.email.to_lowercase() == needle)
    }
}

type SharedInner = Arc<Mutex<StoreInner>>;

fn lock(inner: &SharedInner) -> MutexGuard<'_, StoreInner> {
    inner.lock().expect("store mutex poisoned")
}

/// In-memory backing store handing out per-trait repository handles.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: SharedInner,
}

impl InMemoryStore {
    /// Creates a new empty store with fresh id counters.
    pub fn new() -> Self {
        InMemoryStore {
            inner: Arc::new(Mutex::new(StoreInner::default())),
        }
    }

    /// Returns the product repository (the catalog).
    pub fn products(&self) -> InMemoryProductRepository {
        InMemoryProductRepository {
            inner: self.inner.clone(),
        }
    }

    /// Returns the customer repository.
    pub fn customers(&self) -> InMemoryCustomerRepository {
        InMemoryCustomerRepository {
            inner: self.inner.clone(),
        }
    }

    /// Returns the sale repository.
    pub fn sales(&self) -> InMemorySaleRepository {
        InMemorySaleRepository {
            inner: self.inner.clone(),
        }
    }

    /// Rewrites a product's price in place, bypassing the "prices are
    /// immutable" rule. Lets tests simulate a catalog change landing
    /// between cart-add and checkout.
    #[cfg(test)]
    pub(crate) fn replace_price_for_test(&self, id: i64, price_cents: i64) -> CoreResult<()> {
        let mut inner = lock(&self.inner);
        let product = inner
            .product_mut(id)
            .ok_or(CoreError::ProductMissing { product_id: id })?;
        product.price_cents = price_cents;
        Ok(())
    }
}

// =============================================================================
// Product Catalog
// =============================================================================

/// In-memory catalog handle. Clones share the same backing store.
#[derive(Debug, Clone)]
pub struct InMemoryProductRepository {
    inner: SharedInner,
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_all(&self) -> CoreResult<Vec<Product>> {
        Ok(lock(&self.inner).products.clone())
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Product>> {
        Ok(lock(&self.inner).product(id).cloned())
    }

    async fn search(&self, term: &str) -> CoreResult<Vec<Product>> {
        let needle = term.trim().to_lowercase();
        Ok(lock(&self.inner)
            .products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.manufacturer.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, product: &Product) -> CoreResult<Product> {
        validate_product_name(&product.name)?;
        validate_price_cents(product.price_cents)?;

        let mut inner = lock(&self.inner);
        inner.next_product_id += 1;

        let mut saved = product.clone();
        saved.id = inner.next_product_id;
        inner.products.push(saved.clone());
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

        let mut inner = lock(&self.inner);
        let product = inner
            .product_mut(id)
            .ok_or(CoreError::ProductMissing { product_id: id })?;
        product.quantity_in_stock = new_quantity;
        Ok(())
    }
}

// =============================================================================
// Customer Store
// =============================================================================

/// In-memory customer store handle.
#[derive(Debug, Clone)]
pub struct InMemoryCustomerRepository {
    inner: SharedInner,
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn find_by_id(&self, id: i64) -> CoreResult<Option<Customer>> {
        Ok(lock(&self.inner)
            .customers
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<Customer>> {
        Ok(lock(&self.inner).customer_by_email(email).cloned())
    }

    async fn find_all(&self) -> CoreResult<Vec<Customer>> {
        let mut customers = lock(&self.inner).customers.clone();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn create_or_get_by_email(&self, name: &str, email: &str) -> CoreResult<Customer> {
        validate_customer_name(name)?;
        validate_email(email)?;

        let mut inner = lock(&self.inner);

        if let Some(existing) = inner.customer_by_email(email) {
            return Ok(existing.clone());
        }

        inner.next_customer_id += 1;
        let customer = Customer::with_id(inner.next_customer_id, name.trim(), email.trim());
        inner.customers.push(customer.clone());
        Ok(customer)
    }
}

// =============================================================================
// Sale Store
// =============================================================================

/// In-memory sale store handle.
#[derive(Debug, Clone)]
pub struct InMemorySaleRepository {
    inner: SharedInner,
}

#[async_trait]
impl SaleRepository for InMemorySaleRepository {
    async fn save(&self, mut sale: Sale) -> CoreResult<Sale> {
        check_sale_preconditions(&sale)?;

        let mut inner = lock(&self.inner);

        // Validate every line before applying any effect, so a failure on a
        // later line leaves earlier lines (and their stock) untouched.
        for line in &sale.lines {
            let product = inner
                .product(line.product_id)
                .ok_or(CoreError::ProductMissing {
                    product_id: line.product_id,
                })?;
            if !product.can_fill(line.quantity) {
                return Err(CoreError::InsufficientStock {
                    product_id: product.id,
                    name: product.name.clone(),
                    requested: line.quantity,
                    available: product.quantity_in_stock,
                });
            }
        }

        // All lines check out; apply the decrements and record the sale,
        // still under the same lock, so nothing can interleave.
        for line in &sale.lines {
            if let Some(product) = inner.product_mut(line.product_id) {
                product.quantity_in_stock -= line.quantity;
            }
        }

        inner.next_sale_id += 1;
        sale.id = inner.next_sale_id;
        inner.sales.push(sale.clone());
        Ok(sale)
    }

    async fn recent_summaries(&self, limit: u32) -> CoreResult<Vec<SaleSummary>> {
        let inner = lock(&self.inner);

        let mut ordered: Vec<&Sale> = inner.sales.iter().collect();
        // Newest first; ids break ties for sales created in the same instant.
        ordered.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(ordered
            .into_iter()
            .take(limit as usize)
            .map(|sale| SaleSummary {
                sale_id: sale.id,
                created_at: sale.created_at,
                customer_name: sale.customer.name.clone(),
                customer_email: sale.customer.email.clone(),
                total_cents: sale.total_cents(),
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_monotonic_per_instance() {
        let store = InMemoryStore::new();
        let catalog = store.products();

        let first = catalog
            .insert(&Product::new("Wireless Mouse", "Logitech", 2499, 30))
            .await
            .unwrap();
        let second = catalog
            .insert(&Product::new("USB Hub", "Anker", 1299, 12))
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        // A separate instance starts its own sequence.
        let other = InMemoryStore::new();
        let third = other
            .products()
            .insert(&Product::new("Webcam", "Logitech", 4999, 8))
            .await
            .unwrap();
        assert_eq!(third.id, 1);
    }

    #[tokio::test]
    async fn test_handles_share_backing_state() {
        let store = InMemoryStore::new();

        let saved = store
            .products()
            .insert(&Product::new("Wireless Mouse", "Logitech", 2499, 30))
            .await
            .unwrap();

        // A handle created later still sees the product.
        assert!(store.products().find_by_id(saved.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_search_matches_name_and_manufacturer() {
        let store = InMemoryStore::new();
        let catalog = store.products();

        catalog
            .insert(&Product::new("Wireless Mouse", "Logitech", 2499, 30))
            .await
            .unwrap();
        catalog
            .insert(&Product::new("USB Hub", "Anker", 1299, 12))
            .await
            .unwrap();

        assert_eq!(catalog.search("mouse").await.unwrap().len(), 1);
        assert_eq!(catalog.search("LOGI").await.unwrap().len(), 1);
        assert_eq!(catalog.search("zzz").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_update_quantity_rejects_negative() {
        let store = InMemoryStore::new();
        let catalog = store.products();
        let product = catalog
            .insert(&Product::new("Wireless Mouse", "Logitech", 2499, 30))
            .await
            .unwrap();

        assert!(catalog.update_quantity(product.id, -1).await.is_err());
        assert!(catalog.update_quantity(product.id, 0).await.is_ok());
        assert_eq!(
            catalog
                .find_by_id(product.id)
                .await
                .unwrap()
                .unwrap()
                .quantity_in_stock,
            0
        );
    }

    #[tokio::test]
    async fn test_update_quantity_missing_product() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.products().update_quantity(42, 5).await,
            Err(CoreError::ProductMissing { product_id: 42 })
        ));
    }

    #[tokio::test]
    async fn test_create_or_get_by_email_is_case_insensitive() {
        let store = InMemoryStore::new();
        let customers = store.customers();

        let created = customers
            .create_or_get_by_email("Ada Lovelace", "ada@example.com")
            .await
            .unwrap();
        let fetched = customers
            .create_or_get_by_email("Someone Else", "ADA@Example.COM")
            .await
            .unwrap();

        // Same record comes back; no duplicate was created.
        assert_eq!(created.id, fetched.id);
        assert_eq!(fetched.name, "Ada Lovelace");
        assert_eq!(customers.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_email_case_insensitive() {
        let store = InMemoryStore::new();
        let customers = store.customers();

        customers
            .create_or_get_by_email("Ada Lovelace", "ada@example.com")
            .await
            .unwrap();

        assert!(customers
            .find_by_email("Ada@Example.Com")
            .await
            .unwrap()
            .is_some());
        assert!(customers
            .find_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_save_sale_assigns_distinct_ids() {
        let store = InMemoryStore::new();
        let product = store
            .products()
            .insert(&Product::new("Wireless Mouse", "Logitech", 2499, 30))
            .await
            .unwrap();
        let customer = store
            .customers()
            .create_or_get_by_email("Ada", "ada@example.com")
            .await
            .unwrap();

        let mut sale = Sale::new(customer);
        sale.add_line(&product, 1);
        let first = store.sales().save(sale.clone()).await.unwrap();
        let second = store.sales().save(sale).await.unwrap();

        // Saving the same content twice is two sales - save is not
        // idempotent, and the store must not deduplicate.
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.sales().recent_summaries(10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_save_sale_rejects_unsaved_customer_without_writes() {
        let store = InMemoryStore::new();
        let product = store
            .products()
            .insert(&Product::new("Wireless Mouse", "Logitech", 2499, 30))
            .await
            .unwrap();

        let mut sale = Sale::new(Customer::new("Ada", "ada@example.com"));
        sale.add_line(&product, 5);

        let err = store.sales().save(sale).await.unwrap_err();
        assert!(matches!(err, CoreError::CustomerNotPersisted { .. }));

        // No write happened: stock untouched, no sale recorded.
        assert_eq!(
            store
                .products()
                .find_by_id(product.id)
                .await
                .unwrap()
                .unwrap()
                .quantity_in_stock,
            30
        );
        assert_eq!(store.sales().recent_summaries(10).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_save_sale_short_stock_rolls_back_everything() {
        let store = InMemoryStore::new();
        let mouse = store
            .products()
            .insert(&Product::new("Wireless Mouse", "Logitech", 2499, 30))
            .await
            .unwrap();
        let keyboard = store
            .products()
            .insert(&Product::new("Mechanical Keyboard", "Keychron", 3999, 2))
            .await
            .unwrap();
        let customer = store
            .customers()
            .create_or_get_by_email("Ada", "ada@example.com")
            .await
            .unwrap();

        let mut sale = Sale::new(customer);
        sale.add_line(&mouse, 5); // coverable
        sale.add_line(&keyboard, 3); // only 2 available

        let err = store.sales().save(sale).await.unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));

        // The coverable first line was not applied either.
        let catalog = store.products();
        assert_eq!(
            catalog.find_by_id(mouse.id).await.unwrap().unwrap().quantity_in_stock,
            30
        );
        assert_eq!(
            catalog
                .find_by_id(keyboard.id)
                .await
                .unwrap()
                .unwrap()
                .quantity_in_stock,
            2
        );
    }

    #[tokio::test]
    async fn test_recent_summaries_newest_first_with_limit() {
        let store = InMemoryStore::new();
        let product = store
            .products()
            .insert(&Product::new("Wireless Mouse", "Logitech", 2499, 30))
            .await
            .unwrap();
        let customer = store
            .customers()
            .create_or_get_by_email("Ada", "ada@example.com")
            .await
            .unwrap();

        for _ in 0..3 {
            let mut sale = Sale::new(customer.clone());
            sale.add_line(&product, 1);
            store.sales().save(sale).await.unwrap();
        }

        let summaries = store.sales().recent_summaries(2).await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].sale_id, 3);
        assert_eq!(summaries[1].sale_id, 2);
        assert_eq!(summaries[0].total_cents, 2499);
        assert_eq!(summaries[0].customer_email, "ada@example.com");
    }
}
