//! # Checkout Orchestrator
//!
//! Turns a non-empty cart plus a resolved customer into a durable sale,
//! guaranteeing stock is never oversold and persistence is all-or-nothing.
//!
//! ## The Checkout Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       checkout(cart, customer)                          │
//! │                                                                         │
//! │  Preconditions  cart non-empty, customer id positive                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Phase 1        re-fetch EVERY product by id, full pass:                │
//! │  validation     missing? short stock? → abort, nothing written          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Phase 2        re-fetch again, build Sale with the price               │
//! │  construction   captured at THIS moment                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Phase 3        SaleRepository::save - ONE transaction:                 │
//! │  persistence    header + lines + conditional stock decrement            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Success        clear the cart, return the persisted sale               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Phase 1 is a courtesy check: it produces friendly failures before a
//! transaction is opened. The guarantee against overselling does not rest on
//! it - the save transaction's conditional decrement rejects any sale the
//! stock can no longer cover, so a concurrent write between phases is
//! detected and rolled back rather than oversold.
//!
//! On any failure the cart is left untouched so the operator can retry; the
//! cart is cleared exactly once, on the full-success path.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::repository::{ProductRepository, SaleRepository};
use crate::types::{Customer, Product, Sale};

/// The checkout orchestrator.
///
/// Holds the two storage capabilities checkout needs; which backends those
/// are (in-memory or SQLite) is decided by whoever constructs the service.
pub struct CheckoutService {
    catalog: Arc<dyn ProductRepository>,
    sales: Arc<dyn SaleRepository>,
}

impl CheckoutService {
    /// Creates a checkout service over the given stores.
    pub fn new(catalog: Arc<dyn ProductRepository>, sales: Arc<dyn SaleRepository>) -> Self {
        CheckoutService { catalog, sales }
    }

    /// Runs the full checkout protocol for the cart and customer.
    ///
    /// On success the cart has been cleared and the returned sale carries
    /// its store-assigned id and derived total. On any failure the cart and
    /// all stock levels are exactly as they were before the call.
    pub async fn checkout(&self, cart: &mut Cart, customer: &Customer) -> CoreResult<Sale> {
        // Preconditions: client errors, reported before any storage access.
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        if !customer.is_saved() {
            return Err(CoreError::CustomerNotPersisted {
                customer_id: customer.id,
            });
        }

        debug!(
            customer_id = customer.id,
            items = cart.item_count(),
            "starting checkout"
        );

        // Phase 1 - validation. A full pass over all items completes before
        // anything else happens, so a failure on a later item never leaves
        // earlier items partially applied.
        for item in cart.items() {
            let product = self.fetch_product(item.product_id).await?;
            if !product.can_fill(item.quantity) {
                return Err(CoreError::InsufficientStock {
                    product_id: product.id,
                    name: product.name,
                    requested: item.quantity,
                    available: product.quantity_in_stock,
                });
            }
        }

        // Phase 2 - construction. Each product is fetched again rather than
        // reusing the phase-1 snapshot: the captured unit price must be the
        // freshest the catalog has at build time.
        let mut sale = Sale::new(customer.clone());
        for item in cart.items() {
            let product = self.fetch_product(item.product_id).await?;
            sale.add_line(&product, item.quantity);
        }

        // Phase 3 - persistence. Header, lines, and stock decrements commit
        // or roll back as a single unit inside the store.
        let saved = self.sales.save(sale).await?;

        // Full success: this is the only path that clears the cart.
        cart.clear();

        info!(
            sale_id = saved.id,
            total_cents = saved.total_cents(),
            lines = saved.lines.len(),
            "checkout complete"
        );

        Ok(saved)
    }

    async fn fetch_product(&self, product_id: i64) -> CoreResult<Product> {
        self.catalog
            .find_by_id(product_id)
            .await?
            .ok_or(CoreError::ProductMissing { product_id })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::repository::CustomerRepository;
    use crate::types::Product;

    /// Builds a store with the standard two-product catalog used across
    /// these tests, plus a persisted customer.
    async fn setup() -> (InMemoryStore, CheckoutService, Customer) {
        let store = InMemoryStore::new();

        store
            .products()
            .insert(&Product::new("Wireless Mouse", "Logitech", 2499, 30))
            .await
            .unwrap();
        store
            .products()
            .insert(&Product::new("Mechanical Keyboard", "Keychron", 3999, 20))
            .await
            .unwrap();

        let customer = store
            .customers()
            .create_or_get_by_email("Ada Lovelace", "ada@example.com")
            .await
            .unwrap();

        let service = CheckoutService::new(Arc::new(store.products()), Arc::new(store.sales()));
        (store, service, customer)
    }

    #[tokio::test]
    async fn test_checkout_happy_path() {
        let (store, service, customer) = setup().await;

        let mouse = store.products().find_by_id(1).await.unwrap().unwrap();
        let keyboard = store.products().find_by_id(2).await.unwrap().unwrap();

        let mut cart = Cart::new();
        cart.add_item(&mouse, 5).unwrap();
        cart.add_item(&keyboard, 2).unwrap();

        let sale = service.checkout(&mut cart, &customer).await.unwrap();

        // 5 × $24.99 + 2 × $39.99 = $204.93
        assert!(sale.is_saved());
        assert_eq!(sale.total_cents(), 20493);
        assert_eq!(sale.lines.len(), 2);
        for line in &sale.lines {
            assert_eq!(
                line.line_total_cents(),
                line.unit_price_cents * line.quantity
            );
        }

        // Stock was decremented, the cart was cleared.
        assert_eq!(store.products().find_by_id(1).await.unwrap().unwrap().quantity_in_stock, 25);
        assert_eq!(store.products().find_by_id(2).await.unwrap().unwrap().quantity_in_stock, 18);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_is_client_error() {
        let (store, service, customer) = setup().await;

        let mut cart = Cart::new();
        let err = service.checkout(&mut cart, &customer).await.unwrap_err();

        assert!(matches!(err, CoreError::EmptyCart));
        // Persistence was never reached.
        assert_eq!(store.sales().recent_summaries(10).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_checkout_unsaved_customer_is_client_error() {
        let (store, service, _) = setup().await;

        let mouse = store.products().find_by_id(1).await.unwrap().unwrap();
        let mut cart = Cart::new();
        cart.add_item(&mouse, 1).unwrap();

        let walk_in = Customer::new("Walk In", "walkin@example.com");
        let err = service.checkout(&mut cart, &walk_in).await.unwrap_err();

        assert!(matches!(err, CoreError::CustomerNotPersisted { .. }));
        // The cart is preserved for retry.
        assert_eq!(cart.item_count(), 1);
        assert_eq!(store.products().find_by_id(1).await.unwrap().unwrap().quantity_in_stock, 30);
    }

    #[tokio::test]
    async fn test_checkout_insufficient_stock_aborts_whole_cart() {
        let (store, service, customer) = setup().await;

        let mouse = store.products().find_by_id(1).await.unwrap().unwrap();
        let keyboard = store.products().find_by_id(2).await.unwrap().unwrap();

        let mut cart = Cart::new();
        cart.add_item(&mouse, 5).unwrap(); // fine
        cart.add_item(&keyboard, 100).unwrap(); // only 20 in stock

        let err = service.checkout(&mut cart, &customer).await.unwrap_err();
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

        // No partial effect: the passing line was not applied either.
        assert_eq!(store.products().find_by_id(1).await.unwrap().unwrap().quantity_in_stock, 30);
        assert_eq!(store.products().find_by_id(2).await.unwrap().unwrap().quantity_in_stock, 20);
        assert_eq!(store.sales().recent_summaries(10).await.unwrap().len(), 0);
        assert_eq!(cart.item_count(), 2);
    }

    #[tokio::test]
    async fn test_checkout_exact_stock_boundary() {
        let (store, service, customer) = setup().await;

        let keyboard = store.products().find_by_id(2).await.unwrap().unwrap();
        let mut cart = Cart::new();
        cart.add_item(&keyboard, 20).unwrap(); // exactly the stock level

        let sale = service.checkout(&mut cart, &customer).await.unwrap();
        assert!(sale.is_saved());
        assert_eq!(store.products().find_by_id(2).await.unwrap().unwrap().quantity_in_stock, 0);
    }

    #[tokio::test]
    async fn test_checkout_missing_product_aborts() {
        let (store, service, customer) = setup().await;

        let mut ghost = Product::new("Discontinued Webcam", "Acme", 1500, 10);
        ghost.id = 99; // never saved to the catalog

        let mut cart = Cart::new();
        cart.add_item(&ghost, 1).unwrap();

        let err = service.checkout(&mut cart, &customer).await.unwrap_err();
        assert!(matches!(err, CoreError::ProductMissing { product_id: 99 }));
        assert_eq!(store.sales().recent_summaries(10).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_checkout_captures_fresh_price_not_cart_snapshot() {
        let (store, service, customer) = setup().await;

        let mouse = store.products().find_by_id(1).await.unwrap().unwrap();
        let mut cart = Cart::new();
        cart.add_item(&mouse, 2).unwrap();

        // The catalog price changes after the item went into the cart.
        store.replace_price_for_test(1, 2999).unwrap();

        let sale = service.checkout(&mut cart, &customer).await.unwrap();

        // The sale captures the authoritative price at checkout time.
        assert_eq!(sale.lines[0].unit_price_cents, 2999);
        assert_eq!(sale.total_cents(), 5998);
    }

    #[tokio::test]
    async fn test_checkout_merged_cart_produces_single_line() {
        let (store, service, customer) = setup().await;

        let mouse = store.products().find_by_id(1).await.unwrap().unwrap();
        let mut cart = Cart::new();
        cart.add_item(&mouse, 2).unwrap();
        cart.add_item(&mouse, 3).unwrap();

        let sale = service.checkout(&mut cart, &customer).await.unwrap();
        assert_eq!(sale.lines.len(), 1);
        assert_eq!(sale.lines[0].quantity, 5);
        assert_eq!(store.products().find_by_id(1).await.unwrap().unwrap().quantity_in_stock, 25);
    }

    #[tokio::test]
    async fn test_sales_get_distinct_ids() {
        let (store, service, customer) = setup().await;

        let mouse = store.products().find_by_id(1).await.unwrap().unwrap();

        let mut cart = Cart::new();
        cart.add_item(&mouse, 1).unwrap();
        let first = service.checkout(&mut cart, &customer).await.unwrap();

        cart.add_item(&mouse, 1).unwrap();
        let second = service.checkout(&mut cart, &customer).await.unwrap();

        assert!(first.id > 0);
        assert!(second.id > first.id);
    }
}
