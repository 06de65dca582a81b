//! # Shopping Cart
//!
//! The session-scoped cart: a merged collection of (product, quantity)
//! snapshots a customer intends to purchase.
//!
//! ## Design Notes
//! - Items are **value snapshots**, not live catalog references. The cart
//!   freezes the product's name and price at add time so the display stays
//!   consistent; checkout never trusts these snapshots and re-fetches every
//!   product by id before doing anything durable.
//! - Items are unique by `product_id`: adding the same product again merges
//!   into the existing line instead of appending a duplicate.
//! - The cart total is a display estimate only. The authoritative prices are
//!   captured at checkout time from a fresh catalog read.
//! - The cart is never persisted; it is cleared exactly once checkout
//!   succeeds.

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::Product;
use crate::validation::validate_quantity;

// =============================================================================
// Cart Item
// =============================================================================

/// One entry in the shopping cart: a product snapshot plus a quantity.
///
/// The quantity is only ever incremented (repeat adds of the same product);
/// there is no per-item decrement, the cart is cleared wholesale instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog id of the product (used by checkout to re-fetch fresh state).
    pub product_id: i64,

    /// Product name at time of adding (frozen, display only).
    pub name: String,

    /// Manufacturer at time of adding (frozen, display only).
    pub manufacturer: String,

    /// Price in cents at time of adding (frozen, display estimate only).
    pub unit_price_cents: i64,

    /// Units of this product in the cart. Always positive.
    pub quantity: i64,
}

impl CartItem {
    /// Creates a cart item by snapshotting a product.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id,
            name: product.name.clone(),
            manufacturer: product.manufacturer.clone(),
            unit_price_cents: product.price_cents,
            quantity,
        }
    }

    /// Line total in cents (snapshot price × quantity).
    #[inline]
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }

    /// Line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `product_id`
/// - Every item quantity is positive
/// - Insertion order is preserved (it matters for display, not for totals)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Adds a product to the cart, merging with an existing entry for the
    /// same product id.
    ///
    /// The quantity must be positive; the caller supplies it as-is and the
    /// cart does not re-derive it. Rejections leave the cart untouched.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product.id)
        {
            item.quantity += quantity;
            return Ok(());
        }

        self.items.push(CartItem::from_product(product, quantity));
        Ok(())
    }

    /// Returns the current ordered collection of cart items.
    ///
    /// Reflects every add since the last clear.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Cart total in cents, from the cached snapshots.
    ///
    /// This may be stale relative to the catalog; checkout re-validates
    /// against fresh data, so this value is only a display estimate.
    pub fn total_cents(&self) -> i64 {
        self.items.iter().map(CartItem::line_total_cents).sum()
    }

    /// Cart total as Money.
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents())
    }

    /// Empties the cart. Called only after checkout fully commits (or when
    /// the operator explicitly abandons the session).
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of unique items in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total quantity across all items.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn test_product(id: i64, price_cents: i64) -> Product {
        let mut product = Product::new(
            format!("Product {}", id),
            "Smart Sales Test Co",
            price_cents,
            100,
        );
        product.id = id;
        product
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        let product = test_product(1, 999); // $9.99

        cart.add_item(&product, 2).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.total_cents(), 1998); // $19.98
    }

    #[test]
    fn test_cart_add_same_product_merges() {
        let mut cart = Cart::new();
        let product = test_product(1, 999);

        cart.add_item(&product, 2).unwrap();
        cart.add_item(&product, 3).unwrap();
        cart.add_item(&product, 4).unwrap();

        // Still one unique item, quantity is the sum of all adds.
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].quantity, 9);
    }

    #[test]
    fn test_cart_total_over_mixed_items() {
        let mut cart = Cart::new();
        cart.add_item(&test_product(2, 2499), 5).unwrap();
        cart.add_item(&test_product(3, 3999), 2).unwrap();

        // 5 × $24.99 + 2 × $39.99 = $204.93
        assert_eq!(cart.total_cents(), 20493);
        assert_eq!(cart.total().to_string(), "$204.93");
    }

    #[test]
    fn test_cart_rejects_non_positive_quantity() {
        let mut cart = Cart::new();
        let product = test_product(1, 999);

        let err = cart.add_item(&product, 0).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = cart.add_item(&product, -3).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_snapshot_survives_catalog_price_change() {
        let mut cart = Cart::new();
        let mut product = test_product(1, 999);

        cart.add_item(&product, 1).unwrap();
        product.price_cents = 1999;

        // The cart displays the price as of add time.
        assert_eq!(cart.items()[0].unit_price_cents, 999);
    }

    #[test]
    fn test_cart_clear() {
        let mut cart = Cart::new();
        cart.add_item(&test_product(1, 999), 2).unwrap();
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_cents(), 0);
    }
}
