//! # Domain Types
//!
//! Core domain types used throughout Smart Sales.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Product      │   │    Customer     │   │      Sale       │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (i64)       │   │  id (i64)       │   │  id (i64)       │        │
//! │  │  name           │   │  name           │   │  customer       │        │
//! │  │  manufacturer   │   │  email (unique) │   │  lines          │        │
//! │  │  price_cents    │   └─────────────────┘   │  created_at     │        │
//! │  │  quantity_in_   │                         └────────┬────────┘        │
//! │  │    stock        │   ┌─────────────────┐            │                 │
//! │  └─────────────────┘   │   SaleSummary   │   ┌────────▼────────┐        │
//! │                        │  (report view)  │   │    SaleLine     │        │
//! │                        └─────────────────┘   │  frozen price   │        │
//! │                                              └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Id Assignment
//! Every durable entity carries an `id` of 0 until its store assigns one at
//! insert time. Ids are positive once assigned and never change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Sentinel id for entities that have not been persisted yet.
pub const UNSAVED_ID: i64 = 0;

// =============================================================================
// Product
// =============================================================================

/// A catalog entry: immutable identity and price, mutable stock counter.
///
/// The stock counter is authoritative only in the catalog store; any copy of
/// this struct held elsewhere (a cart, a search result) is a snapshot that
/// may already be stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Store-assigned identifier (0 until saved).
    pub id: i64,

    /// Display name shown in search results and on receipts.
    pub name: String,

    /// Company or brand that manufactures the item.
    pub manufacturer: String,

    /// Price per unit in cents. Non-negative, immutable.
    pub price_cents: i64,

    /// Units currently available. Never negative after a successful
    /// operation; mutable only through the catalog's update operation.
    pub quantity_in_stock: i64,
}

impl Product {
    /// Creates a product that has not been saved to a catalog yet.
    pub fn new(
        name: impl Into<String>,
        manufacturer: impl Into<String>,
        price_cents: i64,
        quantity_in_stock: i64,
    ) -> Self {
        Product {
            id: UNSAVED_ID,
            name: name.into(),
            manufacturer: manufacturer.into(),
            price_cents,
            quantity_in_stock,
        }
    }

    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether this product has a store-assigned id.
    #[inline]
    pub fn is_saved(&self) -> bool {
        self.id > 0
    }

    /// Whether current stock covers the requested quantity.
    #[inline]
    pub fn can_fill(&self, quantity: i64) -> bool {
        self.quantity_in_stock >= quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer identity record.
///
/// Email is the business key: the store enforces case-insensitive
/// uniqueness. Immutable once constructed, except for the id the store
/// assigns at insert time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    /// Store-assigned identifier (0 until saved).
    pub id: i64,

    pub name: String,

    pub email: String,
}

impl Customer {
    /// Creates a customer that has not been saved yet.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Customer {
            id: UNSAVED_ID,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Creates a customer with a known store id.
    pub fn with_id(id: i64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Customer {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Whether this customer has a store-assigned id.
    #[inline]
    pub fn is_saved(&self) -> bool {
        self.id > 0
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// One priced line item within a sale.
///
/// Uses the snapshot pattern to freeze the unit price (and display name) at
/// checkout time: later catalog price changes never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    /// The catalog product this line refers to.
    pub product_id: i64,

    /// Product name at time of sale (frozen).
    pub product_name: String,

    /// Units sold. Always positive.
    pub quantity: i64,

    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
}

impl SaleLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total in cents (unit price × quantity).
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
// Sale
// =============================================================================

/// A completed sales transaction: a customer plus priced line items.
///
/// Once persisted, a sale is immutable history; there is no update or delete
/// path. The total is always derived from the lines, never stored on its
/// own, so it recomputes identically after reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// Store-assigned identifier (0 until the persistence transaction
    /// commits, then set exactly once).
    pub id: i64,

    /// The purchasing customer. Must hold a persisted id before the sale
    /// can be saved.
    pub customer: Customer,

    /// Ordered line items. Must be non-empty to be persisted.
    pub lines: Vec<SaleLine>,

    /// When the sale was made.
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Creates a new, unsaved sale for a customer.
    pub fn new(customer: Customer) -> Self {
        Sale {
            id: UNSAVED_ID,
            customer,
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Appends a line item, freezing the product's current price.
    pub fn add_line(&mut self, product: &Product, quantity: i64) {
        self.lines.push(SaleLine {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
            unit_price_cents: product.price_cents,
        });
    }

    /// Sale total in cents, derived from the lines.
    pub fn total_cents(&self) -> i64 {
        self.lines.iter().map(SaleLine::line_total_cents).sum()
    }

    /// Sale total as Money.
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents())
    }

    /// Whether the persistence transaction has assigned an id.
    #[inline]
    pub fn is_saved(&self) -> bool {
        self.id > 0
    }
}

// =============================================================================
// Sale Summary
// =============================================================================

/// Lightweight read-only view of a persisted sale, for reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleSummary {
    pub sale_id: i64,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_email: String,
    /// Derived from the sale's line totals at query time.
    pub total_cents: i64,
}

impl SaleSummary {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entities_are_unsaved() {
        let product = Product::new("Wireless Mouse", "Logitech", 2499, 30);
        assert!(!product.is_saved());

        let customer = Customer::new("Ada", "ada@example.com");
        assert!(!customer.is_saved());

        let sale = Sale::new(customer);
        assert!(!sale.is_saved());
    }

    #[test]
    fn test_product_can_fill() {
        let product = Product::new("Wireless Mouse", "Logitech", 2499, 30);
        assert!(product.can_fill(30));
        assert!(product.can_fill(5));
        assert!(!product.can_fill(31));
    }

    #[test]
    fn test_sale_line_total() {
        let line = SaleLine {
            product_id: 2,
            product_name: "Wireless Mouse".to_string(),
            quantity: 5,
            unit_price_cents: 2499,
        };
        assert_eq!(line.line_total_cents(), 12495);
        assert_eq!(line.line_total(), Money::from_cents(12495));
    }

    #[test]
    fn test_sale_total_is_sum_of_lines() {
        let mut product_a = Product::new("Wireless Mouse", "Logitech", 2499, 30);
        product_a.id = 2;
        let mut product_b = Product::new("Mechanical Keyboard", "Keychron", 3999, 20);
        product_b.id = 3;

        let mut sale = Sale::new(Customer::with_id(7, "Ada", "ada@example.com"));
        sale.add_line(&product_a, 5);
        sale.add_line(&product_b, 2);

        // 5 × $24.99 + 2 × $39.99 = $204.93
        assert_eq!(sale.total_cents(), 20493);
        assert_eq!(sale.total().to_string(), "$204.93");
    }

    #[test]
    fn test_sale_serializes_for_receipts() {
        let mut product = Product::new("Wireless Mouse", "Logitech", 2499, 30);
        product.id = 2;

        let mut sale = Sale::new(Customer::with_id(7, "Ada", "ada@example.com"));
        sale.add_line(&product, 5);

        let json = serde_json::to_string(&sale).unwrap();
        let back: Sale = serde_json::from_str(&json).unwrap();

        assert_eq!(back.customer.id, 7);
        assert_eq!(back.lines.len(), 1);
        assert_eq!(back.total_cents(), sale.total_cents());
    }

    #[test]
    fn test_sale_line_freezes_price() {
        let mut product = Product::new("Wireless Mouse", "Logitech", 2499, 30);
        product.id = 2;

        let mut sale = Sale::new(Customer::with_id(7, "Ada", "ada@example.com"));
        sale.add_line(&product, 1);

        // A later catalog price change must not affect the recorded line.
        product.price_cents = 9999;
        assert_eq!(sale.lines[0].unit_price_cents, 2499);
    }
}
