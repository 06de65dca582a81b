//! # sales-core: Pure Business Logic for Smart Sales
//!
//! This crate is the **heart** of the Smart Sales point of sale. It holds the
//! checkout-to-persistence protocol and every domain type it operates on,
//! with zero I/O of its own.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Smart Sales Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                  apps/terminal (console UI)                     │    │
//! │  │    search ──► cart ──► checkout ──► receipt / reports           │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ sales-core (THIS CRATE) ★                       │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐    │    │
//! │  │   │   types   │  │   money   │  │   cart    │  │ checkout  │    │    │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │ 3-phase   │    │    │
//! │  │   │   Sale    │  │           │  │ CartItem  │  │ protocol  │    │    │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘    │    │
//! │  │                                                                 │    │
//! │  │   repository traits + in-memory stores for tests                │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                    sales-db (Database Layer)                    │    │
//! │  │          SQLite repositories, transactional sale save           │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Sale, SaleLine, SaleSummary)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The session shopping cart
//! - [`checkout`] - The checkout orchestrator
//! - [`repository`] - Storage capability traits
//! - [`memory`] - In-memory stores (tests and ephemeral runs)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Integer Money**: All monetary values are in cents (i64) to avoid
//!    float errors - a sale total must recompute identically after reload
//! 2. **Snapshot carts**: the cart stores value snapshots keyed by product
//!    id, never live catalog references; checkout re-fetches by id
//! 3. **Ids come from storage**: entities carry an id of 0 until the store
//!    assigns one at insert time, exactly once
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod memory;
pub mod money;
pub mod repository;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use sales_core::Money` instead of
// `use sales_core::money::Money`

pub use cart::{Cart, CartItem};
pub use checkout::CheckoutService;
pub use error::{CoreError, CoreResult, ValidationError};
pub use memory::InMemoryStore;
pub use money::Money;
pub use repository::{CustomerRepository, ProductRepository, SaleRepository};
pub use types::{Customer, Product, Sale, SaleLine, SaleSummary};
