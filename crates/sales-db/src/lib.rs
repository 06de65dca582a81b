//! # sales-db: Database Layer for Smart Sales
//!
//! This crate provides database access for the Smart Sales system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Smart Sales Data Flow                             │
//! │                                                                         │
//! │  CheckoutService / terminal menu                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     sales-db (THIS CRATE)                       │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │    │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │    │    │
//! │  │   │   (pool.rs)   │    │ product.rs    │    │  (embedded)  │    │    │
//! │  │   │               │    │ customer.rs   │    │              │    │    │
//! │  │   │ SqlitePool    │◄───│ sale.rs       │    │ 001_init.sql │    │    │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘    │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: in tests)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The repositories here implement the capability traits from
//! [`sales_core::repository`]; swapping this backend for the in-memory one
//! is a construction-time decision, nothing in the core changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sales_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/sales.db")).await?;
//! let products = db.products().search("mouse").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::SqliteCustomerRepository;
pub use repository::product::SqliteProductRepository;
pub use repository::sale::SqliteSaleRepository;
