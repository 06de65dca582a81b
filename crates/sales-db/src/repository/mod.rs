//! # Repository Module
//!
//! SQLite implementations of the sales-core repository traits.
//!
//! ## Available Repositories
//!
//! - [`product::SqliteProductRepository`] - catalog CRUD, search, stock updates
//! - [`customer::SqliteCustomerRepository`] - customer lookup and create-or-get
//! - [`sale::SqliteSaleRepository`] - the sale persistence transaction and
//!   report summaries
//!
//! Every repository holds a clone of the shared [`sqlx::SqlitePool`]; the
//! handles are cheap to create and safe to pass around.

pub mod customer;
pub mod product;
pub mod sale;
