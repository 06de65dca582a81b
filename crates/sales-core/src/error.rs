//! # Error Types
//!
//! Domain-specific error types for sales-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sales-core errors (this file)                                          │
//! │  ├── CoreError        - Checkout and persistence-boundary failures      │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  sales-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ← DbError (via From in sales-db)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, requested/available)
//! 3. Every checkout failure is recoverable: the terminal decides whether
//!    to retry, and the cart is only cleared on the full-success path

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Checkout and persistence-boundary errors.
///
/// These errors represent business rule violations or storage failures.
/// None of them is fatal to the process.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout was invoked on an empty cart.
    ///
    /// Reported before any persistence attempt; nothing has been written.
    #[error("cart is empty")]
    EmptyCart,

    /// Checkout was invoked with a customer that has never been saved.
    ///
    /// A customer id of 0 is the "not yet persisted" sentinel; sales can
    /// only reference customers the store has assigned an id to.
    #[error("customer has no persisted id (got {customer_id})")]
    CustomerNotPersisted { customer_id: i64 },

    /// A cart-referenced product no longer exists in the catalog.
    #[error("product not found: {product_id}")]
    ProductMissing { product_id: i64 },

    /// Insufficient stock to complete the sale.
    ///
    /// ## When This Occurs
    /// - Checkout validation: the requested quantity exceeds the freshly
    ///   fetched stock level
    /// - The sale transaction itself: a concurrent write shrank the stock
    ///   between validation and commit, and the conditional decrement
    ///   rejected the whole transaction
    #[error("insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        name: String,
        requested: i64,
        available: i64,
    },

    /// A sale was handed to the persistence boundary with no line items.
    #[error("cannot save a sale with no line items")]
    EmptySale,

    /// A sale line failed the persistence preconditions.
    #[error("invalid sale line for product {product_id}: {reason}")]
    InvalidSaleLine { product_id: i64, reason: String },

    /// The durable write of the sale header or its lines could not complete
    /// as a unit. The transaction has been rolled back; the cart is
    /// preserved so the operator can retry.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., an email without an '@').
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 2,
            name: "Wireless Mouse".to_string(),
            requested: 100,
            available: 30,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for Wireless Mouse: requested 100, available 30"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
