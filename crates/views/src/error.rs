//! View error types.

use entity_store::StoreError;
use thiserror::Error;

/// Errors that can occur while building views.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The supplied identifier is malformed.
    #[error("Malformed identifier: {value}")]
    MalformedId { value: String },

    /// The requested order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The order's book no longer exists.
    #[error("Book not found for order {0}")]
    BookNotFound(String),

    /// The requester is not allowed to read this view.
    #[error("Forbidden: {email} is not an admin")]
    Forbidden { email: String },

    /// An error occurred in the entity store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for view operations.
pub type Result<T> = std::result::Result<T, ViewError>;
