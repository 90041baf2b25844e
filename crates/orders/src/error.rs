//! Order lifecycle error types.

use entity_store::StoreError;
use thiserror::Error;

/// Errors that can occur during order lifecycle operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A required field is missing or empty.
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    /// The supplied identifier is not a valid order identifier.
    #[error("Malformed order identifier: {value}")]
    MalformedId { value: String },

    /// No order matched the given identifier.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// An error occurred in the entity store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for order lifecycle operations.
pub type Result<T> = std::result::Result<T, OrderError>;
