//! Payment error types.

use common::EntityId;
use entity_store::StoreError;
use thiserror::Error;

/// Errors that can occur during payment operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The referenced order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The order's book no longer exists.
    #[error("Book not found for order {0}")]
    BookNotFound(EntityId),

    /// The order has already been paid.
    #[error("Order already paid: {0}")]
    AlreadyPaid(EntityId),

    /// Required metadata is absent from the provider session.
    #[error("Session is missing required metadata: {field}")]
    MissingMetadata { field: &'static str },

    /// The supplied identifier is malformed.
    #[error("Malformed identifier: {value}")]
    MalformedId { value: String },

    /// The payment provider rejected the request.
    #[error("Payment provider error: {0}")]
    Provider(String),

    /// The payment provider did not respond within the bounded timeout.
    /// The caller may retry; nothing was recorded locally.
    #[error("Payment provider timed out after {timeout_ms}ms")]
    ProviderTimeout { timeout_ms: u64 },

    /// An error occurred in the entity store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for payment operations.
pub type Result<T> = std::result::Result<T, PaymentError>;
