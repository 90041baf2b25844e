//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use entity_store::StoreError;
use orders::OrderError;
use payments::PaymentError;
use views::ViewError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed client input.
    BadRequest(String),
    /// Referenced entity absent.
    NotFound(String),
    /// Duplicate action, e.g. charging an already-paid order.
    Conflict(String),
    /// Role check failure.
    Forbidden(String),
    /// External collaborator timed out or failed transiently.
    Retryable(String),
    /// Unexpected store failure.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Retryable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match &err {
            OrderError::MissingField { .. } | OrderError::MalformedId { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            OrderError::NotFound(_) => ApiError::NotFound(err.to_string()),
            OrderError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match &err {
            PaymentError::OrderNotFound(_) | PaymentError::BookNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            PaymentError::AlreadyPaid(_) => ApiError::Conflict(err.to_string()),
            PaymentError::MissingMetadata { .. } | PaymentError::MalformedId { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            PaymentError::ProviderTimeout { .. } => ApiError::Retryable(err.to_string()),
            PaymentError::Provider(_) | PaymentError::Store(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<ViewError> for ApiError {
    fn from(err: ViewError) -> Self {
        match &err {
            ViewError::MalformedId { .. } => ApiError::BadRequest(err.to_string()),
            ViewError::OrderNotFound(_) | ViewError::BookNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            ViewError::Forbidden { .. } => ApiError::Forbidden(err.to_string()),
            ViewError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}
