//! Order lifecycle and order view endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use entity_store::{EntityStore, OrderStatus};
use orders::{OrderLifecycle, PlaceOrder};
use payments::{MockPaymentProvider, ReconciliationEngine};
use serde::{Deserialize, Serialize};
use views::{CustomerOrderRow, LibrarianOrderRow, OrderDetail, ViewBuilder};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EntityStore> {
    pub lifecycle: OrderLifecycle<S>,
    pub engine: ReconciliationEngine<S, MockPaymentProvider>,
    pub views: ViewBuilder<S>,
    pub store: S,
}

// -- Request/response types --

#[derive(Serialize)]
pub struct OrderPlacedResponse {
    pub order_id: String,
    pub status: String,
    pub payment_status: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

// -- Handlers --

/// POST /orders — place a new order.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<PlaceOrder>,
) -> Result<(StatusCode, Json<OrderPlacedResponse>), ApiError> {
    let order_id = state.lifecycle.place_order(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(OrderPlacedResponse {
            order_id: order_id.to_string(),
            status: "pending".to_string(),
            payment_status: "unpaid".to_string(),
        }),
    ))
}

/// GET /orders/customer/{email} — a customer's active orders joined with
/// their books.
#[tracing::instrument(skip(state))]
pub async fn by_customer<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(email): Path<String>,
) -> Result<Json<Vec<CustomerOrderRow>>, ApiError> {
    Ok(Json(state.views.customer_orders(&email).await?))
}

/// GET /orders/librarian/{email} — a librarian's orders, books optional.
#[tracing::instrument(skip(state))]
pub async fn by_librarian<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(email): Path<String>,
) -> Result<Json<Vec<LibrarianOrderRow>>, ApiError> {
    Ok(Json(state.views.librarian_orders(&email).await?))
}

/// GET /orders/{id} — a single order with its book summary.
#[tracing::instrument(skip(state))]
pub async fn get<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetail>, ApiError> {
    Ok(Json(state.views.order_detail(&id).await?))
}

/// PATCH /orders/{id}/status — update fulfillment status.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<StatusCode, ApiError> {
    state.lifecycle.update_status(&id, req.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /orders/{id} — cancel an order.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.lifecycle.cancel_order(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
