//! Payment intent, checkout session, and confirmation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::EntityId;
use entity_store::{EntityStore, Payment};
use payments::{ConfirmedPayment, PaymentError};
use serde::{Deserialize, Serialize};
use views::CustomerPaymentRow;

use crate::error::ApiError;
use crate::routes::orders::AppState;

// -- Request/response types --

#[derive(Serialize)]
pub struct IntentResponse {
    pub intent_id: String,
    pub client_secret: String,
    pub amount_minor_units: i64,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub url: String,
}

#[derive(Deserialize)]
pub struct ConfirmDirectRequest {
    pub order_id: String,
    pub intent_id: String,
}

#[derive(Serialize)]
pub struct ConfirmResponse {
    pub payment: Payment,
    pub order_id: String,
    pub transaction_id: String,
    pub already_recorded: bool,
}

impl From<ConfirmedPayment> for ConfirmResponse {
    fn from(confirmed: ConfirmedPayment) -> Self {
        Self {
            order_id: confirmed.order_id.to_string(),
            transaction_id: confirmed.payment.transaction_id.clone(),
            already_recorded: confirmed.already_recorded,
            payment: confirmed.payment,
        }
    }
}

// -- Handlers --

/// POST /orders/{id}/payment-intent — create a client-confirmable charge.
#[tracing::instrument(skip(state))]
pub async fn create_intent<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<IntentResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let intent = state.engine.create_charge_intent(order_id).await?;
    Ok(Json(IntentResponse {
        intent_id: intent.intent_id,
        client_secret: intent.client_secret,
        amount_minor_units: intent.amount.minor_units(),
    }))
}

/// POST /orders/{id}/checkout-session — start a hosted checkout flow.
#[tracing::instrument(skip(state))]
pub async fn create_session<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let handle = state.engine.create_checkout_session(order_id).await?;
    Ok(Json(SessionResponse {
        session_id: handle.session_id,
        url: handle.url,
    }))
}

/// POST /payments/confirm — record a directly-confirmed charge.
#[tracing::instrument(skip(state, req))]
pub async fn confirm_direct<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ConfirmDirectRequest>,
) -> Result<(StatusCode, Json<ConfirmResponse>), ApiError> {
    let confirmed = state
        .engine
        .confirm_direct(&req.order_id, &req.intent_id)
        .await?;
    Ok(confirm_status(confirmed))
}

/// POST /payments/sessions/{id}/confirm — reconcile a checkout session.
#[tracing::instrument(skip(state))]
pub async fn confirm_session<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ConfirmResponse>), ApiError> {
    let confirmed = state.engine.confirm_checkout_session(&id).await?;
    Ok(confirm_status(confirmed))
}

/// GET /payments/customer/{email} — a customer's payment history.
#[tracing::instrument(skip(state))]
pub async fn by_customer<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(email): Path<String>,
) -> Result<Json<Vec<CustomerPaymentRow>>, ApiError> {
    Ok(Json(state.views.customer_payments(&email).await?))
}

fn confirm_status(confirmed: ConfirmedPayment) -> (StatusCode, Json<ConfirmResponse>) {
    let status = if confirmed.already_recorded {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    (status, Json(ConfirmResponse::from(confirmed)))
}

fn parse_order_id(raw: &str) -> Result<EntityId, ApiError> {
    EntityId::parse(raw).map_err(|_| {
        ApiError::from(PaymentError::MalformedId {
            value: raw.to_string(),
        })
    })
}
