//! HTTP API server with observability for the BookCourier marketplace.
//!
//! Provides REST endpoints for the catalog, order lifecycle, payment
//! reconciliation, wishlists, and the admin transaction ledger, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod extractor;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use entity_store::EntityStore;
use metrics_exporter_prometheus::PrometheusHandle;
use orders::OrderLifecycle;
use payments::{EngineOptions, MockPaymentProvider, ReconciliationEngine};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use views::ViewBuilder;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EntityStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        // Catalog
        .route("/books", post(routes::books::create::<S>))
        .route("/books", get(routes::books::list::<S>))
        .route("/books/{id}", get(routes::books::get::<S>))
        .route("/books/{id}", delete(routes::books::delete::<S>))
        // Orders
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}", delete(routes::orders::cancel::<S>))
        .route("/orders/{id}/status", patch(routes::orders::update_status::<S>))
        .route("/orders/customer/{email}", get(routes::orders::by_customer::<S>))
        .route("/orders/librarian/{email}", get(routes::orders::by_librarian::<S>))
        // Payments
        .route(
            "/orders/{id}/payment-intent",
            post(routes::payments::create_intent::<S>),
        )
        .route(
            "/orders/{id}/checkout-session",
            post(routes::payments::create_session::<S>),
        )
        .route("/payments/confirm", post(routes::payments::confirm_direct::<S>))
        .route(
            "/payments/sessions/{id}/confirm",
            post(routes::payments::confirm_session::<S>),
        )
        .route(
            "/payments/customer/{email}",
            get(routes::payments::by_customer::<S>),
        )
        // Users
        .route("/users", post(routes::users::login::<S>))
        .route("/users", get(routes::users::list::<S>))
        .route("/users/{email}/role", patch(routes::users::update_role::<S>))
        // Wishlist
        .route("/wishlist/toggle", post(routes::wishlist::toggle::<S>))
        .route("/wishlist/{email}", get(routes::wishlist::for_user::<S>))
        // Admin
        .route("/admin/transactions", get(routes::ledger::transactions::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over a store, with the given engine options
/// and the mock payment provider.
pub fn create_state<S: EntityStore + Clone + 'static>(
    store: S,
    options: EngineOptions,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        lifecycle: OrderLifecycle::new(store.clone()),
        engine: ReconciliationEngine::with_options(
            store.clone(),
            MockPaymentProvider::new(),
            options,
        ),
        views: ViewBuilder::new(store.clone()),
        store,
    })
}

/// Creates application state with default engine options.
pub fn create_default_state<S: EntityStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    create_state(store, EngineOptions::default())
}
