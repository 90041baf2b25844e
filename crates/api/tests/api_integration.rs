//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use entity_store::{EntityStore, MemoryEntityStore, Role, User};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (
    axum::Router,
    Arc<api::routes::orders::AppState<MemoryEntityStore>>,
) {
    let store = MemoryEntityStore::new();
    let state = api::create_default_state(store);
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    send_as(app, method, uri, body, None).await
}

async fn send_as(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    identity: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(email) = identity {
        builder = builder.header("x-user-email", email);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_book(app: &axum::Router, name: &str, price: f64) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/books",
        Some(serde_json::json!({
            "name": name,
            "author": "Jane Author",
            "price": price,
            "librarian": { "email": "lib@example.com", "name": "Lib Rarian" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["book_id"].as_str().unwrap().to_string()
}

async fn create_order(app: &axum::Router, book_id: &str, customer_email: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "book_id": book_id,
            "user_id": format!("user-{customer_email}"),
            "customer": { "email": customer_email, "name": "Cust Omer" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "pending");
    assert_eq!(json["payment_status"], "unpaid");
    json["order_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_full_checkout_flow_marks_order_paid_once() {
    let (app, state) = setup();

    let book_id = create_book(&app, "Dune", 10.00).await;
    let order_id = create_order(&app, &book_id, "paul@example.com").await;

    // Intent amount derives from the catalog price in minor units.
    let (status, intent) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/payment-intent"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(intent["amount_minor_units"], 1000);

    // Nothing changes until a confirmation lands.
    let (_, detail) = send(&app, "GET", &format!("/orders/{order_id}"), None).await;
    assert_eq!(detail["order"]["payment_status"], "unpaid");

    let (status, session) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/checkout-session"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session_id = session["session_id"].as_str().unwrap().to_string();

    let (status, confirmed) = send(
        &app,
        "POST",
        &format!("/payments/sessions/{session_id}/confirm"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(confirmed["already_recorded"], false);
    assert_eq!(confirmed["order_id"].as_str().unwrap(), order_id);
    let transaction_id = confirmed["transaction_id"].as_str().unwrap().to_string();

    let (_, detail) = send(&app, "GET", &format!("/orders/{order_id}"), None).await;
    assert_eq!(detail["order"]["payment_status"], "paid");

    // Replaying the same session confirmation records nothing new.
    let (status, replay) = send(
        &app,
        "POST",
        &format!("/payments/sessions/{session_id}/confirm"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay["already_recorded"], true);
    assert_eq!(replay["transaction_id"].as_str().unwrap(), transaction_id);

    assert_eq!(state.store.payment_count().await, 1);
}

#[tokio::test]
async fn test_direct_confirm_shares_the_idempotency_guard() {
    let (app, state) = setup();

    let book_id = create_book(&app, "Hyperion", 12.50).await;
    let order_id = create_order(&app, &book_id, "sol@example.com").await;

    let (_, intent) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/payment-intent"),
        None,
    )
    .await;
    let intent_id = intent["intent_id"].as_str().unwrap().to_string();

    let confirm_body = serde_json::json!({
        "order_id": order_id,
        "intent_id": intent_id,
    });
    let (status, first) = send(&app, "POST", "/payments/confirm", Some(confirm_body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["already_recorded"], false);

    let (status, second) = send(&app, "POST", "/payments/confirm", Some(confirm_body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["already_recorded"], true);
    assert_eq!(second["transaction_id"], first["transaction_id"]);

    assert_eq!(state.store.payment_count().await, 1);
}

#[tokio::test]
async fn test_second_intent_against_paid_order_conflicts() {
    let (app, _) = setup();

    let book_id = create_book(&app, "Foundation", 8.00).await;
    let order_id = create_order(&app, &book_id, "hari@example.com").await;

    let (_, intent) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/payment-intent"),
        None,
    )
    .await;
    let intent_id = intent["intent_id"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        "POST",
        "/payments/confirm",
        Some(serde_json::json!({ "order_id": order_id, "intent_id": intent_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/payment-intent"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_customer_view_excludes_cancelled_orders() {
    let (app, _) = setup();

    let book_id = create_book(&app, "Ubik", 9.00).await;
    let kept = create_order(&app, &book_id, "joe@example.com").await;
    let cancelled = create_order(&app, &book_id, "joe@example.com").await;

    let (status, _) = send(&app, "DELETE", &format!("/orders/{cancelled}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, rows) = send(&app, "GET", "/orders/customer/joe@example.com", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["order"]["id"].as_str().unwrap(), kept);
}

#[tokio::test]
async fn test_book_delete_cascades_to_orders() {
    let (app, state) = setup();

    let book_id = create_book(&app, "Solaris", 11.00).await;
    create_order(&app, &book_id, "kris@example.com").await;
    create_order(&app, &book_id, "snow@example.com").await;

    let (status, json) = send(&app, "DELETE", &format!("/books/{book_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cancelled_orders"], 2);
    assert_eq!(state.store.order_count().await, 0);

    // A second delete of the same book is a 404, not another cascade.
    let (status, _) = send(&app, "DELETE", &format!("/books/{book_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_and_absent_order_ids_are_distinguished() {
    let (app, _) = setup();

    let (status, _) = send(&app, "GET", "/orders/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let absent = uuid::Uuid::new_v4();
    let (status, _) = send(&app, "GET", &format!("/orders/{absent}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/orders/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", &format!("/orders/{absent}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ledger_requires_an_admin_identity() {
    let (app, state) = setup();

    state
        .store
        .upsert_user(User::with_role("root@example.com", Role::Admin))
        .await
        .unwrap();
    state
        .store
        .upsert_user(User::new("joe@example.com"))
        .await
        .unwrap();

    // No identity claim at all.
    let (status, _) = send(&app, "GET", "/admin/transactions", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A known non-admin.
    let (status, _) = send_as(&app, "GET", "/admin/transactions", None, Some("joe@example.com")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, rows) = send_as(
        &app,
        "GET",
        "/admin/transactions",
        None,
        Some("root@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(rows.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_ledger_joins_payment_order_and_book() {
    let (app, state) = setup();

    state
        .store
        .upsert_user(User::with_role("root@example.com", Role::Admin))
        .await
        .unwrap();

    let book_id = create_book(&app, "Neuromancer", 15.00).await;
    let order_id = create_order(&app, &book_id, "case@example.com").await;
    let (_, intent) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/payment-intent"),
        None,
    )
    .await;
    let intent_id = intent["intent_id"].as_str().unwrap().to_string();
    send(
        &app,
        "POST",
        "/payments/confirm",
        Some(serde_json::json!({ "order_id": order_id, "intent_id": intent_id })),
    )
    .await;

    let (status, rows) = send_as(
        &app,
        "GET",
        "/admin/transactions",
        None,
        Some("root@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["order"]["id"].as_str().unwrap(), order_id);
    assert_eq!(rows[0]["book"]["name"], "Neuromancer");
    assert_eq!(rows[0]["librarian"]["email"], "lib@example.com");
}

#[tokio::test]
async fn test_login_keeps_the_existing_role() {
    let (app, state) = setup();

    state
        .store
        .upsert_user(User::with_role("lib@example.com", Role::Librarian))
        .await
        .unwrap();

    let (status, json) = send(
        &app,
        "POST",
        "/users",
        Some(serde_json::json!({ "email": "lib@example.com", "name": "Lib Rarian" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["role"], "librarian");

    let (status, json) = send(
        &app,
        "POST",
        "/users",
        Some(serde_json::json!({ "email": "new@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["role"], "user");
}

#[tokio::test]
async fn test_role_update_is_admin_gated() {
    let (app, state) = setup();

    state
        .store
        .upsert_user(User::with_role("root@example.com", Role::Admin))
        .await
        .unwrap();
    state
        .store
        .upsert_user(User::new("joe@example.com"))
        .await
        .unwrap();

    let body = serde_json::json!({ "role": "librarian" });

    let (status, _) = send_as(
        &app,
        "PATCH",
        "/users/joe@example.com/role",
        Some(body.clone()),
        Some("joe@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_as(
        &app,
        "PATCH",
        "/users/joe@example.com/role",
        Some(body.clone()),
        Some("root@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_as(
        &app,
        "PATCH",
        "/users/ghost@example.com/role",
        Some(body),
        Some("root@example.com"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wishlist_toggle_round_trip() {
    let (app, _) = setup();

    let book_id = create_book(&app, "Blindsight", 7.50).await;
    let body = serde_json::json!({
        "book_id": book_id,
        "user_email": "siri@example.com",
        "book_name": "Blindsight",
    });

    let (status, json) = send(&app, "POST", "/wishlist/toggle", Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "added");

    let (_, entries) = send(&app, "GET", "/wishlist/siri@example.com", None).await;
    assert_eq!(entries.as_array().unwrap().len(), 1);

    let (status, json) = send(&app, "POST", "/wishlist/toggle", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "removed");

    let (_, entries) = send(&app, "GET", "/wishlist/siri@example.com", None).await;
    assert!(entries.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_history_walks_the_order_chain() {
    let (app, _) = setup();

    let book_id = create_book(&app, "Anathem", 20.00).await;
    let order_id = create_order(&app, &book_id, "erasmas@example.com").await;
    let (_, intent) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/payment-intent"),
        None,
    )
    .await;
    let intent_id = intent["intent_id"].as_str().unwrap().to_string();
    send(
        &app,
        "POST",
        "/payments/confirm",
        Some(serde_json::json!({ "order_id": order_id, "intent_id": intent_id })),
    )
    .await;

    let (status, rows) = send(&app, "GET", "/payments/customer/erasmas@example.com", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["book"]["name"], "Anathem");
}
