//! Book catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::EntityId;
use entity_store::{Book, BookStatus, EntityStore, PartyDetails};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::orders::AppState;

// -- Request/response types --

#[derive(Deserialize)]
pub struct CreateBookRequest {
    pub name: String,
    pub author: String,
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: Option<BookStatus>,
    pub librarian: PartyDetails,
}

#[derive(Serialize)]
pub struct BookCreatedResponse {
    pub book_id: String,
}

#[derive(Serialize)]
pub struct BookDeletedResponse {
    pub cancelled_orders: u64,
}

// -- Handlers --

/// POST /books — list a new book in the catalog.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookCreatedResponse>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    if req.price < 0.0 {
        return Err(ApiError::BadRequest(
            "price must not be negative".to_string(),
        ));
    }

    let mut book = Book::new(req.name, req.author, req.price, req.librarian);
    book.image = req.image;
    if let Some(status) = req.status {
        book.status = status;
    }
    let book_id = book.id;

    state.store.insert_book(book).await?;
    metrics::counter!("books_listed_total").increment(1);

    Ok((
        StatusCode::CREATED,
        Json(BookCreatedResponse {
            book_id: book_id.to_string(),
        }),
    ))
}

/// GET /books — the full catalog in insertion order.
#[tracing::instrument(skip(state))]
pub async fn list<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(state.store.list_books().await?))
}

/// GET /books/{id} — a single book.
#[tracing::instrument(skip(state))]
pub async fn get<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    let book_id = parse_book_id(&id)?;
    let book = state
        .store
        .get_book(book_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("book not found: {book_id}")))?;
    Ok(Json(book))
}

/// DELETE /books/{id} — remove a book and cascade-cancel its orders.
#[tracing::instrument(skip(state))]
pub async fn delete<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<BookDeletedResponse>, ApiError> {
    let book_id = parse_book_id(&id)?;
    let cancelled = state.lifecycle.on_book_deleted(book_id).await?;
    Ok(Json(BookDeletedResponse {
        cancelled_orders: cancelled,
    }))
}

fn parse_book_id(raw: &str) -> Result<EntityId, ApiError> {
    EntityId::parse(raw).map_err(|_| ApiError::BadRequest(format!("malformed book identifier: {raw}")))
}
