//! Wishlist endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::EntityRef;
use entity_store::{EntityStore, WishlistEntry, WishlistToggle};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::orders::AppState;

// -- Request/response types --

#[derive(Deserialize)]
pub struct ToggleRequest {
    pub book_id: String,
    pub user_email: String,
    pub book_name: String,
    #[serde(default)]
    pub book_image: Option<String>,
}

#[derive(Serialize)]
pub struct ToggleResponse {
    pub status: &'static str,
}

// -- Handlers --

/// POST /wishlist/toggle — add the book to the user's wishlist, or
/// remove it if already present.
#[tracing::instrument(skip(state, req))]
pub async fn toggle<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    if req.user_email.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "user_email must not be empty".to_string(),
        ));
    }

    let entry = WishlistEntry::new(
        EntityRef::parse(&req.book_id),
        req.user_email,
        req.book_name,
        req.book_image,
    );
    let status = match state.store.toggle_wishlist(entry).await? {
        WishlistToggle::Added => "added",
        WishlistToggle::Removed => "removed",
    };
    Ok(Json(ToggleResponse { status }))
}

/// GET /wishlist/{email} — a user's wishlist entries.
#[tracing::instrument(skip(state))]
pub async fn for_user<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(email): Path<String>,
) -> Result<Json<Vec<WishlistEntry>>, ApiError> {
    Ok(Json(state.store.list_wishlist_for_user(&email).await?))
}
