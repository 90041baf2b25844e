//! User login and role administration endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use entity_store::{EntityStore, Role, User};
use serde::Deserialize;

use crate::error::ApiError;
use crate::extractor::Identity;
use crate::routes::orders::AppState;

// -- Request/response types --

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

// -- Handlers --

/// POST /users — upsert-on-login. An existing record keeps its role; a
/// first login creates the user with the default role.
#[tracing::instrument(skip(state, req))]
pub async fn login<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    if req.email.trim().is_empty() {
        return Err(ApiError::BadRequest("email must not be empty".to_string()));
    }

    if let Some(existing) = state.store.find_user_by_email(&req.email).await? {
        return Ok((StatusCode::OK, Json(existing)));
    }

    let mut user = User::new(req.email);
    user.name = req.name;
    state.store.upsert_user(user.clone()).await?;
    metrics::counter!("users_registered_total").increment(1);

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users — all registered users.
#[tracing::instrument(skip(state))]
pub async fn list<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(identity): Identity,
) -> Result<Json<Vec<User>>, ApiError> {
    require_admin(&state, &identity.email).await?;
    Ok(Json(state.store.list_users().await?))
}

/// PATCH /users/{email}/role — promote or demote a user. Admin only.
#[tracing::instrument(skip(state, req))]
pub async fn update_role<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(identity): Identity,
    Path(email): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &identity.email).await?;

    let matched = state.store.update_user_role(&email, req.role).await?;
    if !matched {
        return Err(ApiError::NotFound(format!("user not found: {email}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Resolves the requester and rejects anyone without the admin role.
async fn require_admin<S: EntityStore>(
    state: &AppState<S>,
    email: &str,
) -> Result<(), ApiError> {
    let requester = state
        .store
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| ApiError::Forbidden(format!("unknown requester: {email}")))?;
    if requester.role != Role::Admin {
        return Err(ApiError::Forbidden(format!(
            "admin role required: {email}"
        )));
    }
    Ok(())
}
