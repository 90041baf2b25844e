//! Admin transaction ledger endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use entity_store::EntityStore;
use views::LedgerRow;

use crate::error::ApiError;
use crate::extractor::Identity;
use crate::routes::orders::AppState;

/// GET /admin/transactions — every recorded payment joined with its
/// order, book, librarian, and customer. Admin only; the role check
/// runs against the identity claim before any ledger data is read.
#[tracing::instrument(skip(state))]
pub async fn transactions<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Identity(identity): Identity,
) -> Result<Json<Vec<LedgerRow>>, ApiError> {
    Ok(Json(state.views.transaction_ledger(&identity).await?))
}
