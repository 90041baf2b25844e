//! Requester identity extraction.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use views::RequesterIdentity;

use crate::error::ApiError;

/// Header carrying the verified requester email.
///
/// Populated by the upstream auth proxy after token verification; this
/// service treats it as a trusted claim, never as client-controlled query
/// input.
pub const IDENTITY_HEADER: &str = "x-user-email";

/// Extracts the requester identity claim from the trusted header.
#[derive(Debug, Clone)]
pub struct Identity(pub RequesterIdentity);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(IDENTITY_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::Forbidden("missing identity claim".to_string()))?;

        Ok(Identity(RequesterIdentity::new(email)))
    }
}
