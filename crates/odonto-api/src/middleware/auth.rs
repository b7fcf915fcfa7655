use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use odonto_core::messages;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated clinic extracted from a verified JWT.
#[derive(Clone, Debug)]
pub struct AuthUser {
    /// The Cognito `sub`; every stored object is scoped by it.
    pub clinic_id: Uuid,
    pub email: Option<String>,
}

/// The raw token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// JWT validation middleware.
///
/// Validates the bearer token against the user pool keys. On success, inserts
/// `AuthUser` into request extensions for handlers to use.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized(messages::UNAUTHORIZED.to_string()))?;

    let claims = state.verifier.verify(token).map_err(|e| {
        tracing::info!(error = %e, "rejected bearer token");
        ApiError::Unauthorized(messages::UNAUTHORIZED.to_string())
    })?;
    let clinic_id = claims.clinic_id()?;

    let user = AuthUser {
        clinic_id,
        email: claims.email,
    };
    req.extensions_mut().insert(user.clone());

    let mut response = next.run(req).await;
    // Read back by the audit log, which runs outside this layer.
    response.extensions_mut().insert(user);
    Ok(response)
}
