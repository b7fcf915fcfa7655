use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;

use odonto_auth::flows::{self, SignUpResult, Tokens};
use odonto_core::messages;
use odonto_core::validation;

use crate::error::ApiError;
use crate::middleware::auth::bearer_token;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Confirmation {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

fn email(raw: &str) -> Result<String, ApiError> {
    Ok(validation::normalize_email("email", raw)?)
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<SignUpResult>, ApiError> {
    let email = email(&body.email)?;
    validation::required("password", &body.password)?;
    let result = flows::sign_up(
        &state.cognito,
        &state.config.cognito_client_id,
        &email,
        &body.password,
    )
    .await?;
    tracing::info!(user_sub = %result.user_sub, confirmed = result.confirmed, "clinic account created");
    Ok(Json(result))
}

pub async fn confirm(
    State(state): State<AppState>,
    Json(body): Json<Confirmation>,
) -> Result<Json<()>, ApiError> {
    let email = email(&body.email)?;
    validation::required("code", body.code.trim())?;
    flows::confirm_sign_up(
        &state.cognito,
        &state.config.cognito_client_id,
        &email,
        body.code.trim(),
    )
    .await?;
    Ok(Json(()))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<Tokens>, ApiError> {
    let email = email(&body.email)?;
    let tokens = flows::initiate_auth(
        &state.cognito,
        &state.config.cognito_client_id,
        &email,
        &body.password,
    )
    .await?;
    Ok(Json(tokens))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<Tokens>, ApiError> {
    validation::required("refresh_token", &body.refresh_token)?;
    let tokens = flows::refresh_auth(
        &state.cognito,
        &state.config.cognito_client_id,
        &body.refresh_token,
    )
    .await?;
    Ok(Json(tokens))
}

/// Revoke every session of the account. Needs the access token itself, not
/// just a verified identity, so it reads the bearer header directly.
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<()>, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized(messages::UNAUTHORIZED.to_string()))?;
    flows::global_sign_out(&state.cognito, token).await?;
    Ok(Json(()))
}
