//! Google Calendar connection: OAuth authorization-code flow.
//!
//! The callback is hit by the user's browser coming back from Google, so it
//! carries no bearer token; the clinic travels in the `state` parameter.

use axum::Json;
use axum::extract::{Extension, Query, State};
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use odonto_core::messages;
use odonto_core::s3_keys;
use odonto_storage::records;

use crate::config::GoogleOAuthConfig;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";

/// Tokens stored per clinic after a successful connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarIntegration {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Timestamp,
    pub scope: Option<String>,
    pub connected_at: Timestamp,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    scope: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeUrl {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CalendarStatus {
    pub connected: bool,
    pub connected_at: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn google(state: &AppState) -> Result<&GoogleOAuthConfig, ApiError> {
    state
        .config
        .google
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest(messages::INTEGRATION_DISABLED.to_string()))
}

pub fn authorize_url(google: &GoogleOAuthConfig, clinic_id: Uuid) -> Result<String, ApiError> {
    let clinic = clinic_id.to_string();
    let url = reqwest::Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", google.client_id.as_str()),
            ("redirect_uri", google.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", CALENDAR_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", clinic.as_str()),
        ],
    )
    .map_err(|e| ApiError::Internal(format!("authorize url: {e}")))?;
    Ok(url.to_string())
}

pub async fn get_authorize_url(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AuthorizeUrl>, ApiError> {
    let google = google(&state)?;
    Ok(Json(AuthorizeUrl {
        url: authorize_url(google, user.clinic_id)?,
    }))
}

pub async fn calendar_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CalendarStatus>, ApiError> {
    let key = s3_keys::calendar_integration(user.clinic_id);
    let stored = records::load_json_opt::<CalendarIntegration>(&state.s3, state.bucket(), &key).await?;
    Ok(Json(CalendarStatus {
        connected: stored.is_some(),
        connected_at: stored.map(|s| s.connected_at),
    }))
}

/// Exchange the authorization code for tokens and store them.
pub async fn calendar_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<CalendarStatus>, ApiError> {
    let google = google(&state)?;
    if let Some(error) = query.error {
        tracing::warn!(error = %error, "calendar authorization denied");
        return Err(ApiError::BadRequest("Autorização negada pelo Google.".to_string()));
    }
    let code = query
        .code
        .ok_or_else(|| ApiError::BadRequest("Código de autorização ausente.".to_string()))?;
    let clinic_id = query
        .state
        .as_deref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ApiError::BadRequest("Parâmetro state inválido.".to_string()))?;

    let response = state
        .http
        .post(TOKEN_URL)
        .form(&[
            ("code", code.as_str()),
            ("client_id", google.client_id.as_str()),
            ("client_secret", google.client_secret.as_str()),
            ("redirect_uri", google.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?;
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(clinic_id = %clinic_id, status = %status, body = %body, "token exchange rejected");
        return Err(ApiError::BadRequest("Não foi possível conectar a agenda.".to_string()));
    }
    let tokens: TokenResponse = response.json().await?;

    let now = Timestamp::now();
    let integration = CalendarIntegration {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_at: now.checked_add(SignedDuration::from_secs(tokens.expires_in))?,
        scope: tokens.scope,
        connected_at: now,
    };
    let key = s3_keys::calendar_integration(clinic_id);
    records::save_json(&state.s3, state.bucket(), &key, &integration).await?;

    tracing::info!(clinic_id = %clinic_id, "calendar connected");
    Ok(Json(CalendarStatus {
        connected: true,
        connected_at: Some(now),
    }))
}
