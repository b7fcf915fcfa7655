use axum::Json;
use axum::extract::{Extension, State};
use serde::{Deserialize, Serialize};

use odonto_core::messages;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const PORTAL_SESSIONS_URL: &str = "https://api.stripe.com/v1/billing_portal/sessions";

#[derive(Debug, Serialize, Deserialize)]
pub struct PortalSession {
    pub url: String,
}

/// Open a billing portal session for the clinic's subscription and return
/// the URL to redirect the browser to.
pub async fn create_portal_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PortalSession>, ApiError> {
    let billing = state
        .config
        .billing
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest(messages::INTEGRATION_DISABLED.to_string()))?;
    let customer = state
        .settings(user.clinic_id)
        .await?
        .billing_customer_id
        .ok_or_else(|| ApiError::BadRequest("Clínica sem assinatura ativa.".to_string()))?;

    let response = state
        .http
        .post(PORTAL_SESSIONS_URL)
        .bearer_auth(&billing.stripe_secret_key)
        .form(&[
            ("customer", customer.as_str()),
            ("return_url", billing.return_url.as_str()),
        ])
        .send()
        .await?;
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Internal(format!(
            "billing portal session failed: {status}: {body}"
        )));
    }
    let session: PortalSession = response.json().await?;

    tracing::info!(clinic_id = %user.clinic_id, "billing portal session created");
    Ok(Json(session))
}
