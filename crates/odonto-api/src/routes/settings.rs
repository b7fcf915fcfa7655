use axum::Json;
use axum::extract::{Extension, State};

use odonto_core::models::settings::ClinicSettings;
use odonto_storage::records;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub async fn get_settings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ClinicSettings>, ApiError> {
    Ok(Json(state.settings(user.clinic_id).await?))
}

/// Replace the clinic's settings. The billing customer id is managed by the
/// billing flow and is never taken from the request.
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(mut settings): Json<ClinicSettings>,
) -> Result<Json<ClinicSettings>, ApiError> {
    let current = state.settings(user.clinic_id).await?;
    settings.prepare()?;
    settings.billing_customer_id = current.billing_customer_id;
    records::save_settings(&state.s3, state.bucket(), user.clinic_id, &settings).await?;

    tracing::info!(
        clinic_id = %user.clinic_id,
        config_version = settings.config_version,
        boleto_rate = settings.interest_rates.boleto,
        card_rate = settings.interest_rates.card,
        "settings saved"
    );
    Ok(Json(settings))
}
