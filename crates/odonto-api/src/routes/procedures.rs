use axum::Json;
use axum::extract::{Extension, Query, State};

use odonto_core::models::Record;
use odonto_core::models::procedure::Procedure;
use odonto_storage::records;

use super::dentists::ActiveQuery;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// The catalog, alphabetical. `?active=true` is what budget forms offer.
pub async fn list_procedures(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ActiveQuery>,
) -> Result<Json<Vec<Record<Procedure>>>, ApiError> {
    let mut procedures =
        records::list::<Procedure>(&state.s3, state.bucket(), user.clinic_id).await?;
    if let Some(active) = query.active {
        procedures.retain(|p| p.data.active == active);
    }
    procedures.sort_by_key(|p| p.data.name.to_lowercase());
    Ok(Json(procedures))
}
