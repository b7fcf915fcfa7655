use axum::Json;
use axum::extract::{Extension, Query, State};
use jiff::civil::Date;
use serde::Deserialize;
use uuid::Uuid;

use odonto_core::agenda::{self, AgendaDay};
use odonto_core::models::appointment::Appointment;
use odonto_core::models::schedule_block::ScheduleBlock;
use odonto_storage::records;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AgendaQuery {
    pub from: Date,
    pub to: Date,
    pub dentist_id: Option<Uuid>,
}

/// Day-by-day agenda with appointments and the blocks closing each day.
pub async fn get_agenda(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<AgendaQuery>,
) -> Result<Json<Vec<AgendaDay>>, ApiError> {
    let appointments = records::list::<Appointment>(&state.s3, state.bucket(), user.clinic_id).await?;
    let blocks = records::list::<ScheduleBlock>(&state.s3, state.bucket(), user.clinic_id).await?;
    let days = agenda::days(query.from, query.to, query.dentist_id, appointments, &blocks)?;
    Ok(Json(days))
}
