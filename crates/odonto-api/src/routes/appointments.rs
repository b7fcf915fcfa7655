use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use jiff::Timestamp;
use serde::Deserialize;
use uuid::Uuid;

use odonto_core::agenda::{AgendaFilter, filter_appointments};
use odonto_core::models::Record;
use odonto_core::models::appointment::{Appointment, AppointmentStatus};
use odonto_core::models::dentist::Dentist;
use odonto_storage::records;

use super::crud;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

async fn check_refs(state: &AppState, clinic_id: Uuid, appointment: &Appointment) -> Result<(), ApiError> {
    crud::require_patient(state, clinic_id, appointment.patient_id).await?;
    if let Some(dentist_id) = appointment.dentist_id {
        crud::require_ref::<Dentist>(state, clinic_id, "dentist_id", dentist_id).await?;
    }
    Ok(())
}

/// `?from=&to=&dentist_id=&patient_id=&status=`, earliest first.
pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<AgendaFilter>,
) -> Result<Json<Vec<Record<Appointment>>>, ApiError> {
    let all = records::list::<Appointment>(&state.s3, state.bucket(), user.clinic_id).await?;
    Ok(Json(filter_appointments(all, &filter)))
}

pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(mut appointment): Json<Appointment>,
) -> Result<Json<Record<Appointment>>, ApiError> {
    crud::prepare(&state, user.clinic_id, &mut appointment).await?;
    check_refs(&state, user.clinic_id, &appointment).await?;
    let record = records::insert(&state.s3, state.bucket(), user.clinic_id, appointment).await?;

    tracing::info!(
        clinic_id = %user.clinic_id,
        appointment_id = %record.id,
        patient_id = %record.data.patient_id,
        starts_at = %record.data.starts_at,
        "appointment created"
    );
    Ok(Json(record))
}

pub async fn update_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(mut appointment): Json<Appointment>,
) -> Result<Json<Record<Appointment>>, ApiError> {
    let mut record =
        records::get::<Appointment>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    crud::prepare(&state, user.clinic_id, &mut appointment).await?;
    check_refs(&state, user.clinic_id, &appointment).await?;
    record.replace(appointment, Timestamp::now());
    records::put(&state.s3, state.bucket(), &record).await?;

    tracing::info!(clinic_id = %user.clinic_id, appointment_id = %id, "appointment updated");
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: AppointmentStatus,
}

/// Change only the status (confirm, mark done, cancel, no-show).
pub async fn update_appointment_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Record<Appointment>>, ApiError> {
    let mut record =
        records::get::<Appointment>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    let previous = record.data.status;
    record.data.status = update.status;
    record.updated_at = Timestamp::now();
    records::put(&state.s3, state.bucket(), &record).await?;

    tracing::info!(
        clinic_id = %user.clinic_id,
        appointment_id = %id,
        from = previous.label(),
        to = update.status.label(),
        "appointment status changed"
    );
    Ok(Json(record))
}
