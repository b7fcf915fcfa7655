use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use jiff::Timestamp;
use serde::Deserialize;
use uuid::Uuid;

use odonto_core::messages::UniqueField;
use odonto_core::models::appointment::Appointment;
use odonto_core::models::budget::Budget;
use odonto_core::models::installment::Installment;
use odonto_core::models::patient::Patient;
use odonto_core::models::payment_plan::PaymentPlan;
use odonto_core::models::{Document, Record};
use odonto_storage::records;

use super::crud;
use super::installments::with_effective_status;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

fn unique_values(patient: &Patient) -> [(UniqueField, Option<&str>); 2] {
    [
        (UniqueField::PatientCpf, patient.cpf.as_deref()),
        (UniqueField::PatientEmail, patient.email.as_deref()),
    ]
}

#[derive(Debug, Deserialize)]
pub struct PatientQuery {
    /// Matches a name substring (case-insensitive) or CPF digits.
    pub q: Option<String>,
}

pub fn matches_search(patient: &Patient, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    if patient.name.to_lowercase().contains(&query.to_lowercase()) {
        return true;
    }
    let digits: String = query.chars().filter(char::is_ascii_digit).collect();
    !digits.is_empty() && patient.cpf.as_deref().is_some_and(|cpf| cpf.contains(&digits))
}

pub async fn list_patients(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PatientQuery>,
) -> Result<Json<Vec<Record<Patient>>>, ApiError> {
    let mut patients = records::list::<Patient>(&state.s3, state.bucket(), user.clinic_id).await?;
    if let Some(q) = &query.q {
        patients.retain(|p| matches_search(&p.data, q));
    }
    patients.sort_by_key(|p| p.data.name.to_lowercase());
    Ok(Json(patients))
}

pub async fn create_patient(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(mut patient): Json<Patient>,
) -> Result<Json<Record<Patient>>, ApiError> {
    crud::prepare(&state, user.clinic_id, &mut patient).await?;
    let record = Record::new(user.clinic_id, patient, Timestamp::now());

    crud::put_with_claims(&state, &record, &[], &unique_values(&record.data)).await?;

    tracing::info!(clinic_id = %user.clinic_id, patient_id = %record.id, "patient created");
    Ok(Json(record))
}

pub async fn update_patient(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(mut patient): Json<Patient>,
) -> Result<Json<Record<Patient>>, ApiError> {
    let mut record = records::get::<Patient>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    crud::prepare(&state, user.clinic_id, &mut patient).await?;

    let previous = record.data.clone();
    record.replace(patient, Timestamp::now());
    crud::put_with_claims(
        &state,
        &record,
        &unique_values(&previous),
        &unique_values(&record.data),
    )
    .await?;

    tracing::info!(clinic_id = %user.clinic_id, patient_id = %id, "patient updated");
    Ok(Json(record))
}

pub async fn delete_patient(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, ApiError> {
    let removed = records::delete::<Patient>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    crud::release_all(&state, user.clinic_id, id, &unique_values(&removed.data)).await;

    tracing::info!(clinic_id = %user.clinic_id, patient_id = %id, "patient deleted");
    Ok(Json(()))
}

/// Records of `T` that belong to patient `id`, after checking the patient exists.
async fn for_patient<T: Document>(
    state: &AppState,
    clinic_id: Uuid,
    id: Uuid,
    patient_of: impl Fn(&T) -> Uuid,
) -> Result<Vec<Record<T>>, ApiError> {
    records::get::<Patient>(&state.s3, state.bucket(), clinic_id, id).await?;
    let mut rows = records::list::<T>(&state.s3, state.bucket(), clinic_id).await?;
    rows.retain(|r| patient_of(&r.data) == id);
    Ok(rows)
}

pub async fn patient_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Record<Appointment>>>, ApiError> {
    let mut rows = for_patient::<Appointment>(&state, user.clinic_id, id, |a| a.patient_id).await?;
    rows.sort_by_key(|a| std::cmp::Reverse(a.data.starts_at));
    Ok(Json(rows))
}

pub async fn patient_budgets(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Record<Budget>>>, ApiError> {
    let rows = for_patient::<Budget>(&state, user.clinic_id, id, |b| b.patient_id).await?;
    Ok(Json(rows))
}

pub async fn patient_payment_plans(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Record<PaymentPlan>>>, ApiError> {
    let rows = for_patient::<PaymentPlan>(&state, user.clinic_id, id, |p| p.patient_id).await?;
    Ok(Json(rows))
}

pub async fn patient_installments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Record<Installment>>>, ApiError> {
    let today = state.today(user.clinic_id).await?;
    let mut rows = for_patient::<Installment>(&state, user.clinic_id, id, |i| i.patient_id).await?;
    rows.sort_by_key(|i| (i.data.due_date, i.data.number));
    Ok(Json(with_effective_status(rows, today)))
}
