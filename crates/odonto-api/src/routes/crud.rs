//! Handlers shared by every collection: load, validate, write, respond.
//!
//! Entities with extra rules (uniqueness, cross-record checks) have their own
//! modules and reuse the helpers here.

use axum::Json;
use axum::extract::{Extension, Path, State};
use uuid::Uuid;

use odonto_core::models::patient::Patient;
use odonto_core::models::{Document, Record};
use odonto_storage::error::StorageError;
use odonto_storage::unique::{ClaimChanges, ClaimValue};
use odonto_storage::{records, unique};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Run `T::prepare` against the clinic's current date.
pub async fn prepare<T: Document>(
    state: &AppState,
    clinic_id: Uuid,
    data: &mut T,
) -> Result<(), ApiError> {
    let today = state.today(clinic_id).await?;
    data.prepare(today)?;
    Ok(())
}

/// Referenced records must exist in the same clinic; a dangling id is a
/// validation error on `field`, not a 404 for the request.
pub async fn require_ref<T: Document>(
    state: &AppState,
    clinic_id: Uuid,
    field: &str,
    id: Uuid,
) -> Result<Record<T>, ApiError> {
    match records::get::<T>(&state.s3, state.bucket(), clinic_id, id).await {
        Ok(record) => Ok(record),
        Err(StorageError::NotFound { .. }) => {
            Err(ApiError::invalid(field, "Registro relacionado não encontrado."))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn require_patient(
    state: &AppState,
    clinic_id: Uuid,
    patient_id: Uuid,
) -> Result<Record<Patient>, ApiError> {
    require_ref::<Patient>(state, clinic_id, "patient_id", patient_id).await
}

pub async fn list<T: Document>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Record<T>>>, ApiError> {
    let rows = records::list::<T>(&state.s3, state.bucket(), user.clinic_id).await?;
    Ok(Json(rows))
}

pub async fn get<T: Document>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Record<T>>, ApiError> {
    let record = records::get::<T>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    Ok(Json(record))
}

pub async fn create<T: Document>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(mut data): Json<T>,
) -> Result<Json<Record<T>>, ApiError> {
    prepare(&state, user.clinic_id, &mut data).await?;
    let record = records::insert(&state.s3, state.bucket(), user.clinic_id, data).await?;
    tracing::info!(
        clinic_id = %user.clinic_id,
        collection = T::COLLECTION.as_str(),
        id = %record.id,
        "record created"
    );
    Ok(Json(record))
}

pub async fn update<T: Document>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(mut data): Json<T>,
) -> Result<Json<Record<T>>, ApiError> {
    let mut record = records::get::<T>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    prepare(&state, user.clinic_id, &mut data).await?;
    record.replace(data, jiff::Timestamp::now());
    records::put(&state.s3, state.bucket(), &record).await?;
    tracing::info!(
        clinic_id = %user.clinic_id,
        collection = T::COLLECTION.as_str(),
        id = %id,
        "record updated"
    );
    Ok(Json(record))
}

pub async fn delete<T: Document>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, ApiError> {
    records::delete::<T>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    tracing::info!(
        clinic_id = %user.clinic_id,
        collection = T::COLLECTION.as_str(),
        id = %id,
        "record deleted"
    );
    Ok(Json(()))
}

/// Claim each present value for `owner`. If one is taken, claims made by this
/// call are released before the conflict is returned.
pub async fn claim_all(
    state: &AppState,
    clinic_id: Uuid,
    owner: Uuid,
    values: &[ClaimValue<'_>],
) -> Result<(), ApiError> {
    let mut claimed = Vec::new();
    for &(field, value) in values {
        let Some(value) = value else { continue };
        if let Err(e) = unique::claim(&state.s3, state.bucket(), clinic_id, field, value, owner).await {
            release_all(state, clinic_id, owner, &claimed).await;
            return Err(e.into());
        }
        claimed.push((field, Some(value)));
    }
    Ok(())
}

/// Best-effort release; failures are logged and leave a stale claim behind.
pub async fn release_all(
    state: &AppState,
    clinic_id: Uuid,
    owner: Uuid,
    values: &[ClaimValue<'_>],
) {
    for &(field, value) in values {
        let Some(value) = value else { continue };
        if let Err(e) = unique::release(&state.s3, state.bucket(), clinic_id, field, value, owner).await {
            tracing::warn!(
                clinic_id = %clinic_id,
                owner = %owner,
                index = field.index(),
                error = %e,
                "failed to release unique claim"
            );
        }
    }
}

/// Write `record`, moving its unique claims from `old` to `new` around the
/// write. Every new value is claimed first; on a conflict or a failed write the
/// new claims are dropped and the old ones are untouched. Old values are only
/// released once the record no longer holds them.
pub async fn put_with_claims<T: Document>(
    state: &AppState,
    record: &Record<T>,
    old: &[ClaimValue<'_>],
    new: &[ClaimValue<'_>],
) -> Result<(), ApiError> {
    let changes = ClaimChanges::between(old, new);
    claim_all(state, record.clinic_id, record.id, &changes.acquire).await?;
    if let Err(e) = records::put(&state.s3, state.bucket(), record).await {
        release_all(state, record.clinic_id, record.id, &changes.acquire).await;
        return Err(e.into());
    }
    release_all(state, record.clinic_id, record.id, &changes.release).await;
    Ok(())
}
