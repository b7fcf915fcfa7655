use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use jiff::Timestamp;
use serde::Deserialize;
use uuid::Uuid;

use odonto_core::messages::UniqueField;
use odonto_core::models::Record;
use odonto_core::models::dentist::Dentist;
use odonto_storage::records;

use super::crud;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Owned so the CRO key (computed) and the email can be borrowed together.
fn unique_keys(dentist: &Dentist) -> (String, Option<String>) {
    (dentist.cro_key(), dentist.email.clone())
}

fn unique_values(keys: &(String, Option<String>)) -> [(UniqueField, Option<&str>); 2] {
    [
        (UniqueField::DentistCro, Some(keys.0.as_str())),
        (UniqueField::DentistEmail, keys.1.as_deref()),
    ]
}

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    pub active: Option<bool>,
}

pub async fn list_dentists(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ActiveQuery>,
) -> Result<Json<Vec<Record<Dentist>>>, ApiError> {
    let mut dentists = records::list::<Dentist>(&state.s3, state.bucket(), user.clinic_id).await?;
    if let Some(active) = query.active {
        dentists.retain(|d| d.data.active == active);
    }
    dentists.sort_by_key(|d| d.data.name.to_lowercase());
    Ok(Json(dentists))
}

pub async fn create_dentist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(mut dentist): Json<Dentist>,
) -> Result<Json<Record<Dentist>>, ApiError> {
    crud::prepare(&state, user.clinic_id, &mut dentist).await?;
    let record = Record::new(user.clinic_id, dentist, Timestamp::now());

    let keys = unique_keys(&record.data);
    crud::put_with_claims(&state, &record, &[], &unique_values(&keys)).await?;

    tracing::info!(clinic_id = %user.clinic_id, dentist_id = %record.id, "dentist created");
    Ok(Json(record))
}

pub async fn update_dentist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(mut dentist): Json<Dentist>,
) -> Result<Json<Record<Dentist>>, ApiError> {
    let mut record = records::get::<Dentist>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    crud::prepare(&state, user.clinic_id, &mut dentist).await?;

    let old = unique_keys(&record.data);
    let new = unique_keys(&dentist);
    record.replace(dentist, Timestamp::now());
    crud::put_with_claims(&state, &record, &unique_values(&old), &unique_values(&new)).await?;

    tracing::info!(clinic_id = %user.clinic_id, dentist_id = %id, "dentist updated");
    Ok(Json(record))
}

pub async fn delete_dentist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<()>, ApiError> {
    let removed = records::delete::<Dentist>(&state.s3, state.bucket(), user.clinic_id, id).await?;
    let keys = unique_keys(&removed.data);
    crud::release_all(&state, user.clinic_id, id, &unique_values(&keys)).await;

    tracing::info!(clinic_id = %user.clinic_id, dentist_id = %id, "dentist deleted");
    Ok(Json(()))
}
