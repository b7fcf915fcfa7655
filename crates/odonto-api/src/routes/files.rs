use axum::Json;
use axum::extract::{Extension, Path, State};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use odonto_core::models::Record;
use odonto_core::models::patient::Patient;
use odonto_core::models::patient_file::{FileCategory, PatientFile};
use odonto_core::s3_keys;
use odonto_storage::{objects, records};

use super::crud;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub category: FileCategory,
    pub description: Option<String>,
    pub size_bytes: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UploadTicket {
    pub file: Record<PatientFile>,
    /// Presigned PUT; the client uploads the bytes here.
    pub upload_url: String,
}

#[derive(Debug, Serialize)]
pub struct DownloadUrl {
    pub url: String,
}

async fn load_file(
    state: &AppState,
    clinic_id: Uuid,
    patient_id: Uuid,
    file_id: Uuid,
) -> Result<Record<PatientFile>, ApiError> {
    let file = records::get::<PatientFile>(&state.s3, state.bucket(), clinic_id, file_id).await?;
    if file.data.patient_id != patient_id {
        return Err(ApiError::not_found());
    }
    Ok(file)
}

pub async fn list_files(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<Record<PatientFile>>>, ApiError> {
    records::get::<Patient>(&state.s3, state.bucket(), user.clinic_id, patient_id).await?;
    let mut files = records::list::<PatientFile>(&state.s3, state.bucket(), user.clinic_id).await?;
    files.retain(|f| f.data.patient_id == patient_id);
    files.sort_by_key(|f| std::cmp::Reverse(f.created_at));
    Ok(Json(files))
}

/// Register the file's metadata and hand back a URL to upload the bytes to.
pub async fn create_file(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(patient_id): Path<Uuid>,
    Json(new): Json<NewFile>,
) -> Result<Json<UploadTicket>, ApiError> {
    records::get::<Patient>(&state.s3, state.bucket(), user.clinic_id, patient_id).await?;

    let mut data = PatientFile {
        patient_id,
        category: new.category,
        file_name: new.file_name,
        content_type: new.content_type,
        description: new.description,
        s3_key: String::new(),
        size_bytes: new.size_bytes,
    };
    crud::prepare(&state, user.clinic_id, &mut data).await?;

    let mut record = Record::new(user.clinic_id, data, Timestamp::now());
    record.data.s3_key =
        s3_keys::patient_file_blob(user.clinic_id, patient_id, record.id, &record.data.file_name);

    let upload_url = objects::presign_put(
        &state.s3,
        state.bucket(),
        &record.data.s3_key,
        record.data.content_type.as_deref(),
        state.config.presign_expiry,
    )
    .await?;
    records::put(&state.s3, state.bucket(), &record).await?;

    tracing::info!(
        clinic_id = %user.clinic_id,
        patient_id = %patient_id,
        file_id = %record.id,
        category = ?record.data.category,
        "patient file registered"
    );
    Ok(Json(UploadTicket {
        file: record,
        upload_url,
    }))
}

pub async fn download_url(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((patient_id, file_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DownloadUrl>, ApiError> {
    let file = load_file(&state, user.clinic_id, patient_id, file_id).await?;
    let url = objects::presign_get(
        &state.s3,
        state.bucket(),
        &file.data.s3_key,
        Some(&file.data.file_name),
        state.config.presign_expiry,
    )
    .await?;
    Ok(Json(DownloadUrl { url }))
}

/// Remove the blob, then the metadata.
pub async fn delete_file(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((patient_id, file_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<()>, ApiError> {
    let file = load_file(&state, user.clinic_id, patient_id, file_id).await?;
    objects::delete_object(&state.s3, state.bucket(), &file.data.s3_key).await?;
    records::delete::<PatientFile>(&state.s3, state.bucket(), user.clinic_id, file_id).await?;

    tracing::info!(
        clinic_id = %user.clinic_id,
        patient_id = %patient_id,
        file_id = %file_id,
        "patient file deleted"
    );
    Ok(Json(()))
}
