//! Clinic-scoped JSON documents: one S3 object per record.

use aws_sdk_s3::Client;
use jiff::Timestamp;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use odonto_core::models::settings::ClinicSettings;
use odonto_core::models::{Document, Record};
use odonto_core::s3_keys;

use crate::error::StorageError;
use crate::objects;

/// Load a JSON document from S3.
pub async fn load_json<T: DeserializeOwned>(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<T, StorageError> {
    let body = objects::get_object(client, bucket, key).await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Like [`load_json`], but a missing object is `None` rather than an error.
pub async fn load_json_opt<T: DeserializeOwned>(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match load_json(client, bucket, key).await {
        Ok(value) => Ok(Some(value)),
        Err(StorageError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Save a JSON document to S3.
pub async fn save_json<T: Serialize>(
    client: &Client,
    bucket: &str,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let body = serde_json::to_vec_pretty(value)?;
    objects::put_object(client, bucket, key, body, Some("application/json")).await
}

/// All records of `T`'s collection for a clinic, oldest first.
///
/// A document that no longer parses is skipped with a warning so one bad row
/// doesn't take the whole screen down.
pub async fn list<T: Document>(
    client: &Client,
    bucket: &str,
    clinic_id: Uuid,
) -> Result<Vec<Record<T>>, StorageError> {
    let prefix = s3_keys::collection_prefix(clinic_id, T::COLLECTION);
    let keys = objects::list_objects(client, bucket, &prefix).await?;

    let mut records = Vec::with_capacity(keys.len());
    for key in keys.iter().filter(|k| k.ends_with(".json")) {
        match load_json::<Record<T>>(client, bucket, key).await {
            Ok(record) if record.clinic_id == clinic_id => records.push(record),
            Ok(_) => tracing::warn!(key = %key, "record clinic does not match its prefix"),
            // Deleted between list and get.
            Err(StorageError::NotFound { .. }) => {}
            Err(StorageError::Serialization(e)) => {
                tracing::warn!(key = %key, error = %e, "skipping unreadable record");
            }
            Err(e) => return Err(e),
        }
    }
    records.sort_by_key(|r| r.created_at);
    Ok(records)
}

/// Fetch one record. Another clinic's id is indistinguishable from a missing one.
pub async fn get<T: Document>(
    client: &Client,
    bucket: &str,
    clinic_id: Uuid,
    id: Uuid,
) -> Result<Record<T>, StorageError> {
    let key = s3_keys::record(clinic_id, T::COLLECTION, id);
    let record = load_json::<Record<T>>(client, bucket, &key).await?;
    if record.clinic_id != clinic_id {
        return Err(StorageError::NotFound { key });
    }
    Ok(record)
}

/// Write a record to its clinic's collection.
pub async fn put<T: Document>(
    client: &Client,
    bucket: &str,
    record: &Record<T>,
) -> Result<(), StorageError> {
    let key = s3_keys::record(record.clinic_id, T::COLLECTION, record.id);
    save_json(client, bucket, &key, record).await?;
    tracing::debug!(collection = T::COLLECTION.as_str(), id = %record.id, "record saved");
    Ok(())
}

/// Create a record with a fresh id.
pub async fn insert<T: Document>(
    client: &Client,
    bucket: &str,
    clinic_id: Uuid,
    data: T,
) -> Result<Record<T>, StorageError> {
    let record = Record::new(clinic_id, data, Timestamp::now());
    put(client, bucket, &record).await?;
    Ok(record)
}

/// Delete a record. Deleting a missing record is `NotFound`.
pub async fn delete<T: Document>(
    client: &Client,
    bucket: &str,
    clinic_id: Uuid,
    id: Uuid,
) -> Result<Record<T>, StorageError> {
    let existing = get::<T>(client, bucket, clinic_id, id).await?;
    let key = s3_keys::record(clinic_id, T::COLLECTION, id);
    objects::delete_object(client, bucket, &key).await?;
    tracing::debug!(collection = T::COLLECTION.as_str(), id = %id, "record deleted");
    Ok(existing)
}

/// The clinic's settings, migrated to the current version. A clinic that
/// never saved settings gets the defaults.
pub async fn load_settings(
    client: &Client,
    bucket: &str,
    clinic_id: Uuid,
) -> Result<ClinicSettings, StorageError> {
    let key = s3_keys::settings(clinic_id);
    match load_json_opt::<serde_json::Value>(client, bucket, &key).await? {
        Some(raw) => Ok(ClinicSettings::from_json(raw)?),
        None => Ok(ClinicSettings::default()),
    }
}

pub async fn save_settings(
    client: &Client,
    bucket: &str,
    clinic_id: Uuid,
    settings: &ClinicSettings,
) -> Result<(), StorageError> {
    save_json(client, bucket, &s3_keys::settings(clinic_id), settings).await
}
