//! Uniqueness constraints over a key-value store.
//!
//! A value is claimed by writing `unique/{index}/{value}` with
//! `If-None-Match: *`, so two concurrent creates can't both win. The claim
//! records which record owns it; re-claiming your own value is a no-op.

use aws_sdk_s3::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use odonto_core::messages::UniqueField;
use odonto_core::s3_keys;

use crate::error::StorageError;
use crate::objects;
use crate::records;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub owner: Uuid,
}

/// Claim `value` for `owner`. Fails with `AlreadyClaimed` when another record
/// holds it.
pub async fn claim(
    client: &Client,
    bucket: &str,
    clinic_id: Uuid,
    field: UniqueField,
    value: &str,
    owner: Uuid,
) -> Result<(), StorageError> {
    let key = s3_keys::unique_claim(clinic_id, field.index(), value);
    let body = serde_json::to_vec(&Claim { owner })?;
    match objects::put_object_if_none_match(client, bucket, &key, body, Some("application/json"))
        .await
    {
        Ok(_) => Ok(()),
        Err(StorageError::PreconditionFailed { .. }) => {
            match records::load_json_opt::<Claim>(client, bucket, &key).await? {
                Some(existing) if existing.owner == owner => Ok(()),
                _ => {
                    tracing::info!(index = field.index(), "unique claim rejected");
                    Err(StorageError::AlreadyClaimed { field })
                }
            }
        }
        Err(e) => Err(e),
    }
}

/// Drop `owner`'s claim on `value`. Claims held by other records are left alone.
pub async fn release(
    client: &Client,
    bucket: &str,
    clinic_id: Uuid,
    field: UniqueField,
    value: &str,
    owner: Uuid,
) -> Result<(), StorageError> {
    let key = s3_keys::unique_claim(clinic_id, field.index(), value);
    match records::load_json_opt::<Claim>(client, bucket, &key).await? {
        Some(existing) if existing.owner == owner => objects::delete_object(client, bucket, &key).await,
        Some(_) => {
            tracing::warn!(index = field.index(), "not releasing claim owned by another record");
            Ok(())
        }
        None => Ok(()),
    }
}

/// One constrained field and its value, `None` when the field is empty.
pub type ClaimValue<'a> = (UniqueField, Option<&'a str>);

/// What an edit does to a record's claims: values to take before the record is
/// written, and values to give up once it has been.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClaimChanges<'a> {
    pub acquire: Vec<ClaimValue<'a>>,
    pub release: Vec<ClaimValue<'a>>,
}

impl<'a> ClaimChanges<'a> {
    /// Compare the values stored on a record with the edited ones. Fields
    /// missing from `old` count as empty, so a create is `between(&[], new)`.
    pub fn between(old: &[ClaimValue<'a>], new: &[ClaimValue<'a>]) -> Self {
        let before = |field: UniqueField| {
            old.iter()
                .find(|(f, _)| *f == field)
                .and_then(|&(_, value)| value)
        };
        let mut changes = Self::default();
        for &(field, after) in new {
            let previous = before(field);
            if previous == after {
                continue;
            }
            if after.is_some() {
                changes.acquire.push((field, after));
            }
            if previous.is_some() {
                changes.release.push((field, previous));
            }
        }
        changes
    }

    pub fn is_empty(&self) -> bool {
        self.acquire.is_empty() && self.release.is_empty()
    }
}
