use jiff::Timestamp;
use jiff::civil::Date;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::s3_keys::Collection;
use crate::validation::ValidationError;

pub mod appointment;
pub mod budget;
pub mod dentist;
pub mod employee;
pub mod expense;
pub mod installment;
pub mod patient;
pub mod patient_file;
pub mod payment_plan;
pub mod procedure;
pub mod schedule_block;
pub mod settings;

/// A row-like document stored in one of the clinic's collections.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// Trim/normalize user input, then check required fields.
    ///
    /// `today` is the clinic's current date, used by age-dependent rules.
    fn prepare(&mut self, today: Date) -> Result<(), ValidationError>;
}

/// A stored document: bookkeeping columns plus the entity's own fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Record<T> {
    pub fn new(clinic_id: Uuid, data: T, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            clinic_id,
            created_at: now,
            updated_at: now,
            data,
        }
    }

    /// Replace the entity fields, keeping identity and creation time.
    pub fn replace(&mut self, data: T, now: Timestamp) {
        self.data = data;
        self.updated_at = now;
    }
}
