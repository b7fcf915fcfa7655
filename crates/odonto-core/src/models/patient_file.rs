use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::Document;
use crate::s3_keys::Collection;
use crate::validation::{self, ValidationError, blank_to_none};

/// Metadata for a document uploaded to a patient's record. The bytes live
/// at `s3_key`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PatientFile {
    pub patient_id: Uuid,
    pub category: FileCategory,
    pub file_name: String,
    pub content_type: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub s3_key: String,
    pub size_bytes: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FileCategory {
    XRay,
    BloodTest,
    Other,
}

impl Document for PatientFile {
    const COLLECTION: Collection = Collection::PatientFiles;

    fn prepare(&mut self, _today: Date) -> Result<(), ValidationError> {
        self.file_name = self.file_name.trim().to_string();
        validation::required("file_name", &self.file_name)?;
        self.description = blank_to_none(self.description.take());
        self.content_type = blank_to_none(self.content_type.take());
        Ok(())
    }
}
