//! S3 key/path conventions.
//!
//! Pure string functions, no AWS SDK dependency. Every object belongs to a
//! clinic and lives under `clinics/{clinic_id}/`, which is what scopes reads
//! and writes to the authenticated tenant.

use uuid::Uuid;

pub fn clinic_prefix(clinic_id: Uuid) -> String {
    format!("clinics/{clinic_id}/")
}

/// A table-like collection of JSON documents, one object per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Patients,
    Dentists,
    Procedures,
    Appointments,
    Budgets,
    PaymentPlans,
    Installments,
    PatientFiles,
    ScheduleBlocks,
    Expenses,
    Employees,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Patients => "patients",
            Collection::Dentists => "dentists",
            Collection::Procedures => "procedures",
            Collection::Appointments => "appointments",
            Collection::Budgets => "budgets",
            Collection::PaymentPlans => "payment-plans",
            Collection::Installments => "installments",
            Collection::PatientFiles => "patient-files",
            Collection::ScheduleBlocks => "schedule-blocks",
            Collection::Expenses => "expenses",
            Collection::Employees => "employees",
        }
    }
}

pub fn collection_prefix(clinic_id: Uuid, collection: Collection) -> String {
    format!("clinics/{clinic_id}/{}/", collection.as_str())
}

pub fn record(clinic_id: Uuid, collection: Collection, id: Uuid) -> String {
    format!("clinics/{clinic_id}/{}/{id}.json", collection.as_str())
}

/// Blob for an uploaded patient document (x-ray, exam, ...).
///
/// The file name is reduced to a safe subset so it can't escape the prefix.
pub fn patient_file_blob(clinic_id: Uuid, patient_id: Uuid, file_id: Uuid, filename: &str) -> String {
    format!(
        "clinics/{clinic_id}/records/{patient_id}/{file_id}-{}",
        sanitize_filename(filename)
    )
}

pub fn unique_prefix(clinic_id: Uuid, index: &str) -> String {
    format!("clinics/{clinic_id}/unique/{index}/")
}

/// Claim object backing a uniqueness constraint. The value is expected to be
/// normalized already (digits-only CPF, lowercase email) and is hex-encoded,
/// so distinct values always get distinct keys.
pub fn unique_claim(clinic_id: Uuid, index: &str, value: &str) -> String {
    format!("clinics/{clinic_id}/unique/{index}/{}", hex::encode(value))
}

pub fn settings(clinic_id: Uuid) -> String {
    format!("clinics/{clinic_id}/settings.json")
}

pub fn calendar_integration(clinic_id: Uuid) -> String {
    format!("clinics/{clinic_id}/integrations/calendar.json")
}

pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '@' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}
