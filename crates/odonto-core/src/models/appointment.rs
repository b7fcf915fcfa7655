use jiff::ToSpan;
use jiff::civil::{Date, DateTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::Document;
use crate::s3_keys::Collection;
use crate::validation::{ValidationError, blank_to_none};

pub const DEFAULT_DURATION_MINUTES: u32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Appointment {
    pub patient_id: Uuid,
    pub dentist_id: Option<Uuid>,
    /// Clinic wall-clock time.
    pub starts_at: DateTime,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    /// Free-text label, usually a catalog procedure name.
    pub procedure: Option<String>,
    #[serde(default)]
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    Done,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Agendado",
            AppointmentStatus::Confirmed => "Confirmado",
            AppointmentStatus::Done => "Realizado",
            AppointmentStatus::Cancelled => "Cancelado",
            AppointmentStatus::NoShow => "Faltou",
        }
    }
}

impl Appointment {
    pub fn date(&self) -> Date {
        self.starts_at.date()
    }

    pub fn ends_at(&self) -> Result<DateTime, jiff::Error> {
        self.starts_at
            .checked_add(i64::from(self.duration_minutes).minutes())
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == AppointmentStatus::Cancelled
    }
}

impl Document for Appointment {
    const COLLECTION: Collection = Collection::Appointments;

    fn prepare(&mut self, _today: Date) -> Result<(), ValidationError> {
        if self.patient_id.is_nil() {
            return Err(ValidationError::new("patient_id", "Selecione o paciente."));
        }
        if self.duration_minutes == 0 {
            return Err(ValidationError::new(
                "duration_minutes",
                "Informe um valor maior que zero.",
            ));
        }
        self.procedure = blank_to_none(self.procedure.take());
        self.notes = blank_to_none(self.notes.take());
        Ok(())
    }
}
