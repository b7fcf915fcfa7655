use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::Document;
use crate::s3_keys::Collection;
use crate::validation::{ValidationError, blank_to_none};

/// A period when the agenda is closed, for one dentist or the whole clinic.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScheduleBlock {
    /// `None` blocks every dentist.
    pub dentist_id: Option<Uuid>,
    pub start_date: Date,
    /// Inclusive.
    pub end_date: Date,
    pub kind: BlockKind,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum BlockKind {
    Vacation,
    DayOff,
    Holiday,
}

impl ScheduleBlock {
    pub fn covers(&self, date: Date) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Whether this block closes `dentist`'s agenda (or the clinic-wide
    /// agenda when `dentist` is `None`) on `date`.
    pub fn blocks(&self, dentist: Option<Uuid>, date: Date) -> bool {
        if !self.covers(date) {
            return false;
        }
        match (self.dentist_id, dentist) {
            (None, _) => true,
            (Some(own), Some(other)) => own == other,
            (Some(_), None) => false,
        }
    }
}

impl Document for ScheduleBlock {
    const COLLECTION: Collection = Collection::ScheduleBlocks;

    fn prepare(&mut self, _today: Date) -> Result<(), ValidationError> {
        if self.end_date < self.start_date {
            return Err(ValidationError::new(
                "end_date",
                "Data final anterior à data inicial.",
            ));
        }
        self.reason = blank_to_none(self.reason.take());
        Ok(())
    }
}
