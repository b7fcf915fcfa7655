use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::Document;
use crate::money::round_cents;
use crate::s3_keys::Collection;
use crate::validation::{self, ValidationError, blank_to_none};

/// Clinic overhead (rent, supplies, lab fees...). Unrelated to patients.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Expense {
    pub description: String,
    pub category: Option<String>,
    pub amount: f64,
    pub date: Date,
    #[serde(default)]
    pub paid: bool,
    pub notes: Option<String>,
}

impl Document for Expense {
    const COLLECTION: Collection = Collection::Expenses;

    fn prepare(&mut self, _today: Date) -> Result<(), ValidationError> {
        self.description = self.description.trim().to_string();
        validation::required("description", &self.description)?;
        validation::non_negative("amount", self.amount)?;
        self.amount = round_cents(self.amount);
        self.category = blank_to_none(self.category.take());
        self.notes = blank_to_none(self.notes.take());
        Ok(())
    }
}
