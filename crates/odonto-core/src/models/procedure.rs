use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::Document;
use crate::money::round_cents;
use crate::s3_keys::Collection;
use crate::validation::{self, ValidationError, blank_to_none};

/// Catalog entry for a billable procedure.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Procedure {
    pub name: String,
    pub base_price: f64,
    pub duration_minutes: Option<u32>,
    pub category: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Document for Procedure {
    const COLLECTION: Collection = Collection::Procedures;

    fn prepare(&mut self, _today: Date) -> Result<(), ValidationError> {
        self.name = self.name.trim().to_string();
        validation::required("name", &self.name)?;
        validation::non_negative("base_price", self.base_price)?;
        self.base_price = round_cents(self.base_price);
        if self.duration_minutes == Some(0) {
            return Err(ValidationError::new(
                "duration_minutes",
                "Informe um valor maior que zero.",
            ));
        }
        self.category = blank_to_none(self.category.take());
        Ok(())
    }
}
