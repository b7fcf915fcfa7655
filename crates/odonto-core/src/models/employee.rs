use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::Document;
use crate::money::round_cents;
use crate::s3_keys::Collection;
use crate::validation::{self, ValidationError, blank_to_none};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Employee {
    pub name: String,
    pub role: Option<String>,
    pub salary: Option<f64>,
    pub hire_date: Option<Date>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Document for Employee {
    const COLLECTION: Collection = Collection::Employees;

    fn prepare(&mut self, _today: Date) -> Result<(), ValidationError> {
        self.name = self.name.trim().to_string();
        validation::required("name", &self.name)?;
        if let Some(salary) = self.salary {
            validation::non_negative("salary", salary)?;
            self.salary = Some(round_cents(salary));
        }
        self.email = match blank_to_none(self.email.take()) {
            Some(raw) => Some(validation::normalize_email("email", &raw)?),
            None => None,
        };
        self.role = blank_to_none(self.role.take());
        self.phone = blank_to_none(self.phone.take());
        Ok(())
    }
}
