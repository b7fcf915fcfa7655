use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::Document;
use crate::s3_keys::Collection;
use crate::validation::{self, ValidationError, blank_to_none};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dentist {
    pub name: String,
    /// Regional council license number (CRO), e.g. `SP-12345`.
    pub cro: String,
    pub specialty: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Agenda color, `#rrggbb`.
    pub color: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Dentist {
    /// CRO as used for uniqueness: uppercase, no whitespace.
    pub fn cro_key(&self) -> String {
        self.cro
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase()
    }
}

impl Document for Dentist {
    const COLLECTION: Collection = Collection::Dentists;

    fn prepare(&mut self, _today: Date) -> Result<(), ValidationError> {
        self.name = self.name.trim().to_string();
        validation::required("name", &self.name)?;
        self.cro = self.cro.trim().to_uppercase();
        validation::required("cro", &self.cro)?;

        self.email = match blank_to_none(self.email.take()) {
            Some(raw) => Some(validation::normalize_email("email", &raw)?),
            None => None,
        };
        self.specialty = blank_to_none(self.specialty.take());
        self.phone = blank_to_none(self.phone.take());
        self.color = blank_to_none(self.color.take());

        if let Some(color) = &self.color {
            let hex = color.strip_prefix('#').unwrap_or("");
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ValidationError::new("color", "Cor inválida."));
            }
        }
        Ok(())
    }
}
