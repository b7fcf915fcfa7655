use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::Document;
use crate::s3_keys::Collection;
use crate::validation::{self, ValidationError, blank_to_none};

/// Age below which a guardian must be on file.
pub const ADULT_AGE: i16 = 18;

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Patient {
    pub name: String,
    /// Digits only once prepared.
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<Date>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_cpf: Option<String>,
    pub guardian_phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Gender {
    Female,
    Male,
    Other,
}

impl Patient {
    /// Whole years completed on `today`, if the birth date is known.
    pub fn age_on(&self, today: Date) -> Option<i16> {
        let birth = self.birth_date?;
        let mut age = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        Some(age)
    }

    pub fn is_minor(&self, today: Date) -> bool {
        self.age_on(today).is_some_and(|age| age < ADULT_AGE)
    }
}

impl Document for Patient {
    const COLLECTION: Collection = Collection::Patients;

    fn prepare(&mut self, today: Date) -> Result<(), ValidationError> {
        self.name = self.name.trim().to_string();
        validation::required("name", &self.name)?;

        self.cpf = match blank_to_none(self.cpf.take()) {
            Some(raw) => Some(validation::normalize_cpf("cpf", &raw)?),
            None => None,
        };
        self.email = match blank_to_none(self.email.take()) {
            Some(raw) => Some(validation::normalize_email("email", &raw)?),
            None => None,
        };
        self.guardian_cpf = match blank_to_none(self.guardian_cpf.take()) {
            Some(raw) => Some(validation::normalize_cpf("guardian_cpf", &raw)?),
            None => None,
        };
        self.phone = blank_to_none(self.phone.take());
        self.address = blank_to_none(self.address.take());
        self.city = blank_to_none(self.city.take());
        self.state = blank_to_none(self.state.take());
        self.zip_code = blank_to_none(self.zip_code.take());
        self.notes = blank_to_none(self.notes.take());
        self.guardian_name = blank_to_none(self.guardian_name.take());
        self.guardian_phone = blank_to_none(self.guardian_phone.take());

        if let Some(birth) = self.birth_date
            && birth > today
        {
            return Err(ValidationError::new(
                "birth_date",
                "Data de nascimento não pode estar no futuro.",
            ));
        }

        if self.is_minor(today) && self.guardian_name.is_none() {
            return Err(ValidationError::new(
                "guardian_name",
                "Informe o responsável para pacientes menores de idade.",
            ));
        }

        Ok(())
    }
}
