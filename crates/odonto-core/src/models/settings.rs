use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::error::CoreError;
use crate::installments::InterestRates;
use crate::validation::{self, ValidationError, blank_to_none};

/// Current settings version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding step in [`migrate`].
pub const CURRENT_VERSION: u32 = 1;

pub const DEFAULT_TIME_ZONE: &str = "America/Sao_Paulo";

/// Per-clinic configuration, editable from the settings screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClinicSettings {
    /// Schema version. Missing or 0 = pre-versioned document.
    #[serde(default)]
    pub config_version: u32,
    pub clinic_name: String,
    /// CNPJ or CPF printed on contracts.
    pub document: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub interest_rates: InterestRates,
    /// Extra clauses appended to printed contracts, one paragraph each.
    #[serde(default)]
    pub contract_clauses: Vec<String>,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Customer id at the billing provider, set when the clinic subscribes.
    pub billing_customer_id: Option<String>,
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

impl Default for ClinicSettings {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            clinic_name: "Minha Clínica".to_string(),
            document: None,
            address: None,
            city: None,
            phone: None,
            email: None,
            interest_rates: InterestRates::default(),
            contract_clauses: Vec::new(),
            time_zone: default_time_zone(),
            billing_customer_id: None,
        }
    }
}

impl ClinicSettings {
    /// Parse a stored settings document, migrating older versions first.
    pub fn from_json(json: Value) -> Result<Self, CoreError> {
        let on_disk_version = json
            .get("config_version")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32;
        let migrated = migrate(json, on_disk_version)?;
        Ok(serde_json::from_value(migrated)?)
    }

    /// Check user-edited values and stamp the current version.
    pub fn prepare(&mut self) -> Result<(), ValidationError> {
        self.config_version = CURRENT_VERSION;
        self.clinic_name = self.clinic_name.trim().to_string();
        validation::required("clinic_name", &self.clinic_name)?;
        for (field, rate) in [
            ("interest_rates.boleto", self.interest_rates.boleto),
            ("interest_rates.card", self.interest_rates.card),
        ] {
            if !rate.is_finite() || !(0.0..1.0).contains(&rate) {
                return Err(ValidationError::new(field, "Taxa de juros inválida."));
            }
        }
        if TimeZone::get(&self.time_zone).is_err() {
            return Err(ValidationError::new("time_zone", "Fuso horário desconhecido."));
        }
        self.email = match blank_to_none(self.email.take()) {
            Some(raw) => Some(validation::normalize_email("email", &raw)?),
            None => None,
        };
        self.document = blank_to_none(self.document.take());
        self.address = blank_to_none(self.address.take());
        self.city = blank_to_none(self.city.take());
        self.phone = blank_to_none(self.phone.take());
        self.contract_clauses.retain(|c| !c.trim().is_empty());
        Ok(())
    }

    /// The clinic's current calendar date.
    pub fn today(&self, now: Timestamp) -> Date {
        match TimeZone::get(&self.time_zone) {
            Ok(tz) => now.to_zoned(tz).date(),
            Err(e) => {
                tracing::warn!(time_zone = %self.time_zone, error = %e, "unknown time zone, using UTC");
                now.to_zoned(TimeZone::UTC).date()
            }
        }
    }
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value.
pub fn migrate(mut json: Value, from_version: u32) -> Result<Value, CoreError> {
    if from_version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedSettingsVersion {
            found: from_version,
            supported: CURRENT_VERSION,
        });
    }

    // v0 → v1: rates moved from top-level percentages (`boleto_rate: 1.5`)
    // into `interest_rates` as fractions.
    if from_version < 1 {
        let obj = json.as_object_mut().ok_or(CoreError::MalformedSettings)?;
        let defaults = InterestRates::default();
        let legacy = |key: &str, fallback: f64| {
            obj.get(key)
                .and_then(Value::as_f64)
                .map(|percent| percent / 100.0)
                .unwrap_or(fallback)
        };
        let rates = InterestRates {
            boleto: legacy("boleto_rate", defaults.boleto),
            card: legacy("card_rate", defaults.card),
        };
        obj.remove("boleto_rate");
        obj.remove("card_rate");
        if !obj.contains_key("interest_rates") {
            obj.insert("interest_rates".to_string(), serde_json::to_value(rates)?);
        }
        obj.entry("clinic_name")
            .or_insert(Value::String(ClinicSettings::default().clinic_name));
        obj.insert("config_version".to_string(), Value::Number(1.into()));
        tracing::info!("migrated clinic settings v0 → v1 (interest_rates)");
    }

    // Future migrations go here:
    // if from_version < 2 { ... }

    Ok(json)
}
