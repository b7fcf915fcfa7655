use serde_json::json;

use odonto_core::error::CoreError;
use odonto_core::installments::InterestRates;
use odonto_core::models::settings::{CURRENT_VERSION, ClinicSettings};

#[test]
fn unversioned_settings_get_default_rates() {
    let settings = ClinicSettings::from_json(json!({ "clinic_name": "Sorriso" })).unwrap();
    assert_eq!(settings.config_version, CURRENT_VERSION);
    assert_eq!(settings.interest_rates, InterestRates::default());
    assert_eq!(settings.clinic_name, "Sorriso");
}

#[test]
fn legacy_percentage_rates_are_converted() {
    let settings = ClinicSettings::from_json(json!({
        "clinic_name": "Sorriso",
        "boleto_rate": 2.0,
        "card_rate": 3.5
    }))
    .unwrap();
    assert_eq!(settings.interest_rates.boleto, 0.02);
    assert_eq!(settings.interest_rates.card, 0.035);
}

#[test]
fn newer_versions_are_refused() {
    let err = ClinicSettings::from_json(json!({
        "config_version": CURRENT_VERSION + 1,
        "clinic_name": "Sorriso"
    }))
    .unwrap_err();
    assert!(matches!(err, CoreError::UnsupportedSettingsVersion { .. }));
}

#[test]
fn current_documents_round_trip_unchanged() {
    let mut original = ClinicSettings::default();
    original.interest_rates.card = 0.0299;
    let parsed = ClinicSettings::from_json(serde_json::to_value(&original).unwrap()).unwrap();
    assert_eq!(parsed.interest_rates.card, 0.0299);
}

#[test]
fn prepare_rejects_out_of_range_rates() {
    let mut settings = ClinicSettings::default();
    settings.interest_rates.boleto = 1.5;
    let err = settings.prepare().unwrap_err();
    assert_eq!(err.field, "interest_rates.boleto");
}

#[test]
fn prepare_drops_blank_clauses() {
    let mut settings = ClinicSettings {
        time_zone: "UTC".to_string(),
        contract_clauses: vec!["Cláusula 1".to_string(), "  ".to_string()],
        ..ClinicSettings::default()
    };
    settings.prepare().unwrap();
    assert_eq!(settings.contract_clauses.len(), 1);
}
