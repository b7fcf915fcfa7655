use std::collections::HashMap;
use std::time::Duration;

use odonto_api::config::{ApiConfig, DEFAULT_PRESIGN_SECS};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

const REQUIRED: [(&str, &str); 3] = [
    ("COGNITO_USER_POOL_ID", "sa-east-1_Test"),
    ("COGNITO_CLIENT_ID", "test-client"),
    ("COGNITO_JWKS", r#"{"keys":[]}"#),
];

#[test]
fn defaults_apply_when_only_cognito_is_set() {
    let config = ApiConfig::from_lookup(lookup(&REQUIRED)).unwrap();

    assert_eq!(config.bucket, "odonto");
    assert_eq!(config.region, "sa-east-1");
    assert_eq!(config.presign_expiry, Duration::from_secs(DEFAULT_PRESIGN_SECS));
    assert!(config.google.is_none());
    assert!(config.billing.is_none());
}

#[test]
fn cognito_settings_are_required() {
    let err = ApiConfig::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
    assert!(err.to_string().contains("COGNITO_JWKS"));
}

#[test]
fn blank_values_count_as_unset() {
    let mut pairs = REQUIRED.to_vec();
    pairs.push(("ODONTO_BUCKET", "   "));
    pairs.push(("COGNITO_CLIENT_ID", ""));
    let err = ApiConfig::from_lookup(lookup(&pairs)).unwrap_err();
    assert!(err.to_string().contains("COGNITO_CLIENT_ID"));
}

#[test]
fn integrations_need_every_setting() {
    let mut pairs = REQUIRED.to_vec();
    pairs.push(("GOOGLE_CLIENT_ID", "google-client"));
    pairs.push(("GOOGLE_CLIENT_SECRET", "google-secret"));
    pairs.push(("STRIPE_SECRET_KEY", "sk_test_123"));
    let partial = ApiConfig::from_lookup(lookup(&pairs)).unwrap();
    assert!(partial.google.is_none());
    assert!(partial.billing.is_none());

    pairs.push(("GOOGLE_REDIRECT_URI", "https://api.example.com/integrations/calendar/callback"));
    pairs.push(("BILLING_RETURN_URL", "https://app.example.com/settings"));
    let full = ApiConfig::from_lookup(lookup(&pairs)).unwrap();
    assert_eq!(full.google.unwrap().client_id, "google-client");
    assert_eq!(full.billing.unwrap().return_url, "https://app.example.com/settings");
}

#[test]
fn presign_expiry_is_read_in_seconds() {
    let mut pairs = REQUIRED.to_vec();
    pairs.push(("PRESIGN_EXPIRY_SECS", "60"));
    let config = ApiConfig::from_lookup(lookup(&pairs)).unwrap();
    assert_eq!(config.presign_expiry, Duration::from_secs(60));

    pairs.pop();
    pairs.push(("PRESIGN_EXPIRY_SECS", "soon"));
    assert!(ApiConfig::from_lookup(lookup(&pairs)).is_err());
}
