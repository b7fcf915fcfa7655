use odonto_auth::error::AuthError;
use odonto_auth::jwt::{CognitoClaims, JwtVerifier, check_claims, issuer_url};

fn claims(token_use: &str) -> CognitoClaims {
    CognitoClaims {
        sub: "6f1c1a4e-2f7b-4c55-9a0e-1d2b3c4d5e6f".to_string(),
        iss: issuer_url("sa-east-1", "sa-east-1_AbC123"),
        token_use: token_use.to_string(),
        exp: 2_000_000_000,
        iat: 1_700_000_000,
        aud: None,
        client_id: None,
        email: Some("clinica@exemplo.com".to_string()),
        username: None,
    }
}

#[test]
fn issuer_points_at_the_user_pool() {
    assert_eq!(
        issuer_url("sa-east-1", "sa-east-1_AbC123"),
        "https://cognito-idp.sa-east-1.amazonaws.com/sa-east-1_AbC123"
    );
}

#[test]
fn access_tokens_are_matched_on_client_id() {
    let mut access = claims("access");
    access.client_id = Some("app-client".to_string());
    assert!(check_claims(&access, "app-client").is_ok());
    assert!(check_claims(&access, "other-client").is_err());
}

#[test]
fn id_tokens_are_matched_on_audience() {
    let mut id = claims("id");
    assert!(check_claims(&id, "app-client").is_err());
    id.aud = Some("app-client".to_string());
    assert!(check_claims(&id, "app-client").is_ok());
}

#[test]
fn other_token_uses_are_rejected() {
    let mut refresh = claims("refresh");
    refresh.client_id = Some("app-client".to_string());
    let err = check_claims(&refresh, "app-client").unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(msg) if msg.contains("refresh")));
}

#[test]
fn clinic_id_comes_from_sub() {
    let c = claims("access");
    assert_eq!(
        c.clinic_id().unwrap().to_string(),
        "6f1c1a4e-2f7b-4c55-9a0e-1d2b3c4d5e6f"
    );

    let mut bad = claims("access");
    bad.sub = "not-a-uuid".to_string();
    assert!(bad.clinic_id().is_err());
}

#[test]
fn verifier_rejects_malformed_jwks_and_tokens() {
    assert!(matches!(
        JwtVerifier::from_jwks_json("not json", "sa-east-1", "pool", "client"),
        Err(AuthError::Jwks(_))
    ));

    let verifier = JwtVerifier::from_jwks_json(r#"{"keys":[]}"#, "sa-east-1", "pool", "client").unwrap();
    assert_eq!(verifier.key_count(), 0);
    assert!(verifier.verify("garbage").is_err());
}
