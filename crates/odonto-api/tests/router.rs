use std::collections::HashMap;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use odonto_api::config::ApiConfig;
use odonto_api::state::AppState;
use odonto_auth::jwt::JwtVerifier;
use odonto_core::messages;

/// Header `{"alg":"RS256","kid":"unknown-key","typ":"JWT"}`, payload `{"sub": "x"}`.
const UNKNOWN_KID_TOKEN: &str =
    "eyJhbGciOiJSUzI1NiIsImtpZCI6InVua25vd24ta2V5IiwidHlwIjoiSldUIn0.eyJzdWIiOiAieCJ9.c2ln";

fn test_config(extra: &[(&str, &str)]) -> ApiConfig {
    let mut vars: HashMap<String, String> = [
        ("COGNITO_USER_POOL_ID", "sa-east-1_Test"),
        ("COGNITO_CLIENT_ID", "test-client"),
        ("COGNITO_JWKS", r#"{"keys":[]}"#),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    ApiConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

/// State with clients that are never reached: every request here is settled
/// before any AWS call.
fn test_state(config: ApiConfig) -> AppState {
    use aws_sdk_s3::config::{BehaviorVersion, Region};

    let s3 = aws_sdk_s3::Client::from_conf(
        aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("sa-east-1"))
            .build(),
    );
    let cognito = aws_sdk_cognitoidentityprovider::Client::from_conf(
        aws_sdk_cognitoidentityprovider::Config::builder()
            .behavior_version(aws_sdk_cognitoidentityprovider::config::BehaviorVersion::latest())
            .region(aws_sdk_cognitoidentityprovider::config::Region::new("sa-east-1"))
            .build(),
    );
    let verifier = JwtVerifier::from_jwks_json(
        &config.cognito_jwks,
        &config.region,
        &config.cognito_user_pool_id,
        &config.cognito_client_id,
    )
    .unwrap();

    AppState {
        s3,
        cognito,
        verifier: std::sync::Arc::new(verifier),
        http: reqwest::Client::new(),
        config: std::sync::Arc::new(config),
    }
}

fn app() -> Router {
    odonto_api::router(test_state(test_config(&[])))
}

fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_needs_no_token() {
    let response = app().oneshot(request("GET", "/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn missing_token_returns_401() {
    let response = app().oneshot(request("GET", "/patients", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], messages::UNAUTHORIZED);
    assert!(body.get("field").is_none());
}

#[tokio::test]
async fn garbage_token_returns_401() {
    let response = app()
        .oneshot(request("GET", "/reports/summary?from=2025-01-01&to=2025-01-31", Some("not-a-jwt")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_by_unknown_key_returns_401() {
    let response = app()
        .oneshot(request("GET", "/settings", Some(UNKNOWN_KID_TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn every_collection_is_behind_auth() {
    for path in [
        "/patients",
        "/dentists",
        "/procedures",
        "/appointments",
        "/budgets",
        "/payment-plans",
        "/installments",
        "/schedule-blocks",
        "/expenses",
        "/employees",
        "/agenda?from=2025-01-01&to=2025-01-07",
    ] {
        let response = app().oneshot(request("GET", path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
async fn unknown_route_is_404() {
    let response = app().oneshot(request("GET", "/nope", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sign_in_rejects_malformed_email_before_calling_cognito() {
    let response = app()
        .oneshot(json_request(
            "POST",
            "/auth/sign-in",
            r#"{"email":"not-an-email","password":"segredo123"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["field"], "email");
    assert_eq!(body["error"], "E-mail inválido.");
}

#[tokio::test]
async fn sign_in_rejects_non_json_body() {
    let response = app()
        .oneshot(json_request("POST", "/auth/sign-in", "email=a@b.com"))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn sign_out_without_token_returns_401() {
    let response = app()
        .oneshot(request("POST", "/auth/sign-out", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn calendar_callback_is_disabled_without_google_config() {
    let response = app()
        .oneshot(request(
            "GET",
            "/integrations/calendar/callback?code=abc&state=6f1c1a4e-2f7b-4c55-9a0e-1d2b3c4d5e6f",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], messages::INTEGRATION_DISABLED);
}

#[tokio::test]
async fn calendar_callback_rejects_a_bad_state() {
    let config = test_config(&[
        ("GOOGLE_CLIENT_ID", "google-client"),
        ("GOOGLE_CLIENT_SECRET", "google-secret"),
        ("GOOGLE_REDIRECT_URI", "https://api.example.com/integrations/calendar/callback"),
    ]);
    let app = odonto_api::router(test_state(config));

    let response = app
        .oneshot(request(
            "GET",
            "/integrations/calendar/callback?code=abc&state=not-a-clinic",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cors_preflight_is_answered_without_auth() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/patients")
        .header("Origin", "https://app.example.com")
        .header("Access-Control-Request-Method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
