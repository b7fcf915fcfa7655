use std::sync::Arc;

use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_s3::Client as S3Client;
use jiff::Timestamp;
use jiff::civil::Date;
use uuid::Uuid;

use odonto_auth::jwt::JwtVerifier;
use odonto_core::models::settings::ClinicSettings;
use odonto_storage::records;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub s3: S3Client,
    pub cognito: CognitoClient,
    pub verifier: Arc<JwtVerifier>,
    pub http: reqwest::Client,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Build clients from one shared AWS config.
    pub async fn from_config(config: ApiConfig) -> eyre::Result<Self> {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let verifier = JwtVerifier::from_jwks_json(
            &config.cognito_jwks,
            &config.region,
            &config.cognito_user_pool_id,
            &config.cognito_client_id,
        )?;
        tracing::info!(keys = verifier.key_count(), "loaded user pool signing keys");

        Ok(Self {
            s3: S3Client::new(&sdk_config),
            cognito: CognitoClient::new(&sdk_config),
            verifier: Arc::new(verifier),
            http: reqwest::Client::new(),
            config: Arc::new(config),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    pub async fn settings(&self, clinic_id: Uuid) -> Result<ClinicSettings, ApiError> {
        Ok(records::load_settings(&self.s3, self.bucket(), clinic_id).await?)
    }

    /// The clinic's current calendar date, in its configured time zone.
    pub async fn today(&self, clinic_id: Uuid) -> Result<Date, ApiError> {
        Ok(self.settings(clinic_id).await?.today(Timestamp::now()))
    }
}
