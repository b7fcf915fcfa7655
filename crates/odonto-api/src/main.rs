use tracing_subscriber::EnvFilter;

use odonto_api::config::ApiConfig;
use odonto_api::state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = ApiConfig::from_env()?;
    tracing::info!(
        bucket = %config.bucket,
        region = %config.region,
        calendar = config.google.is_some(),
        billing = config.billing.is_some(),
        "starting odonto-api"
    );
    let state = AppState::from_config(config).await?;

    lambda_http::run(odonto_api::router(state))
        .await
        .map_err(|e| eyre::eyre!(e))
}
