use std::env;
use std::time::Duration;

/// Default lifetime of presigned upload/download URLs.
pub const DEFAULT_PRESIGN_SECS: u64 = 900;

#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct BillingConfig {
    pub stripe_secret_key: String,
    pub return_url: String,
}

/// Process configuration, read once at start-up.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bucket: String,
    pub region: String,
    pub cognito_user_pool_id: String,
    pub cognito_client_id: String,
    /// The user pool's JWKS document (`/.well-known/jwks.json`), verbatim.
    pub cognito_jwks: String,
    pub presign_expiry: Duration,
    /// `None` disables the calendar integration routes.
    pub google: Option<GoogleOAuthConfig>,
    /// `None` disables the billing portal route.
    pub billing: Option<BillingConfig>,
}

impl ApiConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| eyre::eyre!("{key} must be set"));

        let presign_secs = match get("PRESIGN_EXPIRY_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| eyre::eyre!("PRESIGN_EXPIRY_SECS: {e}"))?,
            None => DEFAULT_PRESIGN_SECS,
        };

        let google = match (
            get("GOOGLE_CLIENT_ID"),
            get("GOOGLE_CLIENT_SECRET"),
            get("GOOGLE_REDIRECT_URI"),
        ) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => Some(GoogleOAuthConfig {
                client_id,
                client_secret,
                redirect_uri,
            }),
            _ => None,
        };

        let billing = match (get("STRIPE_SECRET_KEY"), get("BILLING_RETURN_URL")) {
            (Some(stripe_secret_key), Some(return_url)) => Some(BillingConfig {
                stripe_secret_key,
                return_url,
            }),
            _ => None,
        };

        Ok(Self {
            bucket: get("ODONTO_BUCKET").unwrap_or_else(|| "odonto".to_string()),
            region: get("AWS_REGION").unwrap_or_else(|| "sa-east-1".to_string()),
            cognito_user_pool_id: require("COGNITO_USER_POOL_ID")?,
            cognito_client_id: require("COGNITO_CLIENT_ID")?,
            cognito_jwks: require("COGNITO_JWKS")?,
            presign_expiry: Duration::from_secs(presign_secs),
            google,
            billing,
        })
    }
}
