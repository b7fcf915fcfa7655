use std::collections::HashMap;

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AuthError;

/// Claims extracted from a Cognito JWT.
#[derive(Debug, Clone, Deserialize)]
pub struct CognitoClaims {
    pub sub: String,
    pub iss: String,
    pub token_use: String,
    pub exp: u64,
    pub iat: u64,
    /// Present on id tokens.
    #[serde(default)]
    pub aud: Option<String>,
    /// Present on access tokens.
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl CognitoClaims {
    /// The tenant this token acts for.
    pub fn clinic_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AuthError::InvalidToken(format!("sub is not a uuid: {}", self.sub)))
    }
}

pub fn issuer_url(region: &str, user_pool_id: &str) -> String {
    format!("https://cognito-idp.{region}.amazonaws.com/{user_pool_id}")
}

/// Checks jsonwebtoken doesn't do for Cognito: `token_use` is `access` or
/// `id`, and the token was issued to our app client (`client_id` on access
/// tokens, `aud` on id tokens).
pub fn check_claims(claims: &CognitoClaims, app_client_id: &str) -> Result<(), AuthError> {
    let audience = match claims.token_use.as_str() {
        "access" => claims.client_id.as_deref(),
        "id" => claims.aud.as_deref(),
        other => {
            return Err(AuthError::InvalidToken(format!(
                "unexpected token_use: {other}"
            )));
        }
    };
    if audience != Some(app_client_id) {
        return Err(AuthError::InvalidToken("token issued to another client".to_string()));
    }
    Ok(())
}

/// Validates bearer tokens against the user pool's published signing keys.
///
/// The JWKS is supplied at start-up (it rarely rotates and the Lambda is
/// short-lived), keyed by `kid`.
#[derive(Clone)]
pub struct JwtVerifier {
    keys: HashMap<String, DecodingKey>,
    issuer: String,
    app_client_id: String,
}

impl JwtVerifier {
    pub fn from_jwks_json(
        jwks_json: &str,
        region: &str,
        user_pool_id: &str,
        app_client_id: &str,
    ) -> Result<Self, AuthError> {
        let set: JwkSet =
            serde_json::from_str(jwks_json).map_err(|e| AuthError::Jwks(e.to_string()))?;

        let mut keys = HashMap::new();
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                tracing::warn!("skipping JWK without kid");
                continue;
            };
            keys.insert(kid, DecodingKey::from_jwk(jwk)?);
        }

        Ok(Self {
            keys,
            issuer: issuer_url(region, user_pool_id),
            app_client_id: app_client_id.to_string(),
        })
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Validate a Cognito JWT: RS256 signature by a known key, issuer,
    /// expiry, then [`check_claims`].
    pub fn verify(&self, token: &str) -> Result<CognitoClaims, AuthError> {
        let header = decode_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("missing kid".to_string()))?;
        let key = self
            .keys
            .get(&kid)
            .ok_or_else(|| AuthError::InvalidToken(format!("unknown kid: {kid}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_exp = true;
        // Access tokens carry no `aud`; checked per token_use below.
        validation.validate_aud = false;

        let token_data = decode::<CognitoClaims>(token, key, &validation)?;
        check_claims(&token_data.claims, &self.app_client_id)?;

        Ok(token_data.claims)
    }
}
