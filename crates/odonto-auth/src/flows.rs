use std::collections::HashMap;

use aws_sdk_cognitoidentityprovider::Client;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType};
use serde::Serialize;
use tracing::info;

use crate::error::AuthError;

/// Tokens returned by a successful sign-in or refresh.
#[derive(Debug, Clone, Serialize)]
pub struct Tokens {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: i32,
}

/// Result of a sign-up: the new account's `sub` and whether it still needs
/// the emailed confirmation code.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpResult {
    pub user_sub: String,
    pub confirmed: bool,
}

/// Register a clinic account. The email is the Cognito username.
pub async fn sign_up(
    client: &Client,
    user_pool_client_id: &str,
    email: &str,
    password: &str,
) -> Result<SignUpResult, AuthError> {
    info!(email = email, "signing up");

    let email_attr = AttributeType::builder()
        .name("email")
        .value(email)
        .build()
        .map_err(|e| AuthError::Cognito(e.to_string()))?;

    let resp = client
        .sign_up()
        .client_id(user_pool_client_id)
        .username(email)
        .password(password)
        .user_attributes(email_attr)
        .send()
        .await
        .map_err(|e| {
            let err = e.into_service_error();
            if err.is_username_exists_exception() {
                AuthError::UsernameExists
            } else if err.is_invalid_password_exception() {
                AuthError::InvalidPassword(err.to_string())
            } else {
                AuthError::Cognito(err.to_string())
            }
        })?;

    Ok(SignUpResult {
        user_sub: resp.user_sub().to_string(),
        confirmed: resp.user_confirmed(),
    })
}

/// Confirm a sign-up with the code Cognito emailed.
pub async fn confirm_sign_up(
    client: &Client,
    user_pool_client_id: &str,
    email: &str,
    code: &str,
) -> Result<(), AuthError> {
    info!(email = email, "confirming sign up");

    client
        .confirm_sign_up()
        .client_id(user_pool_client_id)
        .username(email)
        .confirmation_code(code)
        .send()
        .await
        .map_err(|e| {
            let err = e.into_service_error();
            if err.is_code_mismatch_exception() || err.is_expired_code_exception() {
                AuthError::InvalidCode
            } else {
                AuthError::Cognito(err.to_string())
            }
        })?;

    Ok(())
}

/// Email/password sign-in.
pub async fn initiate_auth(
    client: &Client,
    user_pool_client_id: &str,
    email: &str,
    password: &str,
) -> Result<Tokens, AuthError> {
    info!(email = email, "initiating auth");

    let mut auth_params = HashMap::new();
    auth_params.insert("USERNAME".to_string(), email.to_string());
    auth_params.insert("PASSWORD".to_string(), password.to_string());

    let resp = client
        .initiate_auth()
        .auth_flow(AuthFlowType::UserPasswordAuth)
        .client_id(user_pool_client_id)
        .set_auth_parameters(Some(auth_params))
        .send()
        .await
        .map_err(|e| {
            let err = e.into_service_error();
            if err.is_not_authorized_exception() || err.is_user_not_found_exception() {
                AuthError::InvalidCredentials
            } else if err.is_user_not_confirmed_exception() {
                AuthError::NotConfirmed
            } else {
                AuthError::Cognito(err.to_string())
            }
        })?;

    let result = resp.authentication_result().ok_or_else(|| {
        // Pools for this app have no MFA or custom challenges configured.
        AuthError::AuthFailed(format!(
            "unexpected challenge: {:?}",
            resp.challenge_name()
        ))
    })?;

    Ok(Tokens {
        access_token: result.access_token().unwrap_or_default().to_string(),
        id_token: result.id_token().unwrap_or_default().to_string(),
        refresh_token: result.refresh_token().unwrap_or_default().to_string(),
        expires_in: result.expires_in(),
    })
}

/// Refresh tokens using a refresh token.
pub async fn refresh_auth(
    client: &Client,
    user_pool_client_id: &str,
    refresh_token: &str,
) -> Result<Tokens, AuthError> {
    let mut auth_params = HashMap::new();
    auth_params.insert("REFRESH_TOKEN".to_string(), refresh_token.to_string());

    let resp = client
        .initiate_auth()
        .auth_flow(AuthFlowType::RefreshTokenAuth)
        .client_id(user_pool_client_id)
        .set_auth_parameters(Some(auth_params))
        .send()
        .await
        .map_err(|e| {
            let err = e.into_service_error();
            if err.is_not_authorized_exception() {
                AuthError::InvalidToken("refresh token rejected".to_string())
            } else {
                AuthError::Cognito(err.to_string())
            }
        })?;

    let result = resp
        .authentication_result()
        .ok_or_else(|| AuthError::AuthFailed("refresh failed".to_string()))?;

    Ok(Tokens {
        access_token: result.access_token().unwrap_or_default().to_string(),
        id_token: result.id_token().unwrap_or_default().to_string(),
        // Refresh token may not be returned on refresh
        refresh_token: result
            .refresh_token()
            .unwrap_or(refresh_token)
            .to_string(),
        expires_in: result.expires_in(),
    })
}

/// Revoke every token issued to the account behind `access_token`.
pub async fn global_sign_out(client: &Client, access_token: &str) -> Result<(), AuthError> {
    client
        .global_sign_out()
        .access_token(access_token)
        .send()
        .await
        .map_err(|e| {
            let err = e.into_service_error();
            if err.is_not_authorized_exception() {
                AuthError::InvalidToken("access token rejected".to_string())
            } else {
                AuthError::Cognito(err.to_string())
            }
        })?;

    Ok(())
}
