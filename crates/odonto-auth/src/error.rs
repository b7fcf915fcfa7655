use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("account not confirmed")]
    NotConfirmed,

    #[error("an account with this email already exists")]
    UsernameExists,

    #[error("password does not meet the pool policy: {0}")]
    InvalidPassword(String),

    #[error("confirmation code is wrong or expired")]
    InvalidCode,

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("invalid JWKS: {0}")]
    Jwks(String),

    #[error("Cognito error: {0}")]
    Cognito(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}
