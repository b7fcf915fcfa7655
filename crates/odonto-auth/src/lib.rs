//! odonto-auth
//!
//! Cognito email/password flows and bearer token validation. Each account is
//! one clinic: the token's `sub` is the tenant id.

pub mod error;
pub mod flows;
pub mod jwt;
