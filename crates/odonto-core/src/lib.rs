//! odonto-core
//!
//! Pure domain types, tenant-scoped S3 key conventions, and the small amount of
//! clinic arithmetic (installments, agenda filtering, report aggregates).
//! No AWS SDK dependency; this is the shared vocabulary of the Odonto system.

pub mod agenda;
pub mod error;
pub mod installments;
pub mod messages;
pub mod models;
pub mod money;
pub mod odontogram;
pub mod reports;
pub mod s3_keys;
pub mod validation;
