//! odonto-storage
//!
//! S3 operations. Thin wrapper around the AWS S3 SDK, plus the clinic-scoped
//! document store built on top of it.

pub mod error;
pub mod objects;
pub mod records;
pub mod unique;
