//! odonto-export
//!
//! Printable documents (contract, budget) rendered from Tera templates to HTML
//! or DOCX, and CSV report exports.

pub mod budget;
pub mod contract;
pub mod csv;
pub mod docx;
pub mod error;
pub mod render;
pub mod styles;
