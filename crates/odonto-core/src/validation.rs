//! Field-level checks run before anything is written.
//!
//! Messages are pt-BR; they are shown next to the offending form field.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Error)]
#[ts(export)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub fn required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "Campo obrigatório."));
    }
    Ok(())
}

pub fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(field, "Informe um valor maior ou igual a zero."));
    }
    Ok(())
}

pub fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::new(field, "Informe um valor maior que zero."));
    }
    Ok(())
}

/// Trim and turn blank strings into `None`.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reduce a CPF to its 11 digits. Punctuation (`123.456.789-09`) is accepted.
pub fn normalize_cpf(field: &str, raw: &str) -> Result<String, ValidationError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let has_garbage = raw
        .chars()
        .any(|c| !c.is_ascii_digit() && !matches!(c, '.' | '-' | ' '));
    if digits.len() != 11 || has_garbage {
        return Err(ValidationError::new(field, "CPF deve conter 11 dígitos."));
    }
    Ok(digits)
}

pub fn format_cpf(digits: &str) -> String {
    if digits.len() != 11 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return digits.to_string();
    }
    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}

pub fn normalize_email(field: &str, raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::new(field, "E-mail inválido."));
    }
    Ok(email)
}
