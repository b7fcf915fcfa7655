//! User-facing messages (pt-BR) for failures the frontend shows as toasts.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const GENERIC_ERROR: &str = "Ocorreu um erro inesperado. Tente novamente.";
pub const NOT_FOUND: &str = "Registro não encontrado.";
pub const UNAUTHORIZED: &str = "Sessão expirada. Entre novamente.";
pub const INVALID_CREDENTIALS: &str = "E-mail ou senha inválidos.";
pub const INTEGRATION_DISABLED: &str = "Integração não configurada.";

/// A uniqueness constraint enforced by the hosted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum UniqueField {
    PatientCpf,
    PatientEmail,
    DentistCro,
    DentistEmail,
}

impl UniqueField {
    /// Name of the index directory the claims for this constraint live in.
    pub fn index(self) -> &'static str {
        match self {
            UniqueField::PatientCpf => "patient-cpf",
            UniqueField::PatientEmail => "patient-email",
            UniqueField::DentistCro => "dentist-cro",
            UniqueField::DentistEmail => "dentist-email",
        }
    }

    pub fn violation_message(self) -> &'static str {
        match self {
            UniqueField::PatientCpf => "Já existe paciente com este CPF.",
            UniqueField::PatientEmail => "Já existe paciente com este e-mail.",
            UniqueField::DentistCro => "Já existe dentista com este CRO.",
            UniqueField::DentistEmail => "Já existe dentista com este e-mail.",
        }
    }
}
