use thiserror::Error;

use crate::installments::QuoteError;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid uuid: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid date arithmetic: {0}")]
    Date(#[from] jiff::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error("settings version {found} is newer than supported ({supported})")]
    UnsupportedSettingsVersion { found: u32, supported: u32 },

    #[error("settings document is not a JSON object")]
    MalformedSettings,
}
