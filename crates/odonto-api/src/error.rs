use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use odonto_auth::error::AuthError;
use odonto_core::error::CoreError;
use odonto_core::installments::QuoteError;
use odonto_core::messages;
use odonto_core::validation::ValidationError;
use odonto_export::error::ExportError;
use odonto_storage::error::StorageError;

/// Unified API error type for all route handlers.
///
/// Every variant except `Internal` carries a message meant for the user;
/// `Internal` carries diagnostics that are logged and replaced by a generic
/// message.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    /// 422: a field failed validation.
    Validation(ValidationError),
    /// 409: a uniqueness constraint was violated.
    Conflict(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl ApiError {
    pub fn not_found() -> Self {
        ApiError::NotFound(messages::NOT_FOUND.to_string())
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(ValidationError::new(field, message))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, field) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.message, Some(e.field)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    messages::GENERIC_ERROR.to_string(),
                    None,
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                field,
            }),
        )
            .into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { key } => {
                tracing::debug!(key = %key, "object not found");
                ApiError::not_found()
            }
            StorageError::AlreadyClaimed { field } => {
                ApiError::Conflict(field.violation_message().to_string())
            }
            StorageError::Core(core) => core.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Validation(v) => ApiError::Validation(v),
            CoreError::Quote(q) => q.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl From<QuoteError> for ApiError {
    fn from(e: QuoteError) -> Self {
        ApiError::Validation(ValidationError::new(e.field(), e.user_message()))
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized(messages::INVALID_CREDENTIALS.to_string())
            }
            AuthError::NotConfirmed => {
                ApiError::BadRequest("Confirme seu e-mail antes de entrar.".to_string())
            }
            AuthError::UsernameExists => {
                ApiError::Conflict("Já existe uma conta com este e-mail.".to_string())
            }
            AuthError::InvalidPassword(_) => ApiError::invalid(
                "password",
                "A senha deve ter ao menos 8 caracteres, com letras e números.",
            ),
            AuthError::InvalidCode => {
                ApiError::invalid("code", "Código de confirmação inválido ou expirado.")
            }
            AuthError::InvalidToken(_) | AuthError::Jwt(_) => {
                ApiError::Unauthorized(messages::UNAUTHORIZED.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<jiff::Error> for ApiError {
    fn from(e: jiff::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Internal(format!("upstream request failed: {e}"))
    }
}
