use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InputInvalid(String),

    #[error("Failed to upload PDF to the file service: {0}")]
    UploadFailed(String),

    #[error("File '{0}' was not found or has expired. Please re-upload the PDF.")]
    FileExpired(String),

    #[error("Model returned malformed JSON: {0}")]
    MalformedJson(String),

    #[error("Model response did not match the expected schema: {0}")]
    SchemaViolation(String),

    #[error("Remote call failed: {0}")]
    RemoteCallFailed(String),

    #[error("Remote call timed out: {0}")]
    Timeout(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InputInvalid(_) => "INPUT_INVALID",
            AppError::UploadFailed(_) => "UPLOAD_FAILED",
            AppError::FileExpired(_) => "FILE_EXPIRED",
            AppError::MalformedJson(_) => "MALFORMED_JSON",
            AppError::SchemaViolation(_) => "SCHEMA_VIOLATION",
            AppError::RemoteCallFailed(_) => "REMOTE_CALL_FAILED",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Model output that parsed badly or failed validation. These are the
    /// only failures worth re-asking the model about.
    pub fn is_invalid_model_output(&self) -> bool {
        matches!(
            self,
            AppError::MalformedJson(_) | AppError::SchemaViolation(_)
        )
    }
}

/// Error envelope returned to HTTP clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InputInvalid(_) => StatusCode::BAD_REQUEST,
            AppError::FileExpired(_) => StatusCode::NOT_FOUND,
            AppError::UploadFailed(_)
            | AppError::RemoteCallFailed(_)
            | AppError::MalformedJson(_)
            | AppError::SchemaViolation(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            detail: self.to_string(),
        })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else {
            AppError::RemoteCallFailed(err.to_string())
        }
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InputInvalid(err.to_string())
    }
}
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(format!("I/O error: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
