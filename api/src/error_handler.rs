use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use answer_engine::AnswerError;
use file_extract::ExtractError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("configuration error: {0}")]
    Config(String),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    /// Missing/empty question, disallowed file type, unreadable form.
    #[error("{0}")]
    Validation(String),

    #[error("Content-Type must be multipart/form-data")]
    UnsupportedMediaType,

    /// Unreadable form body; keeps the status axum assigned (413 over the limit).
    #[error("invalid multipart body: {message}")]
    Multipart { status: StatusCode, message: String },

    /// Extraction failed; details are logged, not returned.
    #[error("Failed to process uploaded file")]
    FileProcessing(#[source] ExtractError),

    // --- Answering ---
    #[error(transparent)]
    Answer(#[from] AnswerError),

    /// Anything unanticipated (e.g. a panicked blocking task).
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // 4xx
            AppError::Validation(_) | AppError::FileProcessing(_) => StatusCode::BAD_REQUEST,
            AppError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Multipart { status, .. } => *status,

            // 5xx
            AppError::Answer(_)
            | AppError::Internal(_)
            | AppError::Config(_)
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::FileProcessing(e) => error!(error = %e, "file processing error"),
            AppError::Internal(detail) => error!(%detail, "unexpected error"),
            AppError::Answer(e) => error!(error = %e, "answer resolution failed"),
            _ => {}
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::UnsupportedFileType(_) => AppError::Validation(unsupported_type_message()),
            other => AppError::FileProcessing(other),
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(err: MultipartRejection) -> Self {
        AppError::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("background task failed to complete: {err}"))
    }
}

/// Message listing the accepted upload types.
pub fn unsupported_type_message() -> String {
    format!(
        "File type not allowed. Supported types: {}",
        file_extract::ALLOWED_EXTENSIONS.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UnsupportedMediaType.status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::from(AnswerError::Configuration("c".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(AnswerError::ExternalService("e".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn multipart_errors_keep_their_status() {
        let err = AppError::Multipart {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".into(),
        };
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.to_string(), "invalid multipart body: length limit exceeded");
    }

    #[test]
    fn extraction_details_are_not_exposed() {
        let err = AppError::from(ExtractError::Io(io::Error::other("disk on fire")));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Failed to process uploaded file");
    }

    #[test]
    fn unsupported_type_is_a_validation_error() {
        let err = AppError::from(ExtractError::UnsupportedFileType("exe".into()));
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("csv, zip, txt, pdf, xlsx, json")));
    }
}
