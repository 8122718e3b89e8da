//! Relay Error Types
//!
//! Upload and notification failures, integrated with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type UploadResult<T> = Result<T, UploadError>;

pub type NotificationResult<T> = Result<T, NotificationError>;

/// Upload relay error
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid upload: {0}")]
    InvalidMultipart(String),

    #[error("Upload exceeds the size limit")]
    TooLarge,

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// Pinning service answered with an error; the reason is its own message
    #[error("{0}")]
    Provider(String),

    #[error("Pinning service unreachable: {0}")]
    Network(String),

    #[error("Failed to stage upload: {0}")]
    Staging(#[from] std::io::Error),
}

impl UploadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::MissingFile | UploadError::InvalidMultipart(_) => ErrorKind::BadRequest,
            UploadError::TooLarge => ErrorKind::PayloadTooLarge,
            UploadError::NotConfigured(_)
            | UploadError::Provider(_)
            | UploadError::Network(_)
            | UploadError::Staging(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn log(&self) {
        match self {
            UploadError::Provider(reason) => {
                tracing::warn!(reason = %reason, "Pinning service rejected upload");
            }
            UploadError::Network(_) | UploadError::Staging(_) | UploadError::NotConfigured(_) => {
                tracing::error!(error = %self, "Upload relay failed");
            }
            _ => {
                tracing::debug!(error = %self, "Upload rejected");
            }
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::new(err.kind(), err.to_string())
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

/// Notification relay error
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Mail provider rejected message: {0}")]
    Provider(String),

    #[error("Mail provider unreachable: {0}")]
    Network(String),
}

impl NotificationError {
    pub fn validation(message: impl Into<String>) -> Self {
        NotificationError::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            NotificationError::Validation(_) => ErrorKind::BadRequest,
            _ => ErrorKind::InternalServerError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn log(&self) {
        match self {
            NotificationError::Validation(_) => {
                tracing::debug!(error = %self, "Email request rejected");
            }
            _ => {
                tracing::error!(error = %self, "Error sending email");
            }
        }
    }
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::Validation(message) => AppError::bad_request(message),
            // Provider details stay in the logs
            other => AppError::internal("Failed to send email").with_source(other),
        }
    }
}

impl IntoResponse for NotificationError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
