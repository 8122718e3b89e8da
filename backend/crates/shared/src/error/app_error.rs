//! Application Error
//!
//! Crate-level errors (`RegistryError`, `UploadError`, `NotificationError`)
//! convert into [`AppError`] at the HTTP boundary.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

/// Error as presented to a caller
///
/// `message` and `action` are shown to the caller. `source` is kept for
/// logs and `Error::source` only.
///
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::NotFound, "Certificate not found");
/// assert_eq!(err.status_code(), 404);
///
/// let err = AppError::bad_request("Address is required")
///     .with_action("Pass ?address=0x...");
/// assert_eq!(err.action(), Some("Pass ?address=0x..."));
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    action: Option<Cow<'static, str>>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            action: None,
            source: None,
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// 500 Internal Server Error
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    /// Hint shown next to the message, e.g. "Please retry the request"
    pub fn with_action(mut self, action: impl Into<Cow<'static, str>>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Attach the underlying error; it is never serialized to the caller
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("action", &self.action)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(action) = &self.action {
            write!(f, " ({})", action)?;
        }
        Ok(())
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let err = AppError::new(ErrorKind::GatewayTimeout, "Transaction not included");
        assert_eq!(err.kind(), ErrorKind::GatewayTimeout);
        assert_eq!(err.status_code(), 504);
        assert!(err.action().is_none());

        assert_eq!(AppError::bad_request("x").status_code(), 400);
        assert_eq!(AppError::internal("x").status_code(), 500);
    }

    #[test]
    fn test_source_is_kept_out_of_message() {
        let io_err = std::io::Error::other("smtp 535");
        let err = AppError::internal("Failed to send email")
            .with_source(io_err)
            .with_action("Please retry");
        assert_eq!(err.message(), "Failed to send email");
        assert_eq!(err.source().map(|s| s.to_string()), Some("smtp 535".to_string()));
        assert!(!err.to_string().contains("535"));
    }

    #[test]
    fn test_display() {
        let err = AppError::new(ErrorKind::NotFound, "Certificate not found");
        assert_eq!(err.to_string(), "[Not Found] Certificate not found");

        let err = AppError::bad_request("Address is required").with_action("Pass ?address=");
        assert_eq!(
            err.to_string(),
            "[Bad Request] Address is required (Pass ?address=)"
        );
    }
}
