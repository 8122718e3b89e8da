//! Relay Backend Module
//!
//! Off-chain side effects the browser cannot perform itself: pinning an
//! uploaded certificate file and emailing the recipient.
//!
//! Clean Architecture structure:
//! - `domain/` - Upload and email entities, provider traits, email template
//! - `application/` - Provider configuration and relay use cases
//! - `infra/` - Pinata and HTTP mail provider clients
//! - `presentation/` - HTTP handlers
//!
//! Each relay forwards at most once per request. Provider failures are
//! reported to the caller, never retried.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{ConfigError, MailConfig, UploadConfig};
pub use error::{NotificationError, NotificationResult, UploadError, UploadResult};
pub use infra::mail::HttpMailTransport;
pub use infra::pinata::PinataClient;
pub use presentation::router::relay_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::presentation::dto::*;
}
