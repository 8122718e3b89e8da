//! Relay Configuration
//!
//! Provider credentials are optional at startup. A missing credential turns
//! the corresponding endpoint into a runtime `NotConfigured` failure.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Upload relay configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory for staged uploads
    pub upload_dir: PathBuf,
    pub pinata_api_url: String,
    pub pinata_api_key: Option<String>,
    pub pinata_secret_api_key: Option<String>,
    /// Maximum accepted request body; unlimited when unset
    pub body_limit: Option<usize>,
    /// Whole-request timeout for the pinning call
    pub request_timeout: Duration,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: std::env::temp_dir().join("uploads"),
            pinata_api_url: DEFAULT_PINATA_API_URL.to_string(),
            pinata_api_key: None,
            pinata_secret_api_key: None,
            body_limit: None,
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let body_limit = match var("UPLOAD_BODY_LIMIT_BYTES") {
            Some(v) => Some(v.trim().parse::<usize>().map_err(|e| ConfigError::Invalid {
                key: "UPLOAD_BODY_LIMIT_BYTES",
                reason: e.to_string(),
            })?),
            None => defaults.body_limit,
        };

        Ok(Self {
            upload_dir: var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            pinata_api_url: var("PINATA_API_URL").unwrap_or(defaults.pinata_api_url),
            pinata_api_key: var("PINATA_API_KEY"),
            pinata_secret_api_key: var("PINATA_SECRET_API_KEY"),
            body_limit,
            request_timeout: defaults.request_timeout,
        })
    }

    /// Both Pinata credentials are present
    pub fn has_pinata_credentials(&self) -> bool {
        self.pinata_api_key.is_some() && self.pinata_secret_api_key.is_some()
    }
}

/// Notification relay configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Provider endpoint accepting `{from, to, subject, html}`
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    /// Sender mailbox
    pub from: Option<String>,
    pub request_timeout: Duration,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            from: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl MailConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_url: var("MAIL_API_URL"),
            api_key: var("MAIL_API_KEY"),
            from: var("MAIL_FROM").or_else(|| var("GMAIL_USER")),
            ..Self::default()
        }
    }
}
