//! Registry Error Types
//!
//! Chain read/write failures and input validation, integrated with the
//! unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::primitives::Hash32;
use platform::abi::AbiError;
use platform::rpc::RpcError;
use thiserror::Error;

/// Registry-specific result type alias
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result of a chain read
pub type ChainReadResult<T> = Result<T, ChainReadError>;

/// Result of a chain write
pub type ChainWriteResult<T> = Result<T, ChainWriteError>;

/// JSON-RPC code for a reverted `eth_call` / `eth_estimateGas`
const CODE_EXECUTION_REVERTED: i64 = 3;
/// EIP-1193: user rejected the request
const CODE_USER_REJECTED: i64 = 4001;
/// Wallet is already processing a request for this origin
const CODE_REQUEST_PENDING: i64 = -32002;

fn is_revert_message(message: &str) -> bool {
    message.to_ascii_lowercase().contains("revert")
}

/// Failure of a view call, log query or receipt lookup
///
/// Reads are idempotent, so every variant except `NotConfigured` is safe
/// to retry.
#[derive(Debug, Clone, Error)]
pub enum ChainReadError {
    /// Node could not be reached (connection, HTTP status)
    #[error("Chain node unreachable: {0}")]
    Unreachable(String),

    /// Node did not answer within the request timeout
    #[error("Chain node timed out")]
    Timeout,

    /// Response could not be decoded
    #[error("Malformed chain response: {0}")]
    Malformed(String),

    /// The view call reverted
    #[error("Contract call reverted: {0}")]
    Reverted(String),

    /// Any other error object returned by the node
    #[error("Chain node error {code}: {message}")]
    Node { code: i64, message: String },

    /// Required configuration is absent
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl ChainReadError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ChainReadError::NotConfigured(_))
    }
}

impl From<RpcError> for ChainReadError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Timeout => ChainReadError::Timeout,
            RpcError::Unreachable(msg) => ChainReadError::Unreachable(msg),
            RpcError::Http(status) => ChainReadError::Unreachable(format!("HTTP {}", status)),
            RpcError::Malformed(msg) => ChainReadError::Malformed(msg),
            RpcError::Rpc { code, message, .. }
                if code == CODE_EXECUTION_REVERTED || is_revert_message(&message) =>
            {
                ChainReadError::Reverted(message)
            }
            RpcError::Rpc { code, message, .. } => ChainReadError::Node { code, message },
        }
    }
}

impl From<AbiError> for ChainReadError {
    fn from(err: AbiError) -> Self {
        ChainReadError::Malformed(err.to_string())
    }
}

/// Failure of a state-changing transaction
///
/// None of these are retried by the adapter. After `Timeout` the
/// transaction may still be included; check its receipt before
/// resubmitting.
#[derive(Debug, Clone, Error)]
pub enum ChainWriteError {
    #[error("Transaction rejected by the signer: {0}")]
    UserRejected(String),

    #[error("Signer is already processing a request: {0}")]
    RequestPending(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Execution reverted, either at submission or on inclusion
    #[error("Transaction reverted: {reason}")]
    Reverted {
        tx_hash: Option<Hash32>,
        reason: String,
    },

    /// Submitted but not included before the receipt timeout
    #[error("Transaction {tx_hash} not included before timeout")]
    Timeout { tx_hash: Hash32 },

    /// Included, but the receipt lacks the expected event log
    #[error("Transaction {tx_hash} emitted no certificate event")]
    MissingEvent { tx_hash: Hash32 },

    /// Transport failure while submitting
    #[error("Network error: {0}")]
    Network(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl From<RpcError> for ChainWriteError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Rpc { code, message, .. } => {
                if code == CODE_USER_REJECTED {
                    ChainWriteError::UserRejected(message)
                } else if code == CODE_REQUEST_PENDING {
                    ChainWriteError::RequestPending(message)
                } else if message.to_ascii_lowercase().contains("insufficient funds") {
                    ChainWriteError::InsufficientFunds(message)
                } else if code == CODE_EXECUTION_REVERTED || is_revert_message(&message) {
                    ChainWriteError::Reverted {
                        tx_hash: None,
                        reason: message,
                    }
                } else {
                    ChainWriteError::Network(format!("RPC error {}: {}", code, message))
                }
            }
            other => ChainWriteError::Network(other.to_string()),
        }
    }
}

/// Registry-level error
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Missing or malformed caller input
    #[error("{0}")]
    Validation(String),

    /// Record absent on-chain
    #[error("{0}")]
    NotFound(String),

    /// Caller is not allowed to perform the action
    #[error("{0}")]
    Forbidden(String),

    /// Record is not in a state that allows the action
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Read(#[from] ChainReadError),

    #[error(transparent)]
    Write(#[from] ChainWriteError),
}

impl RegistryError {
    pub fn validation(message: impl Into<String>) -> Self {
        RegistryError::Validation(message.into())
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::Validation(_) => ErrorKind::BadRequest,
            RegistryError::NotFound(_) => ErrorKind::NotFound,
            RegistryError::Forbidden(_) => ErrorKind::Forbidden,
            RegistryError::Conflict(_) => ErrorKind::Conflict,
            RegistryError::Read(_) => ErrorKind::InternalServerError,
            RegistryError::Write(err) => match err {
                ChainWriteError::UserRejected(_) => ErrorKind::Forbidden,
                ChainWriteError::RequestPending(_) => ErrorKind::Conflict,
                ChainWriteError::InsufficientFunds(_) => ErrorKind::UnprocessableEntity,
                ChainWriteError::Reverted { .. } => ErrorKind::Conflict,
                ChainWriteError::Timeout { .. } => ErrorKind::GatewayTimeout,
                ChainWriteError::MissingEvent { .. } => ErrorKind::BadGateway,
                ChainWriteError::Network(_) => ErrorKind::ServiceUnavailable,
                ChainWriteError::NotConfigured(_) => ErrorKind::InternalServerError,
            },
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let app_error = AppError::new(self.kind(), self.to_string());
        match self {
            RegistryError::Read(err) if err.is_retryable() => {
                app_error.with_action("Please retry the request")
            }
            RegistryError::Write(ChainWriteError::Timeout { tx_hash }) => app_error.with_action(
                format!("Check transaction {} before resubmitting", tx_hash),
            ),
            RegistryError::Write(ChainWriteError::Reverted { .. }) => {
                app_error.with_action("Refresh the record; another transaction may have won")
            }
            _ => app_error,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            RegistryError::Read(e) => {
                tracing::error!(error = %e, "Chain read failed");
            }
            RegistryError::Write(ChainWriteError::Reverted { tx_hash, reason }) => {
                tracing::warn!(tx_hash = ?tx_hash, reason = %reason, "Transaction reverted");
            }
            RegistryError::Write(e) => {
                tracing::warn!(error = %e, "Chain write failed");
            }
            _ => {
                tracing::debug!(error = %self, "Registry error");
            }
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
