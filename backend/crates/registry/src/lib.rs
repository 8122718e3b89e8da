//! Registry Backend Module
//!
//! Everything that talks to the institute-registration / certificate
//! contract.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, registry events, chain reader/writer traits, set logic
//! - `application/` - Use cases (registration status, pending reconciliation,
//!   certificate verification, writes) and the event subscription hub
//! - `infra/` - JSON-RPC contract client and wallet signer
//! - `presentation/` - HTTP handlers
//!
//! ## Consistency Model
//! - The contract is the only source of truth; nothing is cached across requests
//! - The pending set is derived on demand from two event logs plus a live flag
//! - Writes are submitted once and never retried automatically

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{ChainConfig, ConfigError, RegistryConfig};
pub use error::{ChainReadError, ChainWriteError, RegistryError, RegistryResult};
pub use infra::contract::ContractClient;
pub use infra::signer::WalletRpcSigner;
pub use presentation::router::registry_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::events::*;
    pub use crate::presentation::dto::*;
}

#[cfg(test)]
mod tests;
