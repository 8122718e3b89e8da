//! Application Configuration
//!
//! Chain endpoint and background task settings, read from the environment.

use std::time::Duration;

use kernel::primitives::Address;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Chain adapter configuration
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Read node JSON-RPC endpoint
    pub rpc_url: String,
    /// Registry contract; reads and writes fail with `NotConfigured` without it
    pub contract_address: Option<Address>,
    /// Per-request timeout for node calls
    pub request_timeout: Duration,
    /// First block searched for registry logs
    pub deploy_block: u64,
    /// Maximum blocks per `eth_getLogs` query
    pub log_block_span: u64,
    /// Receipt polling interval while waiting for inclusion
    pub receipt_poll_interval: Duration,
    /// Give up waiting for inclusion after this long
    pub receipt_timeout: Duration,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            contract_address: None,
            request_timeout: Duration::from_secs(15),
            deploy_block: 0,
            log_block_span: 10_000,
            receipt_poll_interval: Duration::from_secs(2),
            receipt_timeout: Duration::from_secs(120),
        }
    }
}

impl ChainConfig {
    /// Read from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read through `lookup`; the chain endpoint is the only required value
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let rpc_url = var("CHAIN_RPC_URL")
            .or_else(|| var("ALCHEMY_URL"))
            .ok_or(ConfigError::Missing("CHAIN_RPC_URL"))?;

        let contract_address = var("CONTRACT_ADDRESS")
            .map(|v| {
                v.parse::<Address>().map_err(|e| ConfigError::Invalid {
                    key: "CONTRACT_ADDRESS",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let log_block_span = parse_u64(&var, "LOG_BLOCK_SPAN")?.unwrap_or(defaults.log_block_span);
        if log_block_span == 0 {
            return Err(ConfigError::Invalid {
                key: "LOG_BLOCK_SPAN",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            rpc_url,
            contract_address,
            request_timeout: parse_u64(&var, "CHAIN_REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            deploy_block: parse_u64(&var, "DEPLOY_BLOCK")?.unwrap_or(defaults.deploy_block),
            log_block_span,
            receipt_poll_interval: defaults.receipt_poll_interval,
            receipt_timeout: parse_u64(&var, "RECEIPT_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.receipt_timeout),
        })
    }
}

/// Background task configuration
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// How often the log feed polls for new blocks
    pub event_poll_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            event_poll_interval: Duration::from_secs(12),
        }
    }
}

impl RegistryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secs = parse_u64(&var, "EVENT_POLL_INTERVAL_SECS")?;
        if secs == Some(0) {
            return Err(ConfigError::Invalid {
                key: "EVENT_POLL_INTERVAL_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            event_poll_interval: secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| Self::default().event_poll_interval),
        })
    }
}

fn parse_u64<F>(var: &F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|v| {
            v.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
            })
        })
        .transpose()
}
