//! Application Layer - Relay use cases
//!
//! This layer contains:
//! - Provider configuration
//! - Use cases (upload staging and pinning, certificate email)

pub mod config;
pub mod notify;
pub mod upload;
