//! Infrastructure Layer - Provider clients
//!
//! This layer contains:
//! - Pinata pinning client
//! - HTTP mail provider transport

pub mod mail;
#[cfg(test)]
pub mod memory;
pub mod pinata;
