//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Hashing and hex utilities (Keccak-256, SHA-256)
//! - Solidity ABI encoding/decoding for the contract calls we make
//! - JSON-RPC transport over HTTP
//! - HTTP client construction and client identification helpers

pub mod abi;
pub mod client;
pub mod crypto;
pub mod http_client;
pub mod rpc;
