//! Infrastructure Layer - JSON-RPC chain access
//!
//! `ContractClient` reads and writes the registry contract through a node;
//! `WalletRpcSigner` hands transactions to an external signer.

pub mod contract;
pub mod signer;
