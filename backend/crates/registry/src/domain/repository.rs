//! Chain Interfaces
//!
//! Read, write and signing interfaces over the registry contract.
//! Implementations live in the infrastructure layer.

use kernel::primitives::{Address, Hash32};

use crate::domain::entities::{
    Certificate, InstituteRequest, IssueCertificate, IssuedCertificate, RegistrationForm,
    TransactionReceipt,
};
use crate::domain::events::{InstituteLog, RequestedLog};
use crate::error::{ChainReadResult, ChainWriteResult};

/// Inclusive block range for log queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRange {
    pub from_block: u64,
    /// `None` means the chain head at query time
    pub to_block: Option<u64>,
}

impl LogRange {
    pub fn starting_at(from_block: u64) -> Self {
        Self {
            from_block,
            to_block: None,
        }
    }

    pub fn between(from_block: u64, to_block: u64) -> Self {
        Self {
            from_block,
            to_block: Some(to_block),
        }
    }
}

/// Unsigned transaction handed to a signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Vec<u8>,
}

/// View calls and log queries
///
/// Every method is idempotent; callers may retry freely.
#[trait_variant::make(ChainReader: Send)]
pub trait LocalChainReader {
    async fn owner(&self) -> ChainReadResult<Address>;

    async fn is_registered(&self, institute: Address) -> ChainReadResult<bool>;

    /// Live existence flag of a pending registration request
    async fn pending_exists(&self, institute: Address) -> ChainReadResult<bool>;

    /// Display record of a pending request; `None` once it no longer exists
    async fn pending_institute(&self, institute: Address)
    -> ChainReadResult<Option<InstituteRequest>>;

    /// Full record from the `certificates` mapping, including the issuer
    async fn certificate(&self, hash: Hash32) -> ChainReadResult<Option<Certificate>>;

    /// Record as returned by `verifyCertificate` (no issuer)
    async fn verify_certificate(&self, hash: Hash32) -> ChainReadResult<Option<Certificate>>;

    /// `InstituteRequested` logs in chain order
    async fn requested_events(&self, range: LogRange) -> ChainReadResult<Vec<RequestedLog>>;

    /// `InstituteRegistered` logs in chain order
    async fn registered_events(&self, range: LogRange) -> ChainReadResult<Vec<InstituteLog>>;

    /// `InstituteRejected` logs in chain order
    async fn rejected_events(&self, range: LogRange) -> ChainReadResult<Vec<InstituteLog>>;

    async fn block_number(&self) -> ChainReadResult<u64>;

    async fn transaction_receipt(&self, tx_hash: Hash32)
    -> ChainReadResult<Option<TransactionReceipt>>;
}

/// Submits a transaction on behalf of an account
#[trait_variant::make(TransactionSigner: Send)]
pub trait LocalTransactionSigner {
    /// Account the signer sends from
    fn account(&self) -> Address;

    /// Sign and broadcast; returns the transaction hash
    async fn send_transaction(&self, tx: &TransactionRequest) -> ChainWriteResult<Hash32>;
}

/// State-changing contract calls
///
/// Each call submits exactly once and waits for inclusion. Nothing here
/// retries: resubmitting could execute the action twice.
#[trait_variant::make(ChainWriter: Send)]
pub trait LocalChainWriter {
    async fn request_registration<S: TransactionSigner + Sync>(
        &self,
        signer: &S,
        form: &RegistrationForm,
    ) -> ChainWriteResult<TransactionReceipt>;

    async fn approve_registration<S: TransactionSigner + Sync>(
        &self,
        signer: &S,
        institute: Address,
    ) -> ChainWriteResult<TransactionReceipt>;

    async fn reject_registration<S: TransactionSigner + Sync>(
        &self,
        signer: &S,
        institute: Address,
    ) -> ChainWriteResult<TransactionReceipt>;

    async fn issue_certificate<S: TransactionSigner + Sync>(
        &self,
        signer: &S,
        input: &IssueCertificate,
    ) -> ChainWriteResult<IssuedCertificate>;

    async fn revoke_certificate<S: TransactionSigner + Sync>(
        &self,
        signer: &S,
        hash: Hash32,
    ) -> ChainWriteResult<TransactionReceipt>;

    async fn update_ipfs_hash<S: TransactionSigner + Sync>(
        &self,
        signer: &S,
        hash: Hash32,
        ipfs_hash: &str,
    ) -> ChainWriteResult<TransactionReceipt>;
}
