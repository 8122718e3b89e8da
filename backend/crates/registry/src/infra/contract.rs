//! Registry Contract Client
//!
//! `ChainReader` and `ChainWriter` over a JSON-RPC node. Calls are
//! ABI-encoded by hand against the fixed contract interface below.

use std::time::Duration;

use kernel::primitives::{Address, Hash32};
use platform::abi::{AbiDecoder, Token, encode_call};
use platform::crypto::{event_topic, from_hex, parse_quantity, to_hex, to_quantity};
use platform::rpc::JsonRpcClient;
use serde::Deserialize;
use serde_json::json;
use tokio::time::Instant;

use crate::application::config::ChainConfig;
use crate::domain::entities::{
    Certificate, InstituteRequest, IssueCertificate, IssuedCertificate, LogEntry, RegistrationForm,
    TransactionReceipt,
};
use crate::domain::events::{InstituteLog, LogPosition, RequestedLog};
use crate::domain::repository::{
    ChainReader, ChainWriter, LogRange, TransactionRequest, TransactionSigner,
};
use crate::error::{ChainReadError, ChainReadResult, ChainWriteError, ChainWriteResult};

// View functions
const OWNER: &str = "owner()";
const IS_REGISTERED: &str = "isRegistered(address)";
const GET_PENDING_INSTITUTE: &str = "getPendingInstitute(address)";
const VERIFY_CERTIFICATE: &str = "verifyCertificate(bytes32)";
const CERTIFICATES: &str = "certificates(bytes32)";

// Transactions
const REQUEST_REGISTRATION: &str = "requestRegistration(string,string,string)";
const APPROVE_REGISTRATION: &str = "approveRegistration(address)";
const REJECT_REGISTRATION: &str = "rejectRegistration(address)";
const ISSUE_CERTIFICATE: &str =
    "issueCertificate(string,string,string,string,string,string,string,uint256,string,string)";
const REVOKE_CERTIFICATE: &str = "revokeCertificate(bytes32)";
const UPDATE_IPFS_HASH: &str = "updateIpfsHash(bytes32,string)";

// Events
pub const INSTITUTE_REQUESTED: &str = "InstituteRequested(address,string)";
pub const INSTITUTE_REGISTERED: &str = "InstituteRegistered(address)";
pub const INSTITUTE_REJECTED: &str = "InstituteRejected(address)";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    address: Address,
    topics: Vec<Hash32>,
    data: String,
    block_number: Option<String>,
    log_index: Option<String>,
    #[serde(default)]
    removed: bool,
}

impl RpcLog {
    fn position(&self) -> LogPosition {
        LogPosition {
            block_number: self.block_number.as_deref().and_then(parse_quantity).unwrap_or(0),
            log_index: self.log_index.as_deref().and_then(parse_quantity).unwrap_or(0),
        }
    }

    fn indexed_address(&self) -> ChainReadResult<Address> {
        self.topics
            .get(1)
            .map(|topic| Address::from_word(topic.as_bytes()))
            .ok_or_else(|| ChainReadError::Malformed("log is missing its indexed address".into()))
    }

    fn into_entry(self) -> ChainReadResult<LogEntry> {
        Ok(LogEntry {
            data: decode_hex(&self.data)?,
            address: self.address,
            topics: self.topics,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: Hash32,
    block_number: Option<String>,
    /// Absent on pre-Byzantium chains
    status: Option<String>,
    #[serde(default)]
    logs: Vec<RpcLog>,
}

fn decode_hex(s: &str) -> ChainReadResult<Vec<u8>> {
    from_hex(s).map_err(|e| ChainReadError::Malformed(format!("invalid hex data: {}", e)))
}

/// Split `[from, to]` into inclusive ranges of at most `span` blocks
pub(crate) fn chunk_ranges(from: u64, to: u64, span: u64) -> Vec<(u64, u64)> {
    let span = span.max(1);
    let mut chunks = Vec::new();
    let mut start = from;
    while start <= to {
        let end = start.saturating_add(span - 1).min(to);
        chunks.push((start, end));
        if end == u64::MAX {
            break;
        }
        start = end + 1;
    }
    chunks
}

/// JSON-RPC client for the registry contract
#[derive(Debug)]
pub struct ContractClient {
    rpc: JsonRpcClient,
    contract: Option<Address>,
    log_block_span: u64,
    receipt_poll_interval: Duration,
    receipt_timeout: Duration,
}

impl ContractClient {
    pub fn new(config: &ChainConfig) -> ChainReadResult<Self> {
        let rpc = JsonRpcClient::new(config.rpc_url.clone(), config.request_timeout)?;
        Ok(Self::with_rpc(rpc, config))
    }

    pub fn with_rpc(rpc: JsonRpcClient, config: &ChainConfig) -> Self {
        Self {
            rpc,
            contract: config.contract_address,
            log_block_span: config.log_block_span,
            receipt_poll_interval: config.receipt_poll_interval,
            receipt_timeout: config.receipt_timeout,
        }
    }

    pub fn contract_address(&self) -> Option<Address> {
        self.contract
    }

    fn contract(&self) -> ChainReadResult<Address> {
        self.contract.ok_or(ChainReadError::NotConfigured("CONTRACT_ADDRESS"))
    }

    async fn call(&self, signature: &str, args: &[Token]) -> ChainReadResult<Vec<u8>> {
        let to = self.contract()?;
        let data = encode_call(signature, args);
        let result: String = self
            .rpc
            .request(
                "eth_call",
                json!([{ "to": to, "data": to_hex(&data) }, "latest"]),
            )
            .await?;
        decode_hex(&result)
    }

    async fn pending_record(&self, institute: Address) -> ChainReadResult<InstituteRequest> {
        let data = self
            .call(GET_PENDING_INSTITUTE, &[Token::Address(institute)])
            .await?;
        let out = AbiDecoder::new(&data);
        Ok(InstituteRequest {
            address: institute,
            name: out.string(0)?,
            acronym: out.string(1)?,
            website: out.string(2)?,
            exists: out.bool(3)?,
        })
    }

    async fn logs(&self, signature: &str, range: LogRange) -> ChainReadResult<Vec<RpcLog>> {
        let address = self.contract()?;
        let to_block = match range.to_block {
            Some(to) => to,
            None => self.block_number().await?,
        };
        let topic = Hash32::from_bytes(event_topic(signature));

        let mut logs = Vec::new();
        for (from, to) in chunk_ranges(range.from_block, to_block, self.log_block_span) {
            let chunk: Vec<RpcLog> = self
                .rpc
                .request(
                    "eth_getLogs",
                    json!([{
                        "address": address,
                        "topics": [topic],
                        "fromBlock": to_quantity(from),
                        "toBlock": to_quantity(to),
                    }]),
                )
                .await?;
            logs.extend(chunk.into_iter().filter(|log| !log.removed));
        }

        tracing::trace!(event = signature, count = logs.len(), "Fetched contract logs");
        Ok(logs)
    }

    async fn institute_logs(
        &self,
        signature: &str,
        range: LogRange,
    ) -> ChainReadResult<Vec<InstituteLog>> {
        self.logs(signature, range)
            .await?
            .iter()
            .map(|log| {
                Ok(InstituteLog {
                    institute: log.indexed_address()?,
                    position: log.position(),
                })
            })
            .collect()
    }

    /// Submit once through `signer`, then wait for inclusion
    async fn transact<S>(&self, signer: &S, data: Vec<u8>) -> ChainWriteResult<TransactionReceipt>
    where
        S: TransactionSigner + Sync,
    {
        let to = self
            .contract
            .ok_or(ChainWriteError::NotConfigured("CONTRACT_ADDRESS"))?;
        let request = TransactionRequest {
            from: signer.account(),
            to,
            data,
        };

        let tx_hash = signer.send_transaction(&request).await?;
        tracing::info!(tx_hash = %tx_hash, from = %request.from, "Transaction submitted");

        self.wait_for_receipt(tx_hash).await
    }

    async fn wait_for_receipt(&self, tx_hash: Hash32) -> ChainWriteResult<TransactionReceipt> {
        let deadline = Instant::now() + self.receipt_timeout;

        loop {
            match self.transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) if receipt.status => return Ok(receipt),
                Ok(Some(receipt)) => {
                    return Err(ChainWriteError::Reverted {
                        tx_hash: Some(receipt.transaction_hash),
                        reason: "execution reverted".to_string(),
                    });
                }
                Ok(None) => {}
                // Receipt lookups are reads; keep polling until the deadline
                Err(e) => {
                    tracing::debug!(tx_hash = %tx_hash, error = %e, "Receipt lookup failed");
                }
            }

            if Instant::now() >= deadline {
                tracing::warn!(tx_hash = %tx_hash, "Transaction not included before timeout");
                return Err(ChainWriteError::Timeout { tx_hash });
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }
}

fn decode_verified(hash: Hash32, data: &[u8]) -> ChainReadResult<Option<Certificate>> {
    let out = AbiDecoder::new(data);
    let institute_name = out.string(1)?;
    if institute_name.is_empty() {
        return Ok(None);
    }
    Ok(Some(Certificate {
        hash,
        issuer: None,
        is_valid: out.bool(0)?,
        institute_name,
        department: out.string(2)?,
        first_name: out.string(3)?,
        last_name: out.string(4)?,
        certificant_id: out.string(5)?,
        email: out.string(6)?,
        course: out.string(7)?,
        completion_timestamp: out.uint_u64(8)?,
        notes: out.string(9)?,
        ipfs_hash: out.string(10)?,
    }))
}

fn decode_stored(hash: Hash32, data: &[u8]) -> ChainReadResult<Option<Certificate>> {
    let out = AbiDecoder::new(data);
    let institute_name = out.string(0)?;
    if institute_name.is_empty() {
        return Ok(None);
    }
    Ok(Some(Certificate {
        hash,
        institute_name,
        department: out.string(1)?,
        first_name: out.string(2)?,
        last_name: out.string(3)?,
        certificant_id: out.string(4)?,
        email: out.string(5)?,
        course: out.string(6)?,
        completion_timestamp: out.uint_u64(7)?,
        notes: out.string(8)?,
        ipfs_hash: out.string(9)?,
        is_valid: out.bool(10)?,
        issuer: Some(out.address(11)?),
    }))
}

impl ChainReader for ContractClient {
    async fn owner(&self) -> ChainReadResult<Address> {
        let data = self.call(OWNER, &[]).await?;
        Ok(AbiDecoder::new(&data).address(0)?)
    }

    async fn is_registered(&self, institute: Address) -> ChainReadResult<bool> {
        let data = self.call(IS_REGISTERED, &[Token::Address(institute)]).await?;
        Ok(AbiDecoder::new(&data).bool(0)?)
    }

    async fn pending_exists(&self, institute: Address) -> ChainReadResult<bool> {
        Ok(self.pending_record(institute).await?.exists)
    }

    async fn pending_institute(
        &self,
        institute: Address,
    ) -> ChainReadResult<Option<InstituteRequest>> {
        let record = self.pending_record(institute).await?;
        Ok(record.exists.then_some(record))
    }

    async fn certificate(&self, hash: Hash32) -> ChainReadResult<Option<Certificate>> {
        let data = self.call(CERTIFICATES, &[Token::FixedBytes(hash)]).await?;
        decode_stored(hash, &data)
    }

    async fn verify_certificate(&self, hash: Hash32) -> ChainReadResult<Option<Certificate>> {
        let data = self
            .call(VERIFY_CERTIFICATE, &[Token::FixedBytes(hash)])
            .await?;
        decode_verified(hash, &data)
    }

    async fn requested_events(&self, range: LogRange) -> ChainReadResult<Vec<RequestedLog>> {
        self.logs(INSTITUTE_REQUESTED, range)
            .await?
            .iter()
            .map(|log| {
                let data = decode_hex(&log.data)?;
                Ok(RequestedLog {
                    institute: log.indexed_address()?,
                    name: AbiDecoder::new(&data).string(0)?,
                    position: log.position(),
                })
            })
            .collect()
    }

    async fn registered_events(&self, range: LogRange) -> ChainReadResult<Vec<InstituteLog>> {
        self.institute_logs(INSTITUTE_REGISTERED, range).await
    }

    async fn rejected_events(&self, range: LogRange) -> ChainReadResult<Vec<InstituteLog>> {
        self.institute_logs(INSTITUTE_REJECTED, range).await
    }

    async fn block_number(&self) -> ChainReadResult<u64> {
        let head: String = self.rpc.request("eth_blockNumber", json!([])).await?;
        parse_quantity(&head)
            .ok_or_else(|| ChainReadError::Malformed(format!("invalid block number: {}", head)))
    }

    async fn transaction_receipt(
        &self,
        tx_hash: Hash32,
    ) -> ChainReadResult<Option<TransactionReceipt>> {
        let receipt: Option<RpcReceipt> = self
            .rpc
            .request("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;

        let Some(receipt) = receipt else {
            return Ok(None);
        };
        // Still pending on some nodes
        let Some(block_number) = receipt.block_number.as_deref().and_then(parse_quantity) else {
            return Ok(None);
        };

        Ok(Some(TransactionReceipt {
            transaction_hash: receipt.transaction_hash,
            block_number,
            status: receipt.status.as_deref().and_then(parse_quantity) != Some(0),
            logs: receipt
                .logs
                .into_iter()
                .map(RpcLog::into_entry)
                .collect::<ChainReadResult<_>>()?,
        }))
    }
}

impl ChainWriter for ContractClient {
    async fn request_registration<S: TransactionSigner + Sync>(
        &self,
        signer: &S,
        form: &RegistrationForm,
    ) -> ChainWriteResult<TransactionReceipt> {
        let data = encode_call(
            REQUEST_REGISTRATION,
            &[
                Token::String(form.name.clone()),
                Token::String(form.acronym.clone()),
                Token::String(form.website.clone()),
            ],
        );
        self.transact(signer, data).await
    }

    async fn approve_registration<S: TransactionSigner + Sync>(
        &self,
        signer: &S,
        institute: Address,
    ) -> ChainWriteResult<TransactionReceipt> {
        let data = encode_call(APPROVE_REGISTRATION, &[Token::Address(institute)]);
        self.transact(signer, data).await
    }

    async fn reject_registration<S: TransactionSigner + Sync>(
        &self,
        signer: &S,
        institute: Address,
    ) -> ChainWriteResult<TransactionReceipt> {
        let data = encode_call(REJECT_REGISTRATION, &[Token::Address(institute)]);
        self.transact(signer, data).await
    }

    async fn issue_certificate<S: TransactionSigner + Sync>(
        &self,
        signer: &S,
        input: &IssueCertificate,
    ) -> ChainWriteResult<IssuedCertificate> {
        let data = encode_call(
            ISSUE_CERTIFICATE,
            &[
                Token::String(input.institute_name.clone()),
                Token::String(input.department.clone()),
                Token::String(input.first_name.clone()),
                Token::String(input.last_name.clone()),
                Token::String(input.certificant_id.clone()),
                Token::String(input.email.clone()),
                Token::String(input.course.clone()),
                Token::Uint(u128::from(input.completion_timestamp)),
                Token::String(input.notes.clone()),
                Token::String(input.ipfs_hash.clone()),
            ],
        );
        let receipt = self.transact(signer, data).await?;

        let certificate_hash = receipt
            .issued_certificate_hash()
            .ok_or(ChainWriteError::MissingEvent {
                tx_hash: receipt.transaction_hash,
            })?;

        Ok(IssuedCertificate {
            certificate_hash,
            receipt,
        })
    }

    async fn revoke_certificate<S: TransactionSigner + Sync>(
        &self,
        signer: &S,
        hash: Hash32,
    ) -> ChainWriteResult<TransactionReceipt> {
        let data = encode_call(REVOKE_CERTIFICATE, &[Token::FixedBytes(hash)]);
        self.transact(signer, data).await
    }

    async fn update_ipfs_hash<S: TransactionSigner + Sync>(
        &self,
        signer: &S,
        hash: Hash32,
        ipfs_hash: &str,
    ) -> ChainWriteResult<TransactionReceipt> {
        let data = encode_call(
            UPDATE_IPFS_HASH,
            &[Token::FixedBytes(hash), Token::String(ipfs_hash.to_string())],
        );
        self.transact(signer, data).await
    }
}
