//! Wallet RPC Signer
//!
//! Delegates signing to an external wallet endpoint (`eth_sendTransaction`).
//! The server never holds private keys.

use std::time::Duration;

use kernel::primitives::{Address, Hash32};
use platform::crypto::to_hex;
use platform::rpc::JsonRpcClient;
use serde_json::json;

use crate::domain::repository::{TransactionRequest, TransactionSigner};
use crate::error::{ChainWriteError, ChainWriteResult};

#[derive(Debug)]
pub struct WalletRpcSigner {
    rpc: JsonRpcClient,
    account: Address,
}

impl WalletRpcSigner {
    pub fn new(rpc: JsonRpcClient, account: Address) -> Self {
        Self { rpc, account }
    }

    /// Use the first account the wallet exposes
    pub async fn connect(url: &str, timeout: Duration) -> ChainWriteResult<Self> {
        let rpc = JsonRpcClient::new(url, timeout)?;
        let accounts: Vec<Address> = rpc.request("eth_requestAccounts", json!([])).await?;
        let account = accounts
            .first()
            .copied()
            .ok_or_else(|| ChainWriteError::UserRejected("wallet exposed no accounts".into()))?;

        tracing::info!(account = %account, wallet = rpc.url(), "Wallet signer connected");
        Ok(Self::new(rpc, account))
    }
}

impl TransactionSigner for WalletRpcSigner {
    fn account(&self) -> Address {
        self.account
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> ChainWriteResult<Hash32> {
        let hash: String = self
            .rpc
            .request(
                "eth_sendTransaction",
                json!([{
                    "from": tx.from,
                    "to": tx.to,
                    "data": to_hex(&tx.data),
                }]),
            )
            .await?;

        hash.parse::<Hash32>()
            .map_err(|e| ChainWriteError::Network(format!("invalid transaction hash {}: {}", hash, e)))
    }
}
