//! Registration Use Cases
//!
//! Request, approve and reject institute registrations.
//!
//! Pre-checks read the same state the contract will enforce, so a caller
//! gets a targeted error instead of a reverted transaction. They are not a
//! substitute for the contract's own checks: a concurrent transaction can
//! still win, and that surfaces as `ChainWriteError::Reverted`.

use std::sync::Arc;

use kernel::primitives::Address;

use crate::domain::entities::{RegistrationForm, TransactionReceipt};
use crate::domain::repository::{ChainReader, ChainWriter, TransactionSigner};
use crate::error::{RegistryError, RegistryResult};

pub struct RegistrationUseCase<C>
where
    C: ChainReader + ChainWriter,
{
    chain: Arc<C>,
}

impl<C> RegistrationUseCase<C>
where
    C: ChainReader + ChainWriter,
{
    pub fn new(chain: Arc<C>) -> Self {
        Self { chain }
    }

    /// Submit a registration request from the signer's account
    pub async fn request<S>(
        &self,
        signer: &S,
        form: RegistrationForm,
    ) -> RegistryResult<TransactionReceipt>
    where
        S: TransactionSigner + Sync,
    {
        let form = form.normalized()?;
        let account = signer.account();

        if self.chain.is_registered(account).await? {
            return Err(RegistryError::Conflict(
                "Institute is already registered".to_string(),
            ));
        }
        if self.chain.pending_exists(account).await? {
            return Err(RegistryError::Conflict(
                "A registration request is already pending for this account".to_string(),
            ));
        }

        let receipt = self.chain.request_registration(signer, &form).await?;
        tracing::info!(
            institute = %account,
            tx_hash = %receipt.transaction_hash,
            "Registration requested"
        );
        Ok(receipt)
    }

    /// Approve a pending request (owner only)
    pub async fn approve<S>(
        &self,
        signer: &S,
        institute: Address,
    ) -> RegistryResult<TransactionReceipt>
    where
        S: TransactionSigner + Sync,
    {
        self.ensure_decidable(signer, institute).await?;

        let receipt = self.chain.approve_registration(signer, institute).await?;
        tracing::info!(
            institute = %institute,
            tx_hash = %receipt.transaction_hash,
            "Registration approved"
        );
        Ok(receipt)
    }

    /// Reject a pending request (owner only)
    pub async fn reject<S>(
        &self,
        signer: &S,
        institute: Address,
    ) -> RegistryResult<TransactionReceipt>
    where
        S: TransactionSigner + Sync,
    {
        self.ensure_decidable(signer, institute).await?;

        let receipt = self.chain.reject_registration(signer, institute).await?;
        tracing::info!(
            institute = %institute,
            tx_hash = %receipt.transaction_hash,
            "Registration rejected"
        );
        Ok(receipt)
    }

    async fn ensure_decidable<S>(&self, signer: &S, institute: Address) -> RegistryResult<()>
    where
        S: TransactionSigner + Sync,
    {
        let owner = self.chain.owner().await?;
        if signer.account() != owner {
            return Err(RegistryError::Forbidden(
                "Only the contract owner can decide registrations".to_string(),
            ));
        }
        if !self.chain.pending_exists(institute).await? {
            return Err(RegistryError::NotFound(format!(
                "No pending registration for {}",
                institute
            )));
        }
        Ok(())
    }
}
