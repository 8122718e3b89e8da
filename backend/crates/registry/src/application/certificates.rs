//! Certificate Write Use Cases
//!
//! Issue, revoke and re-point certificates. Only the issuing institute may
//! change a certificate after issuance.

use std::sync::Arc;

use kernel::primitives::Hash32;

use crate::domain::entities::{
    Certificate, IssueCertificate, IssuedCertificate, TransactionReceipt,
};
use crate::domain::repository::{ChainReader, ChainWriter, TransactionSigner};
use crate::error::{RegistryError, RegistryResult};

pub struct CertificateUseCase<C>
where
    C: ChainReader + ChainWriter,
{
    chain: Arc<C>,
}

impl<C> CertificateUseCase<C>
where
    C: ChainReader + ChainWriter,
{
    pub fn new(chain: Arc<C>) -> Self {
        Self { chain }
    }

    /// Issue a certificate from a registered institute's account
    pub async fn issue<S>(
        &self,
        signer: &S,
        input: IssueCertificate,
    ) -> RegistryResult<IssuedCertificate>
    where
        S: TransactionSigner + Sync,
    {
        input.validate()?;

        let account = signer.account();
        if !self.chain.is_registered(account).await? {
            return Err(RegistryError::Forbidden(
                "Only registered institutes can issue certificates".to_string(),
            ));
        }

        let issued = self.chain.issue_certificate(signer, &input).await?;
        tracing::info!(
            issuer = %account,
            certificate = %issued.certificate_hash,
            tx_hash = %issued.receipt.transaction_hash,
            "Certificate issued"
        );
        Ok(issued)
    }

    /// Mark a certificate invalid
    pub async fn revoke<S>(&self, signer: &S, hash: Hash32) -> RegistryResult<TransactionReceipt>
    where
        S: TransactionSigner + Sync,
    {
        let certificate = self.owned_certificate(signer, hash).await?;
        if !certificate.is_valid {
            return Err(RegistryError::Conflict(
                "Certificate is already revoked".to_string(),
            ));
        }

        let receipt = self.chain.revoke_certificate(signer, hash).await?;
        tracing::info!(
            certificate = %hash,
            tx_hash = %receipt.transaction_hash,
            "Certificate revoked"
        );
        Ok(receipt)
    }

    /// Point a certificate at a new content identifier
    pub async fn update_ipfs_hash<S>(
        &self,
        signer: &S,
        hash: Hash32,
        ipfs_hash: &str,
    ) -> RegistryResult<TransactionReceipt>
    where
        S: TransactionSigner + Sync,
    {
        let ipfs_hash = ipfs_hash.trim();
        if ipfs_hash.is_empty() {
            return Err(RegistryError::validation("ipfsHash is required"));
        }

        self.owned_certificate(signer, hash).await?;

        let receipt = self.chain.update_ipfs_hash(signer, hash, ipfs_hash).await?;
        tracing::info!(
            certificate = %hash,
            ipfs_hash,
            tx_hash = %receipt.transaction_hash,
            "Certificate content updated"
        );
        Ok(receipt)
    }

    async fn owned_certificate<S>(&self, signer: &S, hash: Hash32) -> RegistryResult<Certificate>
    where
        S: TransactionSigner + Sync,
    {
        let certificate = self
            .chain
            .certificate(hash)
            .await?
            .ok_or_else(|| RegistryError::NotFound("Certificate not found".to_string()))?;

        if !certificate.is_issued_by(&signer.account()) {
            return Err(RegistryError::Forbidden(
                "Only the issuing institute can modify this certificate".to_string(),
            ));
        }
        Ok(certificate)
    }
}
