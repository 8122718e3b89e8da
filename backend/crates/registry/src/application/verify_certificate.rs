//! Certificate Verification Use Case

use std::sync::Arc;

use kernel::primitives::{Address, Hash32};

use crate::domain::entities::Certificate;
use crate::domain::repository::ChainReader;
use crate::error::{RegistryError, RegistryResult};

/// Verified certificate, with the viewer's issuer status when a viewer was given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateView {
    pub certificate: Certificate,
    pub viewer_is_issuer: Option<bool>,
}

pub struct VerifyCertificateUseCase<R>
where
    R: ChainReader,
{
    reader: Arc<R>,
}

impl<R> VerifyCertificateUseCase<R>
where
    R: ChainReader,
{
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    pub async fn execute(
        &self,
        hash: Hash32,
        viewer: Option<Address>,
    ) -> RegistryResult<CertificateView> {
        let mut certificate = self
            .reader
            .verify_certificate(hash)
            .await?
            .ok_or_else(|| RegistryError::NotFound("Certificate not found".to_string()))?;

        let viewer_is_issuer = match viewer {
            Some(account) => {
                let issuer = self.reader.certificate(hash).await?.and_then(|c| c.issuer);
                certificate.issuer = issuer;
                Some(certificate.is_issued_by(&account))
            }
            None => None,
        };

        Ok(CertificateView {
            certificate,
            viewer_is_issuer,
        })
    }
}
