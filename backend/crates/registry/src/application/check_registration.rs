//! Registration Status Use Cases
//!
//! Whether an account is a registered institute, and who owns the contract.

use std::sync::Arc;

use kernel::primitives::Address;

use crate::domain::repository::ChainReader;
use crate::error::RegistryResult;

/// Registration status lookup
pub struct CheckRegistrationUseCase<R>
where
    R: ChainReader,
{
    reader: Arc<R>,
}

impl<R> CheckRegistrationUseCase<R>
where
    R: ChainReader,
{
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    pub async fn execute(&self, institute: Address) -> RegistryResult<bool> {
        let registered = self.reader.is_registered(institute).await?;
        tracing::debug!(institute = %institute, registered, "Registration status checked");
        Ok(registered)
    }
}

/// Contract owner, optionally compared against a viewer account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerStatus {
    pub owner: Address,
    pub is_owner: Option<bool>,
}

/// Owner lookup
pub struct OwnerStatusUseCase<R>
where
    R: ChainReader,
{
    reader: Arc<R>,
}

impl<R> OwnerStatusUseCase<R>
where
    R: ChainReader,
{
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    pub async fn execute(&self, viewer: Option<Address>) -> RegistryResult<OwnerStatus> {
        let owner = self.reader.owner().await?;
        Ok(OwnerStatus {
            owner,
            is_owner: viewer.map(|account| account == owner),
        })
    }
}
