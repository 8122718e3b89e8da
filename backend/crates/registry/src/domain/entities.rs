//! Domain Entities
//!
//! Records owned by the contract's storage. This system only reads them
//! or asks the contract to change them.

use chrono::{DateTime, Utc};
use kernel::primitives::{Address, Hash32};

use crate::error::{RegistryError, RegistryResult};

/// Institute registration request, as stored by the contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstituteRequest {
    pub address: Address,
    pub name: String,
    pub acronym: String,
    pub website: String,
    /// Cleared by the contract once the request is approved or rejected
    pub exists: bool,
}

/// Certificate record, keyed by its certificate hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub hash: Hash32,
    /// Only the `certificates` mapping exposes the issuer
    pub issuer: Option<Address>,
    pub institute_name: String,
    pub department: String,
    pub first_name: String,
    pub last_name: String,
    pub certificant_id: String,
    pub email: String,
    pub course: String,
    /// Unix seconds
    pub completion_timestamp: u64,
    pub notes: String,
    /// Content identifier of the pinned certificate file
    pub ipfs_hash: String,
    pub is_valid: bool,
}

impl Certificate {
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.completion_timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn recipient_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Issuer comparison; addresses compare byte-wise so case never matters
    pub fn is_issued_by(&self, account: &Address) -> bool {
        self.issuer.as_ref() == Some(account)
    }
}

/// Registration request form submitted by a would-be institute
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub name: String,
    pub acronym: String,
    pub website: String,
}

impl RegistrationForm {
    /// Trim every field and reject empty ones
    pub fn normalized(self) -> RegistryResult<Self> {
        let form = Self {
            name: self.name.trim().to_string(),
            acronym: self.acronym.trim().to_string(),
            website: self.website.trim().to_string(),
        };
        require_non_empty("name", &form.name)?;
        require_non_empty("acronym", &form.acronym)?;
        require_non_empty("website", &form.website)?;
        Ok(form)
    }
}

/// Arguments of an issuance transaction
#[derive(Debug, Clone)]
pub struct IssueCertificate {
    pub institute_name: String,
    pub department: String,
    pub first_name: String,
    pub last_name: String,
    pub certificant_id: String,
    pub email: String,
    pub course: String,
    /// Unix seconds
    pub completion_timestamp: u64,
    pub notes: String,
    pub ipfs_hash: String,
}

impl IssueCertificate {
    pub fn validate(&self) -> RegistryResult<()> {
        require_non_empty("instituteName", &self.institute_name)?;
        require_non_empty("firstName", &self.first_name)?;
        require_non_empty("lastName", &self.last_name)?;
        require_non_empty("certificantId", &self.certificant_id)?;
        require_non_empty("courseCompleted", &self.course)?;
        if !self.email.trim().is_empty() && !self.email.contains('@') {
            return Err(RegistryError::validation("email is not a valid address"));
        }
        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> RegistryResult<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::validation(format!("{} is required", field)));
    }
    Ok(())
}

/// One log entry of a transaction receipt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<Hash32>,
    pub data: Vec<u8>,
}

/// Receipt of an included transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: Hash32,
    pub block_number: u64,
    /// `false` when execution reverted
    pub status: bool,
    pub logs: Vec<LogEntry>,
}

impl TransactionReceipt {
    /// Certificate hash emitted by an issuance: first indexed topic of the first log
    pub fn issued_certificate_hash(&self) -> Option<Hash32> {
        self.logs.first().and_then(|log| log.topics.get(1)).copied()
    }
}

/// Result of a successful issuance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCertificate {
    pub certificate_hash: Hash32,
    pub receipt: TransactionReceipt,
}
