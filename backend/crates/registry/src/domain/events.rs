//! Registry Events
//!
//! Contract logs relevant to the registration lifecycle.

use std::cmp::Ordering;

use kernel::primitives::Address;

/// Position of a log in the chain, used to order events across queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LogPosition {
    pub block_number: u64,
    pub log_index: u64,
}

impl Ord for LogPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.block_number, self.log_index).cmp(&(other.block_number, other.log_index))
    }
}

impl PartialOrd for LogPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `InstituteRequested(address indexed institute, string name)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedLog {
    pub institute: Address,
    pub name: String,
    pub position: LogPosition,
}

/// `InstituteRegistered(address indexed)` or `InstituteRejected(address indexed)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstituteLog {
    pub institute: Address,
    pub position: LogPosition,
}

/// Lifecycle notification delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    Requested { institute: Address, name: String },
    Registered { institute: Address },
    Rejected { institute: Address },
}

impl RegistryEvent {
    pub fn institute(&self) -> Address {
        match self {
            RegistryEvent::Requested { institute, .. }
            | RegistryEvent::Registered { institute }
            | RegistryEvent::Rejected { institute } => *institute,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryEvent::Requested { .. } => "requested",
            RegistryEvent::Registered { .. } => "registered",
            RegistryEvent::Rejected { .. } => "rejected",
        }
    }
}

impl From<RequestedLog> for RegistryEvent {
    fn from(log: RequestedLog) -> Self {
        RegistryEvent::Requested {
            institute: log.institute,
            name: log.name,
        }
    }
}
