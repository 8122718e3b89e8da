//! Domain Services
//!
//! Pure set logic for the pending-registration view.

use std::collections::HashSet;

use kernel::primitives::Address;

use crate::domain::events::{InstituteLog, RequestedLog};

/// Requested addresses with no matching registration
///
/// Output keeps the discovery order of `requested` and lists each address
/// once, however many times it asked.
pub fn pending_candidates(requested: &[RequestedLog], registered: &[InstituteLog]) -> Vec<Address> {
    let registered: HashSet<Address> = registered.iter().map(|log| log.institute).collect();
    let mut seen = HashSet::with_capacity(requested.len());

    requested
        .iter()
        .map(|log| log.institute)
        .filter(|institute| seen.insert(*institute))
        .filter(|institute| !registered.contains(institute))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::LogPosition;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    fn requested(byte: u8, block: u64) -> RequestedLog {
        RequestedLog {
            institute: addr(byte),
            name: format!("Institute {}", byte),
            position: LogPosition {
                block_number: block,
                log_index: 0,
            },
        }
    }

    fn registered(byte: u8) -> InstituteLog {
        InstituteLog {
            institute: addr(byte),
            position: LogPosition::default(),
        }
    }

    #[test]
    fn test_candidates_exclude_registered() {
        let candidates = pending_candidates(
            &[requested(1, 1), requested(2, 2), requested(3, 3)],
            &[registered(2)],
        );
        assert_eq!(candidates, vec![addr(1), addr(3)]);
    }

    #[test]
    fn test_candidates_dedupe_in_discovery_order() {
        let candidates = pending_candidates(
            &[requested(2, 1), requested(1, 2), requested(2, 3)],
            &[],
        );
        assert_eq!(candidates, vec![addr(2), addr(1)]);
    }

    #[test]
    fn test_candidates_empty_inputs() {
        assert!(pending_candidates(&[], &[registered(1)]).is_empty());
        assert!(pending_candidates(&[requested(1, 1)], &[registered(1)]).is_empty());
    }
}
