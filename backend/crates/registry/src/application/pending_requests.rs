//! Pending Registration Use Case
//!
//! Derives the set of institutes still awaiting approval from two event
//! logs and the live existence flag.
//!
//! ## Flow
//! 1. Fetch every `InstituteRequested` and `InstituteRegistered` log
//! 2. Candidates are requested minus registered, in discovery order
//! 3. Keep candidates whose pending record still exists
//! 4. Fetch each survivor's display record; vanished ones are dropped
//!
//! Any read failure aborts the run. A partial list is never returned.

use std::sync::Arc;

use crate::domain::entities::InstituteRequest;
use crate::domain::repository::{ChainReader, LogRange};
use crate::domain::services::pending_candidates;
use crate::error::ChainReadResult;

/// Pending registration reconciler
pub struct PendingRequestsUseCase<R>
where
    R: ChainReader,
{
    reader: Arc<R>,
    range: LogRange,
}

impl<R> Clone for PendingRequestsUseCase<R>
where
    R: ChainReader,
{
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            range: self.range,
        }
    }
}

impl<R> PendingRequestsUseCase<R>
where
    R: ChainReader,
{
    /// Search logs from `deploy_block` to the chain head
    pub fn new(reader: Arc<R>, deploy_block: u64) -> Self {
        Self {
            reader,
            range: LogRange::starting_at(deploy_block),
        }
    }

    pub async fn execute(&self) -> ChainReadResult<Vec<InstituteRequest>> {
        let (requested, registered) = tokio::try_join!(
            self.reader.requested_events(self.range),
            self.reader.registered_events(self.range),
        )?;

        let candidates = pending_candidates(&requested, &registered);

        let mut pending = Vec::with_capacity(candidates.len());
        for institute in candidates {
            if !self.reader.pending_exists(institute).await? {
                continue;
            }

            // Approved or rejected between the two lookups
            match self.reader.pending_institute(institute).await? {
                Some(request) => pending.push(request),
                None => {
                    tracing::debug!(institute = %institute, "Pending request vanished during reconciliation");
                }
            }
        }

        tracing::debug!(
            requested = requested.len(),
            registered = registered.len(),
            pending = pending.len(),
            "Pending registrations reconciled"
        );

        Ok(pending)
    }
}
