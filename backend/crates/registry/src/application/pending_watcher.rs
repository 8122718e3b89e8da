//! Pending Registration Watcher
//!
//! Keeps a snapshot of the pending set current by re-running the
//! reconciler whenever a registry event arrives. Callers read the latest
//! snapshot or wait for changes through a `watch` receiver.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::application::pending_requests::PendingRequestsUseCase;
use crate::application::subscription::{Delivery, Subscription};
use crate::domain::entities::InstituteRequest;
use crate::domain::repository::ChainReader;
use crate::error::ChainReadError;

/// Latest reconciliation outcome
#[derive(Debug, Clone, Default)]
pub struct PendingSnapshot {
    /// Last successful result; kept when a later refresh fails
    pub institutes: Arc<Vec<InstituteRequest>>,
    /// Incremented after every refresh attempt
    pub version: u64,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Error of the most recent attempt, cleared on success
    pub last_error: Option<ChainReadError>,
}

pub struct PendingWatcher {
    snapshot: watch::Receiver<PendingSnapshot>,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl PendingWatcher {
    /// Reconcile once, then again on every delivery from `subscription`
    pub fn spawn<R>(use_case: PendingRequestsUseCase<R>, subscription: Subscription) -> Self
    where
        R: ChainReader + Send + Sync + 'static,
    {
        let (snapshot_tx, snapshot) = watch::channel(PendingSnapshot::default());
        let (shutdown, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(run(use_case, subscription, snapshot_tx, shutdown_rx));

        Self {
            snapshot,
            shutdown,
            handle,
        }
    }

    pub fn snapshot(&self) -> PendingSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver that is notified after every refresh
    pub fn changes(&self) -> watch::Receiver<PendingSnapshot> {
        self.snapshot.clone()
    }

    /// Stop the watcher and wait for it to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Pending watcher task failed");
        }
    }
}

async fn run<R>(
    use_case: PendingRequestsUseCase<R>,
    mut subscription: Subscription,
    snapshot: watch::Sender<PendingSnapshot>,
    mut shutdown: oneshot::Receiver<()>,
) where
    R: ChainReader + Send + Sync + 'static,
{
    refresh(&use_case, &snapshot).await;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            delivery = subscription.next() => match delivery {
                Some(Delivery::Event(event)) => {
                    tracing::debug!(
                        event = event.as_str(),
                        institute = %event.institute(),
                        "Registry event received, refreshing pending set"
                    );
                    refresh(&use_case, &snapshot).await;
                }
                Some(Delivery::Missed(n)) => {
                    tracing::warn!(missed = n, "Pending watcher lagged, refreshing pending set");
                    refresh(&use_case, &snapshot).await;
                }
                None => break,
            },
        }
    }

    tracing::debug!("Pending watcher stopped");
}

async fn refresh<R>(use_case: &PendingRequestsUseCase<R>, snapshot: &watch::Sender<PendingSnapshot>)
where
    R: ChainReader + Send + Sync + 'static,
{
    let result = use_case.execute().await;

    snapshot.send_modify(|current| {
        current.version += 1;
        match result {
            Ok(institutes) => {
                current.institutes = Arc::new(institutes);
                current.refreshed_at = Some(Utc::now());
                current.last_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Pending set refresh failed");
                current.last_error = Some(e);
            }
        }
    });
}
