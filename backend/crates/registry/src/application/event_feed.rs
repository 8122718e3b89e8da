//! Registry Log Feed
//!
//! Tails the contract's registry logs from a block cursor and publishes
//! them to an `EventHub`. A failed poll leaves the cursor in place, so the
//! same range is queried again on the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::application::subscription::EventHub;
use crate::domain::events::{LogPosition, RegistryEvent};
use crate::domain::repository::{ChainReader, LogRange};
use crate::error::ChainReadResult;

pub struct LogFeed {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl LogFeed {
    /// Start polling every `interval`
    ///
    /// With `from_block = None` the feed starts after the head observed on
    /// its first successful poll and only reports events from then on.
    pub fn spawn<R>(
        reader: Arc<R>,
        hub: EventHub,
        from_block: Option<u64>,
        interval: Duration,
    ) -> Self
    where
        R: ChainReader + Send + Sync + 'static,
    {
        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut cursor = from_block;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        match poll_once(reader.as_ref(), &hub, cursor).await {
                            Ok(next) => cursor = Some(next),
                            Err(e) => {
                                tracing::warn!(error = %e, cursor = ?cursor, "Registry log poll failed");
                            }
                        }
                    }
                }
            }

            tracing::debug!(cursor = ?cursor, "Registry log feed stopped");
        });

        Self { shutdown, handle }
    }

    /// Stop polling and wait for the task to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Registry log feed task failed");
        }
    }
}

/// Publish every registry event in `[cursor, head]`; returns the next cursor
pub async fn poll_once<R>(reader: &R, hub: &EventHub, cursor: Option<u64>) -> ChainReadResult<u64>
where
    R: ChainReader + Sync,
{
    let head = reader.block_number().await?;
    let from = match cursor {
        Some(from) => from,
        None => return Ok(head.saturating_add(1)),
    };
    if from > head {
        return Ok(from);
    }

    let range = LogRange::between(from, head);
    let (requested, registered, rejected) = tokio::try_join!(
        reader.requested_events(range),
        reader.registered_events(range),
        reader.rejected_events(range),
    )?;

    let mut events: Vec<(LogPosition, RegistryEvent)> =
        Vec::with_capacity(requested.len() + registered.len() + rejected.len());
    events.extend(requested.into_iter().map(|log| (log.position, log.into())));
    events.extend(registered.into_iter().map(|log| {
        (
            log.position,
            RegistryEvent::Registered {
                institute: log.institute,
            },
        )
    }));
    events.extend(rejected.into_iter().map(|log| {
        (
            log.position,
            RegistryEvent::Rejected {
                institute: log.institute,
            },
        )
    }));
    events.sort_by_key(|(position, _)| *position);

    if !events.is_empty() {
        tracing::debug!(from, to = head, count = events.len(), "Publishing registry events");
    }
    for (_, event) in events {
        hub.publish(event);
    }

    Ok(head.saturating_add(1))
}
