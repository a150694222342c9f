//! # SubscriberSet: fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each [`Event`] to every subscriber that
//! [accepts](Subscribe::accepts) it, through one bounded queue and one worker per subscriber.
//!
//! ## What it guarantees
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught and logged (isolation).
//! - With `DropNewest`, `emit` never waits.
//!
//! ## What it does **not** guarantee
//! - No retries on overflow (events are dropped for that subscriber).
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        │                        (Arc-clone per accepting subscriber)
//!        ├────────────────► [queue S1] ─► worker S1 ─► on_event()
//!        ├────────────────► [queue S2] ─► worker S2 ─► on_event()
//!        └────────────────► [queue SN] ─► worker SN ─► on_event()
//! ```

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{error, warn};

use super::{OverflowPolicy, Subscribe};
use crate::events::Event;

/// Per-subscriber channel with metadata.
struct SubscriberChannel {
    sub: Arc<dyn Subscribe>,
    overflow: OverflowPolicy,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            let s = Arc::clone(&sub);

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = s.on_event(ev.as_ref());
                    if let Err(panic) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        error!(
                            subscriber = s.name(),
                            key = ev.key(),
                            ?panic,
                            "subscriber panicked"
                        );
                    }
                }
            });

            channels.push(SubscriberChannel {
                overflow: sub.overflow(),
                sub,
                sender: tx,
            });
            workers.push(handle);
        }

        Self { channels, workers }
    }

    /// Fans one event out to every accepting subscriber.
    ///
    /// Only waits when a full queue belongs to a subscriber with [`OverflowPolicy::Block`].
    pub async fn emit(&self, event: &Event) {
        let mut shared: Option<Arc<Event>> = None;
        for channel in &self.channels {
            if !channel.sub.accepts(event) {
                continue;
            }
            let ev = Arc::clone(shared.get_or_insert_with(|| Arc::new(event.clone())));
            let name = channel.sub.name();

            match channel.overflow {
                OverflowPolicy::DropNewest => match channel.sender.try_send(ev) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(subscriber = name, key = event.key(), "queue full; event dropped");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        warn!(subscriber = name, key = event.key(), "worker closed; event dropped");
                    }
                },
                OverflowPolicy::Block => {
                    if channel.sender.send(ev).await.is_err() {
                        warn!(subscriber = name, key = event.key(), "worker closed; event dropped");
                    }
                }
            }
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}
