//! # Producer registry - one live consumption task per producer identity.
//!
//! The listener's discovery loop is the only writer:
//! - advertisement of an unknown producer → `spawn_and_register(consumer)`
//! - consumer exit (closed / idle) → `cleanup(name)`
//! - listener shutdown → `cancel_all(grace)`
//!
//! ## Architecture
//! ```text
//! Listener loop ──► Registry
//!                     ├─► spawn_and_register(consumer) → tokio::spawn(consumer.run(child_token))
//!                     │                                    └─► on exit: exits.send((name, reason))
//!                     ├─► cleanup(name)                  → remove + join
//!                     └─► cancel_all(grace)              → cancel → join (bounded by grace)
//! ```
//!
//! ## Rules
//! - Registry owns the task handles (JoinHandle + CancellationToken + counters)
//! - Check-and-insert happens under one write lock, so a producer can never get two consumers
//! - Entries are only removed after their task has exited or been cancelled

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::consumer::{Consumer, ConsumerExit, Counters, ProducerStats};

/// Channel consumers report their exit on.
pub(crate) type ExitSender = mpsc::UnboundedSender<(Arc<str>, ConsumerExit)>;

/// Handle to a running consumption task.
struct Handle {
    join: JoinHandle<ConsumerExit>,
    cancel: CancellationToken,
    counters: Arc<Counters>,
    since: SystemTime,
}

/// Registry of producers with an active consumption task.
pub(crate) struct Registry {
    producers: RwLock<HashMap<Arc<str>, Handle>>,
    runtime_token: CancellationToken,
}

impl Registry {
    pub(crate) fn new(runtime_token: CancellationToken) -> Self {
        Self {
            producers: RwLock::new(HashMap::new()),
            runtime_token,
        }
    }

    pub(crate) async fn contains(&self, name: &str) -> bool {
        self.producers.read().await.contains_key(name)
    }

    /// Returns sorted list of registered producers.
    pub(crate) async fn list(&self) -> Vec<String> {
        let producers = self.producers.read().await;
        let mut names: Vec<String> = producers.keys().map(|k| k.to_string()).collect();
        names.sort_unstable();
        names
    }

    pub(crate) async fn stats(&self, name: &str) -> Option<ProducerStats> {
        self.producers
            .read()
            .await
            .get(name)
            .map(|h| h.counters.snapshot())
    }

    /// Time the producer was registered.
    pub(crate) async fn registered_at(&self, name: &str) -> Option<SystemTime> {
        self.producers.read().await.get(name).map(|h| h.since)
    }

    /// Spawns the consumer and records it, unless the producer is already registered.
    ///
    /// Returns `false` (and drops the consumer with its subscription) for a duplicate.
    pub(crate) async fn spawn_and_register(&self, consumer: Consumer, exits: ExitSender) -> bool {
        let name = Arc::clone(consumer.producer());
        let mut producers = self.producers.write().await;
        if producers.contains_key(&name) {
            debug!(producer = %name, "already registered; dropping redundant subscription");
            return false;
        }

        let cancel = self.runtime_token.child_token();
        let counters = consumer.counters();
        let token = cancel.clone();
        let reported = Arc::clone(&name);
        let join = tokio::spawn(async move {
            let exit = consumer.run(token).await;
            let _ = exits.send((reported, exit));
            exit
        });

        producers.insert(
            Arc::clone(&name),
            Handle {
                join,
                cancel,
                counters,
                since: SystemTime::now(),
            },
        );
        info!(producer = %name, "producer registered");
        true
    }

    /// Removes a producer whose consumer has exited on its own.
    pub(crate) async fn cleanup(&self, name: &str, exit: ConsumerExit) {
        let handle = self.producers.write().await.remove(name);
        if let Some(h) = handle {
            if h.join.await.is_err() {
                error!(producer = %name, "consumer panicked");
            }
            info!(producer = %name, reason = exit.as_label(), "producer deregistered");
        }
    }

    /// Cancels every consumer and waits up to `grace` for them to finish.
    ///
    /// Returns the producers whose task was still running when the grace ran out.
    pub(crate) async fn cancel_all(&self, grace: Duration) -> Result<(), Vec<String>> {
        let handles: Vec<(Arc<str>, Handle)> = {
            let mut producers = self.producers.write().await;
            producers.drain().collect()
        };

        for (_, h) in &handles {
            h.cancel.cancel();
        }

        let deadline = tokio::time::Instant::now() + grace;
        let mut stuck = Vec::new();
        for (name, h) in handles {
            let abort = h.join.abort_handle();
            match tokio::time::timeout_at(deadline, h.join).await {
                Ok(Ok(_)) => {}
                Ok(Err(_)) => error!(producer = %name, "consumer panicked"),
                Err(_) => {
                    abort.abort();
                    stuck.push(name.to_string());
                }
            }
        }

        if stuck.is_empty() { Ok(()) } else { Err(stuck) }
    }
}
