//! # Fan-in aggregator for qualified events.
//!
//! [`Aggregator`] is a thin wrapper around [`tokio::sync::broadcast`] that lets any
//! number of consumption tasks publish concurrently into one stream.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                      Receivers (many):
//!   Listener   ──┐                     ┌──► EventStream (downstream code)
//!   Consumer A ──┼──► Aggregator ──────┼──► EventStream (tests, dashboards)
//!   Consumer B ──┤   (ring buffer)     └──► subscriber forwarder ──► SubscriberSet
//!   Consumer N ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits; it calls `broadcast::Sender::send`.
//! - **Per-publisher order**: events sent by one task are observed in send order.
//! - **Bounded capacity**: one ring buffer of `capacity` events shared by all receivers.
//! - **Drop-oldest on lag**: a receiver that falls behind skips the oldest events and
//!   [`EventStream`] logs how many were lost.
//! - **No receivers**: the event is dropped and [`PublishError::NoReceivers`] returned.

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tracing::warn;

use super::event::{Event, EventKind, Payload};
use crate::error::PublishError;

/// Shared handle to the aggregated event stream.
///
/// Cheap to clone; every clone publishes into the same ring buffer.
#[derive(Clone, Debug)]
pub struct Aggregator {
    tx: broadcast::Sender<Event>,
}

impl Aggregator {
    /// Creates a new aggregator with the given ring buffer capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to every current receiver.
    ///
    /// Returns the number of receivers that will observe it.
    pub fn publish(&self, ev: Event) -> Result<usize, PublishError> {
        self.tx.send(ev).map_err(|broadcast::error::SendError(ev)| {
            PublishError::NoReceivers {
                key: ev.key().to_string(),
            }
        })
    }

    /// Forms the qualified event from its parts and publishes it.
    pub fn publish_kind(
        &self,
        kind: EventKind,
        qualifier: &str,
        payload: Payload,
    ) -> Result<usize, PublishError> {
        self.publish(Event::new(kind, qualifier, payload))
    }

    /// Creates an independent receiver of events published from now on.
    pub fn subscribe(&self) -> EventStream {
        EventStream {
            rx: self.tx.subscribe(),
            lagged: 0,
        }
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Receiving half of the aggregated stream.
pub struct EventStream {
    rx: broadcast::Receiver<Event>,
    lagged: u64,
}

impl EventStream {
    /// Waits for the next event.
    ///
    /// Returns `None` once every [`Aggregator`] handle has been dropped.
    /// Lag is logged and skipped rather than surfaced.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.rx.recv().await {
                Ok(ev) => return Some(ev),
                Err(RecvError::Lagged(n)) => {
                    self.lagged += n;
                    warn!(skipped = n, total = self.lagged, "aggregated stream receiver lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Takes the next buffered event without waiting.
    ///
    /// Returns `None` when nothing is buffered or the stream is closed.
    pub fn try_recv(&mut self) -> Option<Event> {
        loop {
            match self.rx.try_recv() {
                Ok(ev) => return Some(ev),
                Err(TryRecvError::Lagged(n)) => {
                    self.lagged += n;
                    warn!(skipped = n, total = self.lagged, "aggregated stream receiver lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Total number of events this receiver lost to lag.
    pub fn lagged(&self) -> u64 {
        self.lagged
    }

    /// Converts the receiver into a `futures` stream.
    pub fn into_stream(self) -> BoxStream<'static, Event> {
        stream::unfold(self, |mut s| async move { s.recv().await.map(|ev| (ev, s)) }).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn publish_without_receivers_reports_dropped_key() {
        let agg = Aggregator::new(8);
        let err = agg.publish(Event::discovered("temp-1")).unwrap_err();
        assert_eq!(
            err,
            PublishError::NoReceivers {
                key: "SensorDiscovered_temp-1".into()
            }
        );
    }

    #[tokio::test]
    async fn every_receiver_sees_every_event() {
        let agg = Aggregator::new(8);
        let mut a = agg.subscribe();
        let mut b = agg.subscribe();

        assert_eq!(agg.publish(Event::discovered("x")).unwrap(), 2);

        assert_eq!(a.recv().await.unwrap().key(), "SensorDiscovered_x");
        assert_eq!(b.recv().await.unwrap().key(), "SensorDiscovered_x");
    }

    #[tokio::test]
    async fn publish_kind_builds_composite_key() {
        let agg = Aggregator::new(8);
        let mut rx = agg.subscribe();
        agg.publish_kind(
            EventKind::SensorDiscovered,
            "hum-2",
            Payload::Producer(Arc::from("hum-2")),
        )
        .unwrap();
        assert_eq!(rx.recv().await.unwrap().key(), "SensorDiscovered_hum-2");
    }

    #[tokio::test]
    async fn lagging_receiver_drops_oldest() {
        let agg = Aggregator::new(2);
        let mut rx = agg.subscribe();
        for name in ["a", "b", "c", "d"] {
            agg.publish(Event::discovered(name)).unwrap();
        }

        assert_eq!(rx.recv().await.unwrap().qualifier(), "c");
        assert_eq!(rx.lagged(), 2);
        assert_eq!(rx.recv().await.unwrap().qualifier(), "d");
    }

    #[tokio::test]
    async fn try_recv_drains_buffered_events() {
        let agg = Aggregator::new(8);
        let mut rx = agg.subscribe();
        assert!(rx.try_recv().is_none());

        agg.publish(Event::discovered("a")).unwrap();
        agg.publish(Event::discovered("b")).unwrap();
        assert_eq!(rx.try_recv().unwrap().qualifier(), "a");
        assert_eq!(rx.try_recv().unwrap().qualifier(), "b");
        assert!(rx.try_recv().is_none());
    }

    #[tokio::test]
    async fn stream_ends_when_aggregator_dropped() {
        let agg = Aggregator::new(4);
        let mut stream = agg.subscribe().into_stream();
        agg.publish(Event::discovered("x")).unwrap();
        drop(agg);

        assert_eq!(stream.next().await.unwrap().qualifier(), "x");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn concurrent_publishers_keep_their_own_order() {
        let agg = Aggregator::new(1024);
        let mut rx = agg.subscribe();

        let mut handles = Vec::new();
        for p in ["a", "b", "c"] {
            let agg = agg.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..100u32 {
                    let ev = Event::received(
                        p,
                        crate::events::EventData {
                            name: p.to_string(),
                            value: f64::from(i),
                            timestamp: chrono::Utc::now(),
                        },
                    );
                    agg.publish(ev).unwrap();
                    tokio::task::yield_now().await;
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let mut last = std::collections::HashMap::new();
        for _ in 0..300 {
            let ev = rx.recv().await.unwrap();
            let v = ev.data().unwrap().value;
            let prev = last.insert(ev.qualifier().to_string(), v);
            assert!(prev.is_none_or(|p| p < v));
        }
        assert_eq!(rx.lagged(), 0);
    }
}
