//! # Consumer: one task per registered producer.
//!
//! Drains the producer's subscription, decodes every payload with the shared
//! [`Codec`](crate::Codec) and publishes a `MessageReceived` event per readout.
//!
//! ## Flow
//! ```text
//! loop {
//!   ├─► wait for next delivery   (cancellable, optionally bounded by idle_timeout)
//!   │     ├─ token cancelled   ─► exit Cancelled
//!   │     ├─ stream ended      ─► exit Closed
//!   │     └─ idle timeout hit  ─► exit Idle
//!   ├─► codec.decode(body)
//!   │     └─ Err ─► warn!, malformed += 1, continue
//!   └─► aggregator.publish(MessageReceived_<routing_key>)
//!         └─ Err ─► debug!, unrouted += 1
//! }
//! ```
//!
//! ## Rules
//! - Payloads are handled **sequentially**, so events keep the arrival order.
//! - A bad payload never ends the task.
//! - Cancellation is observed only while waiting for a delivery.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::StreamExt;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::broker::{Delivery, DeliveryStream};
use crate::codec::CodecRef;
use crate::events::{Aggregator, Event, EventData};

/// Why a consumer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerExit {
    /// The broker closed the subscription.
    Closed,
    /// The runtime token was cancelled.
    Cancelled,
    /// No delivery arrived within the idle timeout.
    Idle,
}

impl ConsumerExit {
    pub fn as_label(&self) -> &'static str {
        match self {
            ConsumerExit::Closed => "subscription_closed",
            ConsumerExit::Cancelled => "cancelled",
            ConsumerExit::Idle => "idle_timeout",
        }
    }
}

/// Per-producer counters shared between the consumer and the registry.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    received: AtomicU64,
    forwarded: AtomicU64,
    malformed: AtomicU64,
    unrouted: AtomicU64,
}

impl Counters {
    pub(crate) fn snapshot(&self) -> ProducerStats {
        ProducerStats {
            received: self.received.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            unrouted: self.unrouted.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counters of one producer's consumption task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    /// Payloads taken from the subscription.
    pub received: u64,
    /// Events published onto the aggregated stream.
    pub forwarded: u64,
    /// Payloads dropped because they did not decode.
    pub malformed: u64,
    /// Decoded readouts that found no receiver on the aggregated stream.
    pub unrouted: u64,
}

/// Consumption task bound to one producer subscription.
pub(crate) struct Consumer {
    producer: Arc<str>,
    stream: DeliveryStream,
    codec: CodecRef,
    aggregator: Aggregator,
    idle_timeout: Option<Duration>,
    counters: Arc<Counters>,
}

impl Consumer {
    pub(crate) fn new(
        producer: Arc<str>,
        stream: DeliveryStream,
        codec: CodecRef,
        aggregator: Aggregator,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            producer,
            stream,
            codec,
            aggregator,
            idle_timeout,
            counters: Arc::new(Counters::default()),
        }
    }

    pub(crate) fn producer(&self) -> &Arc<str> {
        &self.producer
    }

    pub(crate) fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }

    /// Runs until the subscription closes, the token is cancelled or the producer idles out.
    pub(crate) async fn run(mut self, token: CancellationToken) -> ConsumerExit {
        debug!(producer = %self.producer, "consumer started");
        let exit = loop {
            let next = tokio::select! {
                _ = token.cancelled() => break ConsumerExit::Cancelled,
                n = next_delivery(&mut self.stream, self.idle_timeout) => n,
            };
            match next {
                Ok(Some(delivery)) => self.forward(delivery),
                Ok(None) => break ConsumerExit::Closed,
                Err(_elapsed) => break ConsumerExit::Idle,
            }
        };
        info!(producer = %self.producer, reason = exit.as_label(), "consumer stopped");
        exit
    }

    /// Decodes one payload and publishes it; failures are logged and counted.
    fn forward(&self, delivery: Delivery) {
        self.counters.received.fetch_add(1, Ordering::Relaxed);

        let readout = match self.codec.decode(&delivery.body) {
            Ok(r) => r,
            Err(e) => {
                self.counters.malformed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    producer = %self.producer,
                    codec = self.codec.name(),
                    error = %e,
                    bytes = delivery.body.len(),
                    "dropping malformed payload"
                );
                return;
            }
        };

        let event = Event::received(delivery.routing_key, EventData::from(readout));
        match self.aggregator.publish(event) {
            Ok(_) => {
                self.counters.forwarded.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.counters.unrouted.fetch_add(1, Ordering::Relaxed);
                debug!(producer = %self.producer, error = %e, "readout not delivered");
            }
        }
    }
}

async fn next_delivery(
    stream: &mut DeliveryStream,
    idle: Option<Duration>,
) -> Result<Option<Delivery>, time::error::Elapsed> {
    match idle {
        Some(d) => time::timeout(d, stream.next()).await,
        None => Ok(stream.next().await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Codec, JsonCodec, Readout};
    use futures::stream;
    use tokio::sync::mpsc;

    fn body(value: f64) -> Vec<u8> {
        JsonCodec.encode(&Readout::now("hum-2", value)).unwrap()
    }

    fn consumer_over(deliveries: Vec<Delivery>, aggregator: &Aggregator) -> Consumer {
        Consumer::new(
            "hum-2".into(),
            stream::iter(deliveries).boxed(),
            Arc::new(JsonCodec),
            aggregator.clone(),
            None,
        )
    }

    #[tokio::test]
    async fn malformed_payload_is_skipped() {
        let agg = Aggregator::new(16);
        let mut rx = agg.subscribe();
        let consumer = consumer_over(
            vec![
                Delivery::new("hum-2", b"garbage".to_vec()),
                Delivery::new("hum-2", body(40.0)),
            ],
            &agg,
        );
        let counters = consumer.counters();

        let exit = consumer.run(CancellationToken::new()).await;

        assert_eq!(exit, ConsumerExit::Closed);
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.key(), "MessageReceived_hum-2");
        assert_eq!(ev.data().unwrap().value, 40.0);
        assert_eq!(
            counters.snapshot(),
            ProducerStats {
                received: 2,
                forwarded: 1,
                malformed: 1,
                unrouted: 0
            }
        );
    }

    #[tokio::test]
    async fn qualifier_is_routing_key() {
        let agg = Aggregator::new(16);
        let mut rx = agg.subscribe();
        let consumer = consumer_over(vec![Delivery::new("line-7", body(1.0))], &agg);
        consumer.run(CancellationToken::new()).await;

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.qualifier(), "line-7");
        assert_eq!(ev.data().unwrap().name, "hum-2");
    }

    #[tokio::test]
    async fn unrouted_readouts_are_counted() {
        let agg = Aggregator::new(16);
        let consumer = consumer_over(vec![Delivery::new("hum-2", body(1.0))], &agg);
        let counters = consumer.counters();
        consumer.run(CancellationToken::new()).await;
        assert_eq!(counters.snapshot().unrouted, 1);
    }

    #[tokio::test]
    async fn cancellation_stops_waiting_consumer() {
        let (_tx, rx) = mpsc::unbounded_channel::<Delivery>();
        let pending = stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|d| (d, rx)) });
        let consumer = Consumer::new(
            "hum-2".into(),
            pending.boxed(),
            Arc::new(JsonCodec),
            Aggregator::new(4),
            None,
        );
        let token = CancellationToken::new();
        let handle = tokio::spawn(consumer.run(token.clone()));

        token.cancel();
        assert_eq!(handle.await.unwrap(), ConsumerExit::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_producer_times_out() {
        let (_tx, rx) = mpsc::unbounded_channel::<Delivery>();
        let pending = stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|d| (d, rx)) });
        let consumer = Consumer::new(
            "hum-2".into(),
            pending.boxed(),
            Arc::new(JsonCodec),
            Aggregator::new(4),
            Some(Duration::from_secs(30)),
        );

        let exit = consumer.run(CancellationToken::new()).await;
        assert_eq!(exit, ConsumerExit::Idle);
    }
}
