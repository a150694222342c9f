//! # Listener: discovers producers and fans their readouts into one stream.
//!
//! The [`Listener`] owns the [`Aggregator`], the producer registry and the
//! [`SubscriberSet`]. It listens for producer advertisements, keeps exactly one
//! consumption task per producer identity, and stops on request or when the broker
//! closes the advertisement stream.
//!
//! ## Key responsibilities
//! - subscribe to the advertisement exchange and send one discovery request
//! - publish `SensorDiscovered` for **every** advertisement (re-deliveries included)
//! - register unknown producers and spawn their consumption task
//! - remove producers whose task ended (subscription closed, idle eviction)
//! - forward the aggregated stream to subscribers
//! - cancel and join every consumption task within [`Config::grace`] on exit
//!
//! ## High-level architecture
//! ```text
//! start():
//!   broker.subscribe_exchange(advertise_exchange)   (fatal on error)
//!   discovery_request()                             (fatal on error)
//!   subscriber_listener(): Aggregator.subscribe() ─► SubscriberSet::emit(&Event)
//!
//! Discovery loop (select, biased):
//!   runtime_token.cancelled()  ─► break
//!   exits_rx  (name, exit)     ─► registry.cleanup(name)
//!                                  └─ Idle ─► discovery_request()
//!   advertisement(body)        ─► on_advertisement():
//!        ├─► Aggregator.publish(SensorDiscovered_<name>)
//!        ├─► registered?  ─► yes: done
//!        ├─► broker.subscribe_queue(name)
//!        └─► registry.spawn_and_register(Consumer)
//!                 └─► tokio::spawn(consumer.run(child_token))
//!
//! Exit path (stop() or stream closed):
//!   runtime_token.cancel()   → propagates to every consumer's child token
//!   registry.cancel_all(grace)
//!   drain forwarder          → emit buffered events, flush every subscriber queue
//!   result:
//!        ├─ Ok            → Ok(())
//!        └─ grace elapsed → Err(RuntimeError::GraceExceeded { stuck })
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use sensorhub::{Config, Listener, MemoryBroker};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let broker = Arc::new(MemoryBroker::new());
//!     let listener = Listener::builder(Config::default(), broker).build();
//!
//!     let mut events = listener.subscribe();
//!     let running = {
//!         let l = Arc::clone(&listener);
//!         tokio::spawn(async move { l.start().await })
//!     };
//!
//!     if let Some(ev) = events.recv().await {
//!         println!("{}", ev.key());
//!     }
//!
//!     listener.stop().await?;
//!     running.await??;
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::builder::ListenerBuilder;
use super::config::Config;
use super::consumer::{Consumer, ConsumerExit, ProducerStats};
use super::registry::{ExitSender, Registry};
use crate::broker::{BrokerRef, Delivery};
use crate::codec::CodecRef;
use crate::error::{BrokerError, RuntimeError};
use crate::events::{Aggregator, Event, EventStream};
use crate::subscribers::SubscriberSet;

/// Discovery listener and owner of the aggregated stream.
pub struct Listener {
    cfg: Config,
    broker: BrokerRef,
    codec: CodecRef,
    aggregator: Aggregator,
    subs: Mutex<Option<SubscriberSet>>,
    registry: Registry,
    runtime_token: CancellationToken,
    started: AtomicBool,
}

impl Listener {
    /// Creates a builder for the listener.
    pub fn builder(cfg: Config, broker: BrokerRef) -> ListenerBuilder {
        ListenerBuilder::new(cfg, broker)
    }

    pub(super) fn new_internal(
        cfg: Config,
        broker: BrokerRef,
        codec: CodecRef,
        aggregator: Aggregator,
        subs: SubscriberSet,
        runtime_token: CancellationToken,
    ) -> Self {
        Self {
            registry: Registry::new(runtime_token.clone()),
            cfg,
            broker,
            codec,
            aggregator,
            subs: Mutex::new(Some(subs)),
            runtime_token,
            started: AtomicBool::new(false),
        }
    }

    /// Runs discovery until [`stop`](Self::stop) is called or the broker closes
    /// the advertisement stream.
    ///
    /// Returns once every consumer has stopped and every subscriber has processed
    /// the events published before that.
    ///
    /// Can be called once per listener; a second call returns
    /// [`RuntimeError::AlreadyStarted`].
    pub async fn start(&self) -> Result<(), RuntimeError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyStarted);
        }

        let mut adverts = self
            .broker
            .subscribe_exchange(&self.cfg.advertise_exchange)
            .await
            .map_err(|e| RuntimeError::setup("advertisement subscription", e))?;
        self.discovery_request().await?;

        let drain = CancellationToken::new();
        let forwarder = self.subscriber_listener(drain.clone());
        let (exits_tx, mut exits_rx): (ExitSender, _) = mpsc::unbounded_channel();
        info!(exchange = %self.cfg.advertise_exchange, "listening for advertisements");

        loop {
            tokio::select! {
                biased;
                _ = self.runtime_token.cancelled() => {
                    info!("stop requested");
                    break;
                }
                Some((name, exit)) = exits_rx.recv() => {
                    self.registry.cleanup(&name, exit).await;
                    if exit == ConsumerExit::Idle {
                        self.rediscover().await;
                    }
                }
                advert = adverts.next() => match advert {
                    Some(delivery) => self.on_advertisement(delivery, &exits_tx).await,
                    None => {
                        info!("advertisement stream closed");
                        break;
                    }
                },
            }
        }

        self.runtime_token.cancel();
        let res = self.registry.cancel_all(self.cfg.grace).await;
        drain.cancel();
        if let Some(h) = forwarder {
            let _ = h.await;
        }

        match res {
            Ok(()) => {
                info!("all consumers stopped within grace");
                Ok(())
            }
            Err(stuck) => {
                warn!(grace = ?self.cfg.grace, ?stuck, "grace exceeded");
                Err(RuntimeError::GraceExceeded {
                    grace: self.cfg.grace,
                    stuck,
                })
            }
        }
    }

    /// Cancels discovery and every consumption task, then closes the broker connection.
    pub async fn stop(&self) -> Result<(), BrokerError> {
        self.runtime_token.cancel();
        self.broker.close().await
    }

    /// Asks every live producer to advertise itself again.
    ///
    /// Declares the discovery exchange (idempotent) and publishes one empty message
    /// on it with [`Config::discovery_routing_key`].
    pub async fn discovery_request(&self) -> Result<(), RuntimeError> {
        let exchange = &self.cfg.discovery_exchange;
        self.broker
            .declare_exchange(exchange)
            .await
            .map_err(|e| RuntimeError::setup("discovery exchange declaration", e))?;
        self.broker
            .publish_exchange(exchange, &self.cfg.discovery_routing_key, Vec::new())
            .await
            .map_err(|e| RuntimeError::setup("discovery request", e))?;
        info!(exchange = %exchange, "discovery request sent");
        Ok(())
    }

    /// The aggregated stream.
    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Subscribes to events published from now on.
    pub fn subscribe(&self) -> EventStream {
        self.aggregator.subscribe()
    }

    /// Sorted identities of the registered producers.
    pub async fn producers(&self) -> Vec<String> {
        self.registry.list().await
    }

    /// Counters of a registered producer's consumption task.
    pub async fn stats(&self, producer: &str) -> Option<ProducerStats> {
        self.registry.stats(producer).await
    }

    /// When `producer` was registered.
    pub async fn registered_at(&self, producer: &str) -> Option<SystemTime> {
        self.registry.registered_at(producer).await
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    async fn on_advertisement(&self, delivery: Delivery, exits: &ExitSender) {
        let name = match std::str::from_utf8(&delivery.body) {
            Ok("") => {
                warn!("ignoring empty advertisement");
                return;
            }
            Ok(name) => name,
            Err(e) => {
                warn!(
                    error = %e,
                    bytes = delivery.body.len(),
                    "ignoring non-UTF-8 advertisement"
                );
                return;
            }
        };
        let producer: Arc<str> = Arc::from(name);

        if let Err(e) = self.aggregator.publish(Event::discovered(Arc::clone(&producer))) {
            debug!(producer = %producer, error = %e, "discovery not delivered");
        }

        if self.registry.contains(&producer).await {
            debug!(producer = %producer, "already registered");
            return;
        }

        let stream = match self.broker.subscribe_queue(&producer).await {
            Ok(s) => s,
            Err(e) => {
                warn!(producer = %producer, error = %e, "cannot subscribe to producer queue");
                return;
            }
        };

        let consumer = Consumer::new(
            producer,
            stream,
            Arc::clone(&self.codec),
            self.aggregator.clone(),
            self.cfg.idle_timeout(),
        );
        self.registry.spawn_and_register(consumer, exits.clone()).await;
    }

    /// Asks for fresh advertisements after an idle eviction.
    ///
    /// An advertisement handled while the evicted consumer was still registered
    /// was skipped; the request lets a producer that is still alive register again.
    async fn rediscover(&self) {
        if let Err(e) = self.discovery_request().await {
            warn!(error = %e, "discovery request after eviction failed");
        }
    }

    /// Forwards the aggregated stream to the subscriber set until `drain` is cancelled.
    ///
    /// On `drain`, the events still buffered for the forwarder are emitted and every
    /// subscriber queue is flushed before the task ends.
    fn subscriber_listener(&self, drain: CancellationToken) -> Option<JoinHandle<()>> {
        let set = self
            .subs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()?;
        if set.is_empty() {
            return None;
        }
        let mut rx = self.aggregator.subscribe();
        Some(tokio::spawn(async move {
            loop {
                let ev = tokio::select! {
                    _ = drain.cancelled() => break,
                    ev = rx.recv() => ev,
                };
                match ev {
                    Some(ev) => set.emit(&ev).await,
                    None => break,
                }
            }
            while let Some(ev) = rx.try_recv() {
                set.emit(&ev).await;
            }
            set.shutdown().await;
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{Broker, DISCOVERY_EXCHANGE, FANOUT_EXCHANGE, MemoryBroker};
    use crate::codec::{JsonCodec, Readout};
    use crate::events::{EventKind, Payload};
    use crate::producer::Producer;
    use crate::subscribers::{OverflowPolicy, Subscribe};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::time::Duration;
    use tokio::sync::Mutex;

    struct Running {
        broker: Arc<MemoryBroker>,
        listener: Arc<Listener>,
        events: EventStream,
        run: JoinHandle<Result<(), RuntimeError>>,
    }

    impl Running {
        fn producer(&self, name: &str) -> Producer {
            Producer::new(name, self.broker.clone(), Arc::new(JsonCodec))
        }

        async fn next(&mut self) -> Event {
            tokio::time::timeout(Duration::from_secs(5), self.events.recv())
                .await
                .expect("event in time")
                .expect("stream open")
        }

        async fn finish(self) -> Result<(), RuntimeError> {
            self.listener.stop().await.unwrap();
            self.run.await.unwrap()
        }
    }

    async fn run_with(cfg: Config, subs: Vec<Arc<dyn Subscribe>>) -> Running {
        let broker = Arc::new(MemoryBroker::new());
        let listener = Listener::builder(cfg, broker.clone())
            .with_subscribers(subs)
            .build();
        let events = listener.subscribe();
        let run = {
            let l = Arc::clone(&listener);
            tokio::spawn(async move { l.start().await })
        };
        while broker.subscriber_count(FANOUT_EXCHANGE) == 0 {
            tokio::task::yield_now().await;
        }
        Running {
            broker,
            listener,
            events,
            run,
        }
    }

    async fn run() -> Running {
        run_with(Config::default(), Vec::new()).await
    }

    #[tokio::test]
    async fn advertisement_then_payload() {
        let mut rt = run().await;
        let p = rt.producer("temp-1");
        let t = chrono::Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();

        p.advertise().await.unwrap();
        p.send(&Readout {
            name: "temp-1".into(),
            value: 21.5,
            timestamp: t,
        })
        .await
        .unwrap();

        let first = rt.next().await;
        assert_eq!(first.key(), "SensorDiscovered_temp-1");
        assert_eq!(first.payload, Payload::Producer("temp-1".into()));

        let second = rt.next().await;
        assert_eq!(second.key(), "MessageReceived_temp-1");
        let data = second.data().unwrap();
        assert_eq!(data.name, "temp-1");
        assert_eq!(data.value, 21.5);
        assert_eq!(data.timestamp, t);

        assert_eq!(rt.listener.producers().await, vec!["temp-1"]);
        assert!(rt.listener.registered_at("temp-1").await.is_some());
        rt.finish().await.unwrap();
    }

    #[tokio::test]
    async fn repeated_advertisement_registers_once() {
        let mut rt = run().await;
        let p = rt.producer("temp-1");
        p.advertise().await.unwrap();
        p.advertise().await.unwrap();

        for _ in 0..2 {
            assert_eq!(rt.next().await.key(), "SensorDiscovered_temp-1");
        }
        assert_eq!(rt.broker.consumer_count("temp-1"), 1);
        assert_eq!(rt.listener.producers().await, vec!["temp-1"]);

        p.send(&Readout::now("temp-1", 1.0)).await.unwrap();
        assert_eq!(rt.next().await.key(), "MessageReceived_temp-1");
        rt.finish().await.unwrap();
    }

    #[tokio::test]
    async fn malformed_payload_does_not_stop_consumer() {
        let mut rt = run().await;
        let p = rt.producer("hum-2");
        p.advertise().await.unwrap();
        assert_eq!(rt.next().await.key(), "SensorDiscovered_hum-2");

        rt.broker.publish_queue("hum-2", b"{not json".to_vec()).await.unwrap();
        p.send(&Readout::now("hum-2", 40.0)).await.unwrap();

        let ev = rt.next().await;
        assert_eq!(ev.key(), "MessageReceived_hum-2");
        assert_eq!(ev.data().unwrap().value, 40.0);

        let stats = rt.listener.stats("hum-2").await.unwrap();
        assert_eq!(stats.received, 2);
        assert_eq!(stats.malformed, 1);

        p.send(&Readout::now("hum-2", 41.0)).await.unwrap();
        assert_eq!(rt.next().await.data().unwrap().value, 41.0);
        assert_eq!(rt.listener.producers().await, vec!["hum-2"]);
        rt.finish().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_producers_keep_their_order() {
        let mut rt = run().await;
        let a = rt.producer("a");
        let b = rt.producer("b");
        a.advertise().await.unwrap();
        b.advertise().await.unwrap();

        let sends: Vec<_> = [a, b]
            .into_iter()
            .map(|p| {
                tokio::spawn(async move {
                    for i in 0..100 {
                        p.send(&Readout::now(p.name(), f64::from(i))).await.unwrap();
                    }
                })
            })
            .collect();
        for s in sends {
            s.await.unwrap();
        }

        let mut seen: std::collections::HashMap<String, Vec<f64>> = Default::default();
        let mut received = 0;
        while received < 200 {
            let ev = rt.next().await;
            if ev.kind == EventKind::MessageReceived {
                seen.entry(ev.qualifier().to_string())
                    .or_default()
                    .push(ev.data().unwrap().value);
                received += 1;
            }
        }

        let expected: Vec<f64> = (0..100).map(f64::from).collect();
        assert_eq!(seen["a"], expected);
        assert_eq!(seen["b"], expected);
        rt.finish().await.unwrap();
    }

    #[tokio::test]
    async fn discovery_request_finds_running_producers() {
        let broker = Arc::new(MemoryBroker::new());
        let p = Producer::new("temp-9", broker.clone(), Arc::new(JsonCodec));
        let serve_token = CancellationToken::new();
        let serving = {
            let p = p.clone();
            let t = serve_token.clone();
            tokio::spawn(async move { p.serve_discovery(t).await })
        };
        while broker.subscriber_count(DISCOVERY_EXCHANGE) == 0 {
            tokio::task::yield_now().await;
        }

        let listener = Listener::builder(Config::default(), broker.clone()).build();
        let mut events = listener.subscribe();
        let run = {
            let l = Arc::clone(&listener);
            tokio::spawn(async move { l.start().await })
        };

        let ev = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ev.key(), "SensorDiscovered_temp-9");

        serve_token.cancel();
        serving.await.unwrap().unwrap();
        listener.stop().await.unwrap();
        run.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn closed_advertisement_stream_ends_start() {
        let rt = run().await;
        let p = rt.producer("temp-1");
        p.advertise().await.unwrap();
        while rt.broker.consumer_count("temp-1") == 0 {
            tokio::task::yield_now().await;
        }

        rt.broker.close().await.unwrap();
        let res = tokio::time::timeout(Duration::from_secs(5), rt.run)
            .await
            .unwrap()
            .unwrap();
        assert!(res.is_ok());
        assert!(rt.listener.producers().await.is_empty());
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let rt = run().await;
        let err = rt.listener.start().await.unwrap_err();
        assert_eq!(err.as_label(), "runtime_already_started");
        rt.finish().await.unwrap();
    }

    #[tokio::test]
    async fn closed_broker_is_a_setup_error() {
        let broker = Arc::new(MemoryBroker::new());
        broker.close().await.unwrap();
        let listener = Listener::builder(Config::default(), broker).build();

        match listener.start().await {
            Err(RuntimeError::BrokerSetup { stage, source }) => {
                assert_eq!(stage, "advertisement subscription");
                assert_eq!(source, BrokerError::Closed);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_advertisements_are_ignored() {
        let mut rt = run().await;
        rt.broker
            .publish_exchange(FANOUT_EXCHANGE, "", Vec::new())
            .await
            .unwrap();
        rt.broker
            .publish_exchange(FANOUT_EXCHANGE, "", vec![0xff, 0xfe])
            .await
            .unwrap();
        rt.producer("ok").advertise().await.unwrap();

        assert_eq!(rt.next().await.key(), "SensorDiscovered_ok");
        rt.finish().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn idle_producer_is_evicted_and_rediscovered() {
        let cfg = Config {
            idle_timeout: Duration::from_secs(30),
            ..Config::default()
        };
        let mut rt = run_with(cfg, Vec::new()).await;
        let p = rt.producer("temp-1");
        p.advertise().await.unwrap();
        assert_eq!(rt.next().await.key(), "SensorDiscovered_temp-1");
        while rt.listener.producers().await.is_empty() {
            tokio::task::yield_now().await;
        }

        tokio::time::sleep(Duration::from_secs(31)).await;
        while !rt.listener.producers().await.is_empty() {
            tokio::task::yield_now().await;
        }
        assert_eq!(rt.broker.consumer_count("temp-1"), 0);

        p.advertise().await.unwrap();
        assert_eq!(rt.next().await.key(), "SensorDiscovered_temp-1");
        p.send(&Readout::now("temp-1", 2.0)).await.unwrap();
        assert_eq!(rt.next().await.key(), "MessageReceived_temp-1");
        assert_eq!(rt.listener.producers().await, vec!["temp-1"]);
        rt.finish().await.unwrap();
    }

    #[tokio::test]
    async fn malformed_payloads_do_not_disturb_other_producers() {
        let mut rt = run().await;
        let a = rt.producer("a");
        let b = rt.producer("b");
        a.advertise().await.unwrap();
        b.advertise().await.unwrap();

        for i in 0..5 {
            rt.broker.publish_queue("a", b"junk".to_vec()).await.unwrap();
            b.send(&Readout::now("b", f64::from(i))).await.unwrap();
        }

        let mut values = Vec::new();
        while values.len() < 5 {
            let ev = rt.next().await;
            if ev.kind == EventKind::MessageReceived {
                assert_eq!(ev.qualifier(), "b");
                values.push(ev.data().unwrap().value);
            }
        }
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 4.0]);

        while rt.listener.stats("a").await.map_or(0, |s| s.malformed) < 5 {
            tokio::task::yield_now().await;
        }
        assert_eq!(rt.listener.stats("b").await.unwrap().malformed, 0);
        assert_eq!(rt.listener.producers().await, vec!["a", "b"]);
        rt.finish().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn idle_eviction_triggers_discovery_request() {
        let cfg = Config {
            idle_timeout: Duration::from_secs(30),
            ..Config::default()
        };
        let mut rt = run_with(cfg, Vec::new()).await;
        let p = rt.producer("temp-1");
        let serve_token = CancellationToken::new();
        let serving = {
            let p = p.clone();
            let t = serve_token.clone();
            tokio::spawn(async move { p.serve_discovery(t).await })
        };
        while rt.broker.subscriber_count(DISCOVERY_EXCHANGE) == 0 {
            tokio::task::yield_now().await;
        }

        p.advertise().await.unwrap();
        assert_eq!(rt.next().await.key(), "SensorDiscovered_temp-1");

        // eviction at 30s answers with a request; the producer re-advertises
        let ev = tokio::time::timeout(Duration::from_secs(60), rt.events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ev.key(), "SensorDiscovered_temp-1");
        while rt.listener.producers().await.is_empty() {
            tokio::task::yield_now().await;
        }
        assert_eq!(rt.broker.consumer_count("temp-1"), 1);

        serve_token.cancel();
        serving.await.unwrap().unwrap();
        rt.finish().await.unwrap();
    }

    struct SlowBlocking(Mutex<Vec<String>>);

    #[async_trait]
    impl Subscribe for SlowBlocking {
        async fn on_event(&self, ev: &Event) {
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.0.lock().await.push(ev.key().to_string());
        }

        fn queue_capacity(&self) -> usize {
            1
        }

        fn overflow(&self) -> OverflowPolicy {
            OverflowPolicy::Block
        }
    }

    #[tokio::test]
    async fn stop_flushes_published_events_to_subscribers() {
        let slow = Arc::new(SlowBlocking(Mutex::new(Vec::new())));
        let mut rt = run_with(Config::default(), vec![slow.clone() as Arc<dyn Subscribe>]).await;
        let p = rt.producer("temp-1");
        p.advertise().await.unwrap();
        for i in 0..50 {
            p.send(&Readout::now("temp-1", f64::from(i))).await.unwrap();
        }
        for _ in 0..51 {
            rt.next().await;
        }

        rt.finish().await.unwrap();

        let seen = slow.0.lock().await;
        assert_eq!(seen.len(), 51);
        assert_eq!(seen[0], "SensorDiscovered_temp-1");
        assert!(seen[1..].iter().all(|k| k == "MessageReceived_temp-1"));
    }

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, ev: &Event) {
            self.0.lock().await.push(ev.key().to_string());
        }
    }

    #[tokio::test]
    async fn subscribers_receive_the_stream() {
        let collect = Arc::new(Collect::default());
        let mut rt = run_with(Config::default(), vec![collect.clone() as Arc<dyn Subscribe>]).await;
        let p = rt.producer("temp-1");
        p.advertise().await.unwrap();
        p.send(&Readout::now("temp-1", 3.0)).await.unwrap();
        rt.next().await;
        rt.next().await;

        while collect.0.lock().await.len() < 2 {
            tokio::task::yield_now().await;
        }
        assert_eq!(
            *collect.0.lock().await,
            vec!["SensorDiscovered_temp-1", "MessageReceived_temp-1"]
        );
        rt.finish().await.unwrap();
    }
}
