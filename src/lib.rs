//! # sensorhub
//!
//! **sensorhub** is a sensor-network coordinator: it discovers data producers at
//! runtime through a message broker and fans everything they send into one
//! ordered-per-producer stream of qualified events.
//!
//! Producers are not configured up front. Each producer advertises its identity on
//! a broadcast exchange; the coordinator registers it, subscribes to the queue named
//! after it and decodes every payload into a `MessageReceived` event. Downstream
//! consumers (persistence, dashboards) see a single stream keyed by
//! `kind + "_" + producer`.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Producer   │   │   Producer   │   │   Producer   │
//!     │   "temp-1"   │   │   "hum-2"    │   │    "co2-3"   │
//!     └──┬────────┬──┘   └──┬────────┬──┘   └──┬────────┬──┘
//!  advertise   send     advertise   send    advertise   send
//!        ▼        ▼         ▼        ▼         ▼        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Broker: amq.fanout (broadcast)     queues "temp-1" "hum-2" ...   │
//! └──────┬─────────────────────────────────┬──────────────────────────┘
//!        ▼                                 ▼
//! ┌─────────────────────────┐    ┌──────────────────────────────────┐
//! │ Listener (discovery)    │    │ Consumer tasks (one per producer)│
//! │ - SensorDiscovered      │──► │ - decode with Codec              │
//! │ - Registry (idempotent) │    │ - MessageReceived                │
//! └────────────┬────────────┘    └───────────────┬──────────────────┘
//!              ▼                                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                Aggregator (broadcast ring buffer)                 │
//! │                   (capacity: Config::bus_capacity)                │
//! └──────────────┬───────────────────────────────────┬────────────────┘
//!                ▼                                   ▼
//!        EventStream (pull)                 SubscriberSet (per-sub queues)
//!                                          ┌─────────┼─────────┐
//!                                          ▼         ▼         ▼
//!                                     forwarder  dashboard  LogWriter
//! ```
//!
//! ### Discovery handshake
//! ```text
//! Listener::start()
//!   ├─► subscribe amq.fanout
//!   ├─► publish "" on sensor.discovery (routing key discovery.queue)
//!   │        └─► running producers answer with advertise()
//!   └─► loop over advertisements:
//!          ├─ publish SensorDiscovered_<name>   (every time)
//!          └─ first time: subscribe queue <name>, spawn consumer
//! ```
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                       |
//! |-------------------|-------------------------------------------------------------------|------------------------------------------|
//! | **Discovery**     | Runtime producer registration, one consumer per identity.         | [`Listener`], [`ListenerBuilder`]        |
//! | **Aggregation**   | Fan-in of all producers into qualified events.                    | [`Aggregator`], [`Event`], [`EventKind`] |
//! | **Subscribers**   | Downstream consumers with key filters and overflow policies.      | [`Subscribe`], [`OverflowPolicy`]        |
//! | **Broker**        | Transport boundary plus an in-process implementation.             | [`Broker`], [`MemoryBroker`]             |
//! | **Codec**         | Payload wire format.                                              | [`Codec`], [`JsonCodec`], [`Readout`]    |
//! | **Errors**        | Typed errors with stable labels.                                  | [`RuntimeError`], [`BrokerError`]        |
//! | **Configuration** | Centralized runtime settings.                                     | [`Config`]                               |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] subscriber _(demo/reference only)_.
//! - `cli`: builds the `sensorhub` demo binary.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use sensorhub::{Config, JsonCodec, Listener, MemoryBroker, Producer, Readout};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let broker = Arc::new(MemoryBroker::new());
//!     let listener = Listener::builder(Config::default(), broker.clone()).build();
//!     let mut events = listener.subscribe();
//!
//!     let running = {
//!         let l = Arc::clone(&listener);
//!         tokio::spawn(async move { l.start().await })
//!     };
//!     while broker.subscriber_count(sensorhub::FANOUT_EXCHANGE) == 0 {
//!         tokio::task::yield_now().await;
//!     }
//!
//!     let temp = Producer::new("temp-1", broker.clone(), Arc::new(JsonCodec));
//!     temp.advertise().await?;
//!     temp.send(&Readout::now("temp-1", 21.5)).await?;
//!
//!     assert_eq!(events.recv().await.unwrap().key(), "SensorDiscovered_temp-1");
//!     assert_eq!(events.recv().await.unwrap().key(), "MessageReceived_temp-1");
//!
//!     listener.stop().await?;
//!     running.await??;
//!     Ok(())
//! }
//! ```
mod broker;
mod codec;
mod core;
mod error;
mod events;
mod producer;
mod subscribers;

// ---- Public re-exports ----

pub use broker::{
    Broker, BrokerRef, DISCOVERY_EXCHANGE, DISCOVERY_QUEUE, Delivery, DeliveryStream,
    FANOUT_EXCHANGE, MemoryBroker, PERSISTENCE_QUEUE,
};
pub use codec::{Codec, CodecRef, JsonCodec, Readout};
pub use crate::core::{Config, ConsumerExit, Listener, ListenerBuilder, ProducerStats, shutdown};
pub use error::{BrokerError, CodecError, PublishError, RuntimeError};
pub use events::{
    Aggregator, Event, EventData, EventKind, EventStream, KEY_SEPARATOR, Payload, split_key,
};
pub use producer::{Producer, SendError};
pub use subscribers::{OverflowPolicy, QueueForwarder, Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
