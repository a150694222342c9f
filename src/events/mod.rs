//! Aggregated events: data model and fan-in stream.
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`Payload`], [`EventData`] qualified event model
//! - [`Aggregator`] thin wrapper over `tokio::sync::broadcast` that all tasks publish into
//! - [`EventStream`] receiving half handed to downstream consumers
//!
//! ## Quick reference
//! - **Publishers**: `Listener` (discovery events), per-producer consumers (message events).
//! - **Consumers**: any number of `EventStream`s plus the listener's forwarder into
//!   `SubscriberSet`.

mod aggregator;
mod event;

pub use aggregator::{Aggregator, EventStream};
pub use event::{Event, EventData, EventKind, KEY_SEPARATOR, Payload, split_key};
