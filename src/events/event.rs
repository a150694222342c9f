//! # Qualified events published onto the aggregated stream.
//!
//! The [`EventKind`] enum is the closed set of things the coordinator reports:
//! - **SensorDiscovered**: a producer advertised itself (re-deliveries included)
//! - **MessageReceived**: a payload from a registered producer was decoded
//!
//! Every [`Event`] is *qualified*: its composite key is `kind + "_" + qualifier`,
//! where the qualifier is the producer identity. Downstream consumers route and
//! filter on this key without looking at the payload.
//!
//! ## Ordering guarantees
//! Each event carries a process-wide sequence number (`seq`). Sequence numbers of
//! events published by one consumption task are increasing; there is no ordering
//! across producers.
//!
//! ## Example
//! ```rust
//! use sensorhub::{Event, EventKind, Payload};
//!
//! let ev = Event::discovered("temp-1");
//!
//! assert_eq!(ev.kind, EventKind::SensorDiscovered);
//! assert_eq!(ev.key(), "SensorDiscovered_temp-1");
//! assert_eq!(ev.qualifier(), "temp-1");
//! assert!(matches!(ev.payload, Payload::Producer(_)));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::codec::Readout;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Separator between kind and qualifier in a composite key.
pub const KEY_SEPARATOR: char = '_';

/// Classification of aggregated events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    /// A producer advertisement was received.
    ///
    /// Sets:
    /// - `qualifier`: advertised producer identity
    /// - `payload`: [`Payload::Producer`]
    SensorDiscovered,

    /// A payload was decoded from a producer's subscription.
    ///
    /// Sets:
    /// - `qualifier`: routing key of the delivery (the producer identity)
    /// - `payload`: [`Payload::Data`]
    MessageReceived,
}

impl EventKind {
    /// Wire name used as the prefix of composite keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SensorDiscovered => "SensorDiscovered",
            EventKind::MessageReceived => "MessageReceived",
        }
    }

    /// Builds the composite key `kind_qualifier`.
    ///
    /// ```
    /// use sensorhub::EventKind;
    /// assert_eq!(EventKind::MessageReceived.qualify("hum-2"), "MessageReceived_hum-2");
    /// ```
    pub fn qualify(&self, qualifier: &str) -> String {
        let name = self.as_str();
        let mut key = String::with_capacity(name.len() + 1 + qualifier.len());
        key.push_str(name);
        key.push(KEY_SEPARATOR);
        key.push_str(qualifier);
        key
    }

    fn from_name(s: &str) -> Option<Self> {
        match s {
            "SensorDiscovered" => Some(EventKind::SensorDiscovered),
            "MessageReceived" => Some(EventKind::MessageReceived),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits a composite key back into kind and qualifier.
///
/// The qualifier may itself contain `_`; only the first separator counts, since
/// kind names never contain one.
///
/// ```
/// use sensorhub::{split_key, EventKind};
///
/// assert_eq!(
///     split_key("MessageReceived_line_3"),
///     Some((EventKind::MessageReceived, "line_3"))
/// );
/// assert_eq!(split_key("Unknown_x"), None);
/// ```
pub fn split_key(key: &str) -> Option<(EventKind, &str)> {
    let (kind, qualifier) = key.split_once(KEY_SEPARATOR)?;
    EventKind::from_name(kind).map(|k| (k, qualifier))
}

/// Readout values carried by a `MessageReceived` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventData {
    /// Producer name as written by the producer into the readout.
    pub name: String,
    /// Measured value.
    pub value: f64,
    /// Time the producer took the measurement.
    pub timestamp: DateTime<Utc>,
}

impl From<Readout> for EventData {
    fn from(r: Readout) -> Self {
        Self {
            name: r.name,
            value: r.value,
            timestamp: r.timestamp,
        }
    }
}

/// Event body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    /// Identity of a discovered producer.
    Producer(Arc<str>),
    /// Decoded readout.
    Data(EventData),
}

/// Aggregated event.
///
/// - `seq`: monotonic global sequence
/// - `at`: wall-clock timestamp of publication
/// - `kind` / `qualifier`: the two halves of the composite key
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Event body.
    pub payload: Payload,

    qualifier: Arc<str>,
    key: Arc<str>,
}

impl Event {
    /// Creates an event of the given kind with the next sequence number.
    pub fn new(kind: EventKind, qualifier: impl Into<Arc<str>>, payload: Payload) -> Self {
        let qualifier: Arc<str> = qualifier.into();
        let key: Arc<str> = kind.qualify(&qualifier).into();
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            payload,
            qualifier,
            key,
        }
    }

    /// `SensorDiscovered_<producer>` carrying the producer identity.
    pub fn discovered(producer: impl Into<Arc<str>>) -> Self {
        let producer: Arc<str> = producer.into();
        Event::new(
            EventKind::SensorDiscovered,
            Arc::clone(&producer),
            Payload::Producer(producer),
        )
    }

    /// `MessageReceived_<routing_key>` carrying the decoded readout.
    pub fn received(routing_key: impl Into<Arc<str>>, data: EventData) -> Self {
        Event::new(EventKind::MessageReceived, routing_key, Payload::Data(data))
    }

    /// Composite routing key (`kind_qualifier`).
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Qualifier (producer identity).
    #[inline]
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// Readout data, if this is a `MessageReceived` event.
    #[inline]
    pub fn data(&self) -> Option<&EventData> {
        match &self.payload {
            Payload::Data(d) => Some(d),
            Payload::Producer(_) => None,
        }
    }
}
