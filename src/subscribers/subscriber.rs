//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for downstream consumers of the
//! aggregated stream (persistence writers, dashboards, alerting).
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Key filter** ([`Subscribe::accepts`]) applied before queueing
//! - **Panic isolation** (panics are caught and logged)
//!
//! ## Architecture
//! ```text
//! SubscriberSet ──► accepts(&Event)? ──► [bounded queue] ──► worker task ──► subscriber.on_event()
//!                                                                       └─► panic caught → error!
//! ```
//!
//! ## Overflow behavior
//! Chosen per subscriber with [`Subscribe::overflow`]:
//! - [`OverflowPolicy::DropNewest`]: the new event is dropped for this subscriber only
//!   and a warning is logged; other subscribers are unaffected.
//! - [`OverflowPolicy::Block`]: the fan-out waits for room. Every subscriber then
//!   sees the delay, and the aggregated stream's ring buffer absorbs it (dropping
//!   the oldest events if it overflows too).
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use sensorhub::{Event, EventKind, Subscribe};
//!
//! struct Persistence;
//!
//! #[async_trait]
//! impl Subscribe for Persistence {
//!     async fn on_event(&self, ev: &Event) {
//!         if let Some(data) = ev.data() {
//!             // write data.name / data.value / data.timestamp
//!             let _ = data;
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "persistence" }
//!
//!     fn accepts(&self, ev: &Event) -> bool {
//!         ev.kind == EventKind::MessageReceived
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// What the fan-out does when a subscriber's queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Drop the incoming event for this subscriber (default).
    #[default]
    DropNewest,
    /// Wait until the subscriber's queue has room.
    Block,
}

/// Consumer of aggregated events.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Slow processing affects only this subscriber's queue (with `DropNewest`).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated worker task. Events arrive in aggregated-stream order.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity (clamped to at least 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }

    /// Queue overflow behavior. Default: [`OverflowPolicy::DropNewest`].
    fn overflow(&self) -> OverflowPolicy {
        OverflowPolicy::DropNewest
    }

    /// Whether this subscriber wants the event; typically a check on
    /// [`Event::key`] or [`Event::kind`]. Default: everything.
    fn accepts(&self, _event: &Event) -> bool {
        true
    }
}
