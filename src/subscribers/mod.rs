//! # Downstream subscribers of the aggregated stream.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] fan-out
//! the listener feeds from the [`Aggregator`](crate::Aggregator).
//!
//! ## Architecture
//! ```text
//! Consumers ── publish(Event) ──► Aggregator ──► forwarder ──► SubscriberSet
//!                                                                   │
//!                                                   ┌───────────────┼───────────────┐
//!                                                   ▼               ▼               ▼
//!                                            QueueForwarder      dashboard       LogWriter
//! ```
//!
//! Code that prefers pulling over callbacks can use
//! [`Aggregator::subscribe`](crate::Aggregator::subscribe) directly.

mod forward;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod embedded;

pub use forward::QueueForwarder;
pub use set::SubscriberSet;
pub use subscriber::{OverflowPolicy, Subscribe};

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
