//! Runtime core: discovery, registry and lifecycle.
//!
//! The public API from this module is [`Listener`] (built with [`ListenerBuilder`])
//! and its [`Config`].
//!
//! Internal modules:
//! - [`listener`]: discovery loop, advertisement handling, shutdown;
//! - [`registry`]: one consumption task per producer identity;
//! - [`consumer`]: drains one producer subscription into the aggregated stream;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod config;
mod consumer;
mod listener;
mod registry;
pub mod shutdown;

pub use builder::ListenerBuilder;
pub use config::Config;
pub use consumer::{ConsumerExit, ProducerStats};
pub use listener::Listener;
