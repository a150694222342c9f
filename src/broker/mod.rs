//! # Message broker boundary.
//!
//! The coordinator does not implement a broker; it talks to one through the
//! [`Broker`] trait, which captures the two primitives the discovery protocol needs:
//!
//! - **broadcast exchanges**: publish-to-all-current-subscribers, no addressing
//!   (producer advertisements, discovery requests);
//! - **named queues**: point-to-point delivery keyed by name (one queue per producer).
//!
//! Subscribing yields a [`DeliveryStream`]: an unbounded, order-preserving sequence
//! of [`Delivery`] values that ends when the broker closes the subscription.
//! Publishing is fire-and-forget.
//!
//! [`MemoryBroker`] is an in-process implementation used by the demo binary and tests.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::BrokerError;

pub use memory::MemoryBroker;

/// Exchange every producer advertises itself on.
pub const FANOUT_EXCHANGE: &str = "amq.fanout";
/// Exchange the coordinator sends discovery requests on.
pub const DISCOVERY_EXCHANGE: &str = "sensor.discovery";
/// Routing key used for discovery requests.
pub const DISCOVERY_QUEUE: &str = "discovery.queue";
/// Queue conventionally consumed by the persistence writer.
pub const PERSISTENCE_QUEUE: &str = "persistence.queue";

/// One message handed out by a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Routing key the message was published with (the queue name for queue deliveries).
    pub routing_key: Arc<str>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl Delivery {
    /// Creates a delivery.
    pub fn new(routing_key: impl Into<Arc<str>>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            routing_key: routing_key.into(),
            body: body.into(),
        }
    }
}

/// Ordered sequence of deliveries of one subscription.
pub type DeliveryStream = BoxStream<'static, Delivery>;

/// Shared reference to a broker.
pub type BrokerRef = Arc<dyn Broker>;

/// # Pub/sub substrate used by the listener and by producers.
///
/// Implementations must be cheap to share (`Arc<dyn Broker>`) and safe to call
/// from many tasks at once.
#[async_trait]
pub trait Broker: Send + Sync + 'static {
    /// Declares a broadcast exchange. Idempotent.
    async fn declare_exchange(&self, exchange: &str) -> Result<(), BrokerError>;

    /// Subscribes a fresh private queue to a broadcast exchange.
    ///
    /// Only messages published after this call are delivered.
    async fn subscribe_exchange(&self, exchange: &str) -> Result<DeliveryStream, BrokerError>;

    /// Publishes to every current subscriber of `exchange`.
    async fn publish_exchange(
        &self,
        exchange: &str,
        routing_key: &str,
        body: Vec<u8>,
    ) -> Result<(), BrokerError>;

    /// Starts consuming the named queue (declared on first use).
    async fn subscribe_queue(&self, queue: &str) -> Result<DeliveryStream, BrokerError>;

    /// Publishes to the named queue (declared on first use).
    async fn publish_queue(&self, queue: &str, body: Vec<u8>) -> Result<(), BrokerError>;

    /// Closes the connection; every open subscription stream ends.
    async fn close(&self) -> Result<(), BrokerError>;
}
