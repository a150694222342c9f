use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{config::Config, listener::Listener};
use crate::{
    broker::BrokerRef,
    codec::{CodecRef, JsonCodec},
    events::Aggregator,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Listener`].
pub struct ListenerBuilder {
    cfg: Config,
    broker: BrokerRef,
    codec: CodecRef,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ListenerBuilder {
    /// Creates a new builder with the given configuration and broker connection.
    ///
    /// Payloads are decoded with [`JsonCodec`] unless [`with_codec`](Self::with_codec) is used.
    pub fn new(cfg: Config, broker: BrokerRef) -> Self {
        Self {
            cfg,
            broker,
            codec: Arc::new(JsonCodec),
            subscribers: Vec::new(),
        }
    }

    /// Sets the codec shared by every consumption task.
    pub fn with_codec(mut self, codec: CodecRef) -> Self {
        self.codec = codec;
        self
    }

    /// Sets downstream subscribers of the aggregated stream.
    ///
    /// Subscribers receive every event they accept through dedicated workers
    /// with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the listener.
    ///
    /// Initializes the aggregated stream, the subscriber workers and the registry.
    /// Must be called inside a tokio runtime (subscriber workers are spawned here).
    pub fn build(self) -> Arc<Listener> {
        let aggregator = Aggregator::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers);

        Arc::new(Listener::new_internal(
            self.cfg,
            self.broker,
            self.codec,
            aggregator,
            subs,
            CancellationToken::new(),
        ))
    }
}
