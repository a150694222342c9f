//! # QueueForwarder: hand readouts to a downstream queue.
//!
//! Re-encodes every `MessageReceived` event with the shared codec and publishes it
//! on a named broker queue ([`PERSISTENCE_QUEUE`] by default), where a persistence
//! writer consumes it. Discovery events are filtered out through
//! [`Subscribe::accepts`].
//!
//! Failures are logged and the event is skipped; the forwarder never stops the fan-out.

use async_trait::async_trait;
use tracing::warn;

use super::Subscribe;
use crate::broker::{BrokerRef, PERSISTENCE_QUEUE};
use crate::codec::{CodecRef, Readout};
use crate::events::{Event, EventKind};

/// Subscriber publishing decoded readouts onto a broker queue.
pub struct QueueForwarder {
    broker: BrokerRef,
    codec: CodecRef,
    queue: String,
}

impl QueueForwarder {
    /// Forwards to [`PERSISTENCE_QUEUE`].
    pub fn new(broker: BrokerRef, codec: CodecRef) -> Self {
        Self::to_queue(broker, codec, PERSISTENCE_QUEUE)
    }

    /// Forwards to `queue`.
    pub fn to_queue(broker: BrokerRef, codec: CodecRef, queue: impl Into<String>) -> Self {
        Self {
            broker,
            codec,
            queue: queue.into(),
        }
    }
}

#[async_trait]
impl Subscribe for QueueForwarder {
    async fn on_event(&self, event: &Event) {
        let Some(d) = event.data() else {
            return;
        };
        let readout = Readout {
            name: d.name.clone(),
            value: d.value,
            timestamp: d.timestamp,
        };
        let body = match self.codec.encode(&readout) {
            Ok(b) => b,
            Err(e) => {
                warn!(key = event.key(), error = %e, "cannot encode readout for forwarding");
                return;
            }
        };
        if let Err(e) = self.broker.publish_queue(&self.queue, body).await {
            warn!(key = event.key(), queue = %self.queue, error = %e, "forwarding failed");
        }
    }

    fn name(&self) -> &'static str {
        "queue-forwarder"
    }

    fn accepts(&self, event: &Event) -> bool {
        event.kind == EventKind::MessageReceived
    }
}
