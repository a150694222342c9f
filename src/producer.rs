//! # Producer side of the discovery protocol.
//!
//! A [`Producer`] is what a sensor process runs:
//! - [`advertise`](Producer::advertise) publishes its name on the fanout exchange;
//! - [`send`](Producer::send) encodes a readout and publishes it on the queue
//!   named after the producer;
//! - [`serve_discovery`](Producer::serve_discovery) answers every discovery request
//!   with a fresh advertisement, so a coordinator that starts late still finds
//!   producers that were already up.
//!
//! ```text
//! Producer                      Broker                          Listener
//!    │ advertise("temp-1") ──► amq.fanout ───────────────────────► registers temp-1
//!    │ send(readout) ────────► queue "temp-1" ───────────────────► consumer task
//!    │ ◄── sensor.discovery ◄─ discovery_request() ◄───────────── start()
//! ```

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::broker::{BrokerRef, DISCOVERY_EXCHANGE, FANOUT_EXCHANGE};
use crate::codec::{CodecRef, Readout};
use crate::error::{BrokerError, CodecError};
use crate::events::EventKind;

/// Errors raised while sending a readout.
#[derive(thiserror::Error, Debug)]
pub enum SendError {
    /// The readout could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The broker rejected the publish.
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// Sensor-side handle bound to one producer identity.
#[derive(Clone)]
pub struct Producer {
    name: Arc<str>,
    broker: BrokerRef,
    codec: CodecRef,
    advertise_exchange: Arc<str>,
    discovery_exchange: Arc<str>,
}

impl Producer {
    /// Creates a producer using the default exchange names.
    pub fn new(name: impl Into<Arc<str>>, broker: BrokerRef, codec: CodecRef) -> Self {
        Self {
            name: name.into(),
            broker,
            codec,
            advertise_exchange: FANOUT_EXCHANGE.into(),
            discovery_exchange: DISCOVERY_EXCHANGE.into(),
        }
    }

    /// Overrides the exchanges used for advertisements and discovery requests.
    pub fn with_exchanges(
        mut self,
        advertise: impl Into<Arc<str>>,
        discovery: impl Into<Arc<str>>,
    ) -> Self {
        self.advertise_exchange = advertise.into();
        self.discovery_exchange = discovery.into();
        self
    }

    /// Producer identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Composite key the coordinator will use for this producer's readouts.
    pub fn readout_key(&self) -> String {
        EventKind::MessageReceived.qualify(&self.name)
    }

    /// Publishes this producer's name on the advertisement exchange.
    pub async fn advertise(&self) -> Result<(), BrokerError> {
        debug!(producer = %self.name, "advertising");
        self.broker
            .publish_exchange(&self.advertise_exchange, "", self.name.as_bytes().to_vec())
            .await
    }

    /// Encodes `readout` and publishes it on this producer's queue.
    pub async fn send(&self, readout: &Readout) -> Result<(), SendError> {
        let body = self.codec.encode(readout)?;
        self.broker.publish_queue(&self.name, body).await?;
        Ok(())
    }

    /// Answers discovery requests with advertisements until cancelled or the
    /// broker closes the subscription.
    ///
    /// The discovery exchange is declared first, so this can run before any
    /// coordinator exists.
    pub async fn serve_discovery(&self, token: CancellationToken) -> Result<(), BrokerError> {
        self.broker.declare_exchange(&self.discovery_exchange).await?;
        let mut requests = self
            .broker
            .subscribe_exchange(&self.discovery_exchange)
            .await?;

        loop {
            let request = tokio::select! {
                _ = token.cancelled() => return Ok(()),
                r = requests.next() => r,
            };
            match request {
                Some(_) => {
                    info!(producer = %self.name, "discovery request received");
                    self.advertise().await?;
                }
                None => return Ok(()),
            }
        }
    }
}
