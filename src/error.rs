//! Error types used by the listener, the broker boundary and the codec.
//!
//! - [`RuntimeError`]: fatal errors of the discovery runtime itself.
//! - [`BrokerError`]: failures reported by a [`Broker`](crate::Broker) implementation.
//! - [`CodecError`]: a payload could not be decoded (or a readout encoded).
//! - [`PublishError`]: an event could not be delivered to the aggregated stream.
//!
//! Every enum provides `as_label` (a short stable snake_case string for logs/metrics).
//! Only [`RuntimeError`] ever leaves the listener; the others are contained in the
//! task that hit them and logged.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the discovery runtime.
///
/// `BrokerSetup` is fatal: the process is expected to exit with the diagnostic.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The broker refused one of the setup steps (advertisement subscription,
    /// discovery exchange declaration or discovery request).
    #[error("broker setup failed during {stage}: {source}")]
    BrokerSetup {
        /// Which setup step failed.
        stage: &'static str,
        /// Underlying broker failure.
        #[source]
        source: BrokerError,
    },

    /// `start()` was called on a listener that is already running (or has run).
    #[error("listener already started")]
    AlreadyStarted,

    /// Consumption tasks did not stop within the grace period after shutdown.
    #[error("shutdown timeout {grace:?} exceeded; stuck producers: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Producers whose consumption task was still running.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use sensorhub::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::BrokerSetup { .. } => "runtime_broker_setup",
            RuntimeError::AlreadyStarted => "runtime_already_started",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    pub(crate) fn setup(stage: &'static str, source: BrokerError) -> Self {
        RuntimeError::BrokerSetup { stage, source }
    }
}

/// # Errors reported by the message broker boundary.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// Publishing to an exchange that was never declared.
    #[error("exchange not found: {name}")]
    ExchangeNotFound {
        /// Exchange name.
        name: String,
    },

    /// The broker connection has been closed.
    #[error("broker connection closed")]
    Closed,

    /// Any other transport failure of a concrete broker implementation.
    #[error("transport failure: {reason}")]
    Transport {
        /// Human-readable description.
        reason: String,
    },
}

impl BrokerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BrokerError::ExchangeNotFound { .. } => "broker_exchange_not_found",
            BrokerError::Closed => "broker_closed",
            BrokerError::Transport { .. } => "broker_transport",
        }
    }
}

/// # Errors produced by a readout codec.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CodecError {
    /// The payload body is not a valid readout.
    #[error("malformed readout: {reason}")]
    Decode {
        /// Decoder message.
        reason: String,
    },

    /// The readout could not be serialized.
    #[error("cannot encode readout: {reason}")]
    Encode {
        /// Encoder message.
        reason: String,
    },
}

impl CodecError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use sensorhub::CodecError;
    ///
    /// let err = CodecError::Decode { reason: "eof".into() };
    /// assert_eq!(err.as_label(), "codec_decode");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CodecError::Decode { .. } => "codec_decode",
            CodecError::Encode { .. } => "codec_encode",
        }
    }
}

/// # Errors produced when publishing onto the aggregated stream.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Nobody is listening on the aggregated stream; the event was dropped.
    #[error("no receivers on aggregated stream; dropped {key}")]
    NoReceivers {
        /// Composite key of the dropped event.
        key: String,
    },
}

impl PublishError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PublishError::NoReceivers { .. } => "publish_no_receivers",
        }
    }
}
