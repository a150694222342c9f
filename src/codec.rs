//! # Readout codec.
//!
//! Producers publish raw byte payloads on their own queue. A [`Codec`] turns
//! each body into a [`Readout`]; the listener shares one codec across every
//! consumption task, so implementations must be `Send + Sync` and stateless
//! per call.
//!
//! [`JsonCodec`] is the default wire format:
//! ```text
//! {"name":"temp-1","value":21.5,"timestamp":"2024-05-01T12:00:00Z"}
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// One decoded sensor measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readout {
    /// Producer name.
    pub name: String,
    /// Measured value.
    pub value: f64,
    /// Measurement time.
    pub timestamp: DateTime<Utc>,
}

impl Readout {
    /// Creates a readout stamped with the current time.
    pub fn now(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            timestamp: Utc::now(),
        }
    }
}

/// Shared reference to a codec.
pub type CodecRef = Arc<dyn Codec>;

/// Binary codec for readout payloads.
pub trait Codec: Send + Sync + 'static {
    /// Decodes one payload body.
    fn decode(&self, body: &[u8]) -> Result<Readout, CodecError>;

    /// Encodes a readout into a payload body.
    fn encode(&self, readout: &Readout) -> Result<Vec<u8>, CodecError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// JSON readout codec (serde_json).
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn decode(&self, body: &[u8]) -> Result<Readout, CodecError> {
        serde_json::from_slice(body).map_err(|e| CodecError::Decode {
            reason: e.to_string(),
        })
    }

    fn encode(&self, readout: &Readout) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(readout).map_err(|e| CodecError::Encode {
            reason: e.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn decodes_wire_format() {
        let body = br#"{"name":"temp-1","value":21.5,"timestamp":"2024-05-01T12:00:00Z"}"#;
        let r = JsonCodec.decode(body).unwrap();
        assert_eq!(r.name, "temp-1");
        assert_eq!(r.value, 21.5);
        assert_eq!(r.timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn rejects_malformed_bodies() {
        for body in [
            &b""[..],
            b"not json",
            br#"{"name":"x"}"#,
            br#"{"name":"x","value":"hot","timestamp":"2024-05-01T12:00:00Z"}"#,
        ] {
            let err = JsonCodec.decode(body).unwrap_err();
            assert_eq!(err.as_label(), "codec_decode");
        }
    }

    #[test]
    fn encoded_readout_decodes_back() {
        let r = Readout::now("hum-2", 40.25);
        let body = JsonCodec.encode(&r).unwrap();
        assert_eq!(JsonCodec.decode(&body).unwrap(), r);
    }
}
