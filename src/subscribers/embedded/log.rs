//! # LogWriter: aggregated stream printer
//!
//! A minimal subscriber that logs incoming [`Event`]s at `info` level.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! INFO sensorhub: discovered seq=0 key=SensorDiscovered_temp-1
//! INFO sensorhub: readout seq=3 key=MessageReceived_temp-1 name=temp-1 value=21.5 taken_at=2026-10-19T09:12:44Z
//! ```

use async_trait::async_trait;
use tracing::info;

use crate::events::{Event, Payload};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match &e.payload {
            Payload::Producer(_) => {
                info!(target: "sensorhub", seq = e.seq, key = e.key(), "discovered");
            }
            Payload::Data(d) => {
                info!(
                    target: "sensorhub",
                    seq = e.seq,
                    key = e.key(),
                    name = %d.name,
                    value = d.value,
                    taken_at = %d.timestamp.to_rfc3339(),
                    "readout"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
