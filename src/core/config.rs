//! # Listener configuration.
//!
//! Provides [`Config`], the centralized settings for the discovery listener.
//!
//! ## Sentinel values
//! - `idle_timeout = 0s` → producers are never evicted (default)
//! - `grace = 0s` → do not wait for consumption tasks on shutdown

use std::time::Duration;

use crate::broker::{DISCOVERY_EXCHANGE, DISCOVERY_QUEUE, FANOUT_EXCHANGE};

/// Configuration for the discovery listener.
///
/// ## Field semantics
/// - `advertise_exchange`: broadcast exchange producers advertise on
/// - `discovery_exchange`: broadcast exchange discovery requests are sent on
/// - `discovery_routing_key`: routing key of the discovery request
/// - `bus_capacity`: aggregated stream ring buffer size (min 1)
/// - `grace`: how long shutdown waits for consumption tasks to finish
/// - `idle_timeout`: evict a producer after this long without a payload (`0s` = never)
#[derive(Clone, Debug)]
pub struct Config {
    /// Exchange producers advertise themselves on.
    pub advertise_exchange: String,

    /// Exchange discovery requests are broadcast on.
    pub discovery_exchange: String,

    /// Routing key attached to discovery requests.
    pub discovery_routing_key: String,

    /// Capacity of the aggregated stream ring buffer.
    ///
    /// Receivers that lag more than `bus_capacity` events behind lose the oldest ones.
    pub bus_capacity: usize,

    /// Maximum time to wait for consumption tasks after shutdown.
    pub grace: Duration,

    /// Idle time after which a producer is evicted from the registry.
    ///
    /// An evicted producer is registered again on its next advertisement.
    pub idle_timeout: Duration,
}

impl Config {
    /// Returns the idle timeout as an `Option` (`None` = never evict).
    #[inline]
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout == Duration::ZERO {
            None
        } else {
            Some(self.idle_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - exchanges `amq.fanout` / `sensor.discovery`, routing key `discovery.queue`
    /// - `bus_capacity = 1024`
    /// - `grace = 10s`
    /// - `idle_timeout = 0s` (no eviction)
    fn default() -> Self {
        Self {
            advertise_exchange: FANOUT_EXCHANGE.to_string(),
            discovery_exchange: DISCOVERY_EXCHANGE.to_string(),
            discovery_routing_key: DISCOVERY_QUEUE.to_string(),
            bus_capacity: 1024,
            grace: Duration::from_secs(10),
            idle_timeout: Duration::ZERO,
        }
    }
}
