//! sensorhub - discovery listener demo
//!
//! Runs the listener against the in-process broker with a handful of simulated
//! producers and logs the aggregated stream until SIGINT/SIGTERM.
//!
//! # Usage
//!
//! ```bash
//! sensorhub
//! sensorhub --producers 5 --interval-ms 250 --log-level debug
//! sensorhub --idle-timeout-secs 10 --forward
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use sensorhub::{
    BrokerRef, CodecRef, Config, FANOUT_EXCHANGE, JsonCodec, Listener, LogWriter, MemoryBroker,
    Producer, QueueForwarder, Readout, Subscribe, shutdown,
};

/// sensorhub - dynamic sensor discovery and fan-in
#[derive(Parser, Debug)]
#[command(name = "sensorhub")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Number of simulated producers
    #[arg(short, long, default_value_t = 3)]
    producers: usize,

    /// Interval between readouts of one producer, in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    interval_ms: u64,

    /// Evict producers silent for this many seconds (0 = never)
    #[arg(long, default_value_t = 0)]
    idle_timeout_secs: u64,

    /// Capacity of the aggregated stream
    #[arg(long, default_value_t = 1024)]
    bus_capacity: usize,

    /// Also forward readouts to the persistence queue
    #[arg(long)]
    forward: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let cfg = Config {
        bus_capacity: cli.bus_capacity,
        idle_timeout: Duration::from_secs(cli.idle_timeout_secs),
        ..Config::default()
    };

    let memory = Arc::new(MemoryBroker::new());
    let broker: BrokerRef = memory.clone();
    let codec: CodecRef = Arc::new(JsonCodec);

    let mut subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    if cli.forward {
        subs.push(Arc::new(QueueForwarder::new(broker.clone(), codec.clone())));
    }

    let listener = Listener::builder(cfg, broker.clone())
        .with_codec(codec.clone())
        .with_subscribers(subs)
        .build();

    let mut running = {
        let l = Arc::clone(&listener);
        tokio::spawn(async move { l.start().await })
    };
    while memory.subscriber_count(FANOUT_EXCHANGE) == 0 && !running.is_finished() {
        tokio::task::yield_now().await;
    }

    let sim_token = CancellationToken::new();
    let sims = spawn_producers(&cli, &broker, &codec, &sim_token);

    let finished = tokio::select! {
        sig = shutdown::wait_for_shutdown_signal() => {
            let sig = sig.context("failed to install signal handlers")?;
            info!(signal = sig, "shutting down");
            None
        }
        res = &mut running => {
            warn!("listener exited on its own");
            Some(res)
        }
    };

    sim_token.cancel();
    for s in sims {
        let _ = s.await;
    }
    if let Err(e) = listener.stop().await {
        warn!(error = %e, "broker close failed");
    }

    let res = match finished {
        Some(res) => res,
        None => running.await,
    };
    match res.context("listener task failed")? {
        Ok(()) => {
            info!("stopped");
            Ok(())
        }
        Err(e) => {
            error!(label = e.as_label(), error = %e, "listener failed");
            Err(e).context("listener failed")
        }
    }
}

/// Starts the simulated producers: each answers discovery requests, advertises
/// itself and sends a readout every `interval_ms`.
fn spawn_producers(
    cli: &Cli,
    broker: &BrokerRef,
    codec: &CodecRef,
    token: &CancellationToken,
) -> Vec<tokio::task::JoinHandle<()>> {
    let interval = Duration::from_millis(cli.interval_ms.max(1));
    (0..cli.producers)
        .map(|i| {
            let producer = Producer::new(format!("sensor-{i}"), broker.clone(), codec.clone());
            let token = token.clone();
            tokio::spawn(async move {
                let serving = {
                    let p = producer.clone();
                    let t = token.clone();
                    tokio::spawn(async move { p.serve_discovery(t).await })
                };
                if let Err(e) = producer.advertise().await {
                    warn!(producer = producer.name(), error = %e, "advertise failed");
                }

                let mut tick = tokio::time::interval(interval);
                let mut value = 20.0 + i as f64;
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = tick.tick() => {}
                    }
                    value += 0.1;
                    if let Err(e) = producer.send(&Readout::now(producer.name(), value)).await {
                        warn!(producer = producer.name(), error = %e, "send failed");
                        break;
                    }
                }
                let _ = serving.await;
            })
        })
        .collect()
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}
