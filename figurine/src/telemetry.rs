//! Tracing initialization.
//!
//! Console logging via tracing-subscriber, filtered by `RUST_LOG` with an
//! `info` default. The service is a single synchronous-per-request process,
//! so there is no distributed-tracing exporter here; request-level spans
//! come from the router's `TraceLayer`.

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global tracing subscriber.
///
/// Safe to call once per process; returns an error if a subscriber is
/// already installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");
    Ok(())
}
