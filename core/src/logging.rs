//! Standardized `tracing` initialisation for the engine binary.
//!
//! ## Usage
//! ```rust,ignore
//! use algotrade_core::logging::init_logging;
//!
//! fn main() {
//!     init_logging();
//!     tracing::info!("trading system started");
//! }
//! ```
//!
//! `RUST_LOG` selects the filter the way it does for any `tracing-subscriber` application, e.g.
//! `RUST_LOG=algotrade_core=debug,algotrade_broker=warn`. `LOG_LEVEL`/`LOG_QUERY` (§6) pick the
//! default directive and human-vs-JSON format when the binary wires up [`crate::config`].

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Human-readable logging, for local/interactive runs.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .init()
}

/// JSON logging, for shipping to an aggregator (Fluentd per §6's `FLUENTD_*` variables).
pub fn init_json_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
        .init()
}
