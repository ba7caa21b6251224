//! Tracing subscriber setup for binaries and tests embedding recordflow.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is the embedding application's choice. These helpers install the usual
//! one: `RUST_LOG` wins, otherwise `default_directive` applies.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Installs a global fmt subscriber.
///
/// Returns false if a global subscriber was already installed, in which case
/// nothing changes. Safe to call more than once.
pub fn init_tracing(default_directive: &str) -> bool {
    init_tracing_with(default_directive, LogFormat::Pretty)
}

/// Installs a global fmt subscriber with the given line layout.
pub fn init_tracing_with(default_directive: &str, format: LogFormat) -> bool {
    let registry = tracing_subscriber::registry().with(env_filter(default_directive));
    let installed = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_level(true))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init(),
    };
    installed.is_ok()
}
