//! Log setup for the `rocks` binary.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "ROCKS_LOG";

/// `ROCKS_LOG` if set, else `RUST_LOG`, else `level`.
pub fn log_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Install the global subscriber, as JSON lines when `json` is set.
///
/// Only the first call in a process takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let registry = tracing_subscriber::registry().with(log_filter(level));
    let layer = fmt::layer().with_target(false);
    let installed = if json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer).try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
