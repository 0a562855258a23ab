//! Tracing subscriber installation.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Filter used when the configured directive does not parse.
pub const FALLBACK_FILTER: &str = "info";

/// Installs the global `tracing` subscriber.
///
/// `filter` takes `EnvFilter` directives such as `taskdesk=debug,info`.
/// An unparseable directive falls back to [`FALLBACK_FILTER`].
///
/// # Errors
///
/// Returns [`TryInitError`] when a global subscriber is already installed.
pub fn init_tracing(filter: &str) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
}
