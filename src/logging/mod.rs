//! Tracing subscriber setup for processes embedding the engine.
//!
//! The library itself only emits events:
//! - `info` when a configuration file is loaded
//! - `warn` for every failed evaluation, with `symbol` and error `kind` fields
//! - `error` when a batch task aborts
//! - `debug` per evaluation with the regime, category scores and fired rules
//!
//! Hosts that already own a subscriber can skip this module entirely.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

use crate::config::get_environment;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, for log shippers
    Json,
    /// Colored human-readable lines
    Pretty,
}

impl LogFormat {
    pub fn for_environment(env: &str) -> Self {
        if is_production(env) {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

pub fn is_production(env: &str) -> bool {
    matches!(env, "production" | "prod")
}

/// Install the global subscriber, picking the format from `APP_ENV`.
///
/// Fails if a global subscriber is already set.
pub fn init_logging() -> Result<(), TryInitError> {
    init_logging_with(LogFormat::for_environment(&get_environment()))
}

pub fn init_logging_with(format: LogFormat) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_target(true)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
    }
}
