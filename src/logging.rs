//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence over the default directive passed in.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for the viewer binary
pub const DEFAULT_FILTER: &str = "warn,gridsync=info";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
    /// Include file/line in each event
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: DEFAULT_FILTER.to_string(),
            include_location: cfg!(debug_assertions),
        }
    }
}

/// Install a console subscriber.
///
/// Returns `false` when a global subscriber was already installed (tests call
/// this repeatedly).
pub fn init(config: &LoggingConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(filter = %config.default_filter, "Logging initialized");
    }
    installed
}
