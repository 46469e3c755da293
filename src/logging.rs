//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::RoadwatchError;
use crate::config::LoggingConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init(config: &LoggingConfig) -> crate::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(&config.level)))
        .map_err(|e| RoadwatchError::config(format!("Invalid log filter: {e}")))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };

    result.map_err(|e| RoadwatchError::config(format!("Failed to install logger: {e}")))
}

/// Our own crate logs at the configured level, dependencies stay at warn
fn filter_directive(level: &str) -> String {
    format!("warn,roadwatch={level}")
}
