//! Tracing subscriber setup.

use ecomind_config::{LogFormat, ObservabilityConfig};
use ecomind_core::{EcoMindError, EcoMindResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Builds the filter: `RUST_LOG` when set, otherwise the configured level.
pub fn env_filter(config: &ObservabilityConfig) -> EcoMindResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(format!("{},tower_http=debug", config.log_level))
            .map_err(|e| EcoMindError::Configuration(format!("Invalid log level: {}", e))),
    }
}

/// Installs the global subscriber in the configured format.
pub fn init_logging(config: &ObservabilityConfig) -> EcoMindResult<()> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };

    result.map_err(|e| EcoMindError::Internal(format!("Failed to install logger: {}", e)))
}
