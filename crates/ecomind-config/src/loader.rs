//! Configuration loader with layered sources.

use crate::{AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use ecomind_core::EcoMindError;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default environment-variable prefix, e.g. `ECOMIND__CACHE__TTL_SECS`.
pub const ENV_PREFIX: &str = "ECOMIND";

/// Layered configuration loader.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    /// Creates a loader reading TOML files from `config_dir`.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Loader for the default location (`./config`).
    #[must_use]
    pub fn from_default_location() -> Self {
        Self::new("./config")
    }

    /// Overrides the environment-variable prefix.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Loads and validates the configuration.
    ///
    /// Sources, later ones winning:
    /// 1. `default.toml`
    /// 2. `{environment}.toml`, where environment comes from `ECOMIND_ENVIRONMENT`
    /// 3. `local.toml` (not committed to version control)
    /// 4. Environment variables `{prefix}__SECTION__KEY`
    pub fn load(&self) -> Result<AppConfig, EcoMindError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment_override = std::env::var(format!("{}_ENVIRONMENT", self.env_prefix)).ok();
        let environment = environment_override
            .clone()
            .unwrap_or_else(|| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();
        for name in ["default", environment.as_str(), "local"] {
            let path = self.config_dir.join(format!("{name}.toml"));
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.cors_origins"),
        );

        let mut app_config: AppConfig = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error_to_ecomind_error)?;

        if let Some(environment) = environment_override {
            app_config.app.environment = environment;
        }

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    /// Validates the configuration, failing fast with every violation listed.
    pub fn validate_config(config: &AppConfig) -> Result<(), EcoMindError> {
        if config.app.is_production() && config.security.jwt_secret == "change-me-in-production" {
            warn!("Using default JWT secret in production! This is a security risk.");
        }

        ConfigValidator::validate(config).map_err(|errors| {
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            EcoMindError::Configuration(message)
        })
    }
}

fn config_error_to_ecomind_error(err: ConfigError) -> EcoMindError {
    EcoMindError::Configuration(err.to_string())
}
