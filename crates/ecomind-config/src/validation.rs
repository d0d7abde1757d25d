//! Configuration validation.
//!
//! Every rule runs and all violations are reported together, so a broken
//! deployment fails once with the full list rather than one fix at a time.

use crate::{AppConfig, OAuthProviderConfig, StorageBackend};
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    /// JWT secret is too short for use outside development.
    JwtSecretTooShort { actual: usize, minimum: usize },
    /// Port 0 cannot be bound.
    InvalidPort { value: u16 },
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Timeout or TTL value must be positive.
    NonPositiveValue { name: String },
    /// Password hash cost is out of range.
    InvalidHashCost { value: u32, minimum: u32, maximum: u32 },
    /// Log level is not recognised.
    InvalidLogLevel { value: String },
    /// A provider has credentials but no callback URL.
    MissingRedirectUrl { provider: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JwtSecretTooShort { actual, minimum } => {
                write!(
                    f,
                    "JWT secret too short: {} characters (minimum {})",
                    actual, minimum
                )
            }
            Self::InvalidPort { value } => {
                write!(f, "Invalid server port: {} (must be 1-65535)", value)
            }
            Self::InvalidPoolSize { min, max } => {
                write!(
                    f,
                    "Invalid pool size: min ({}) cannot be greater than max ({})",
                    min, max
                )
            }
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::NonPositiveValue { name } => {
                write!(f, "'{}' must be positive", name)
            }
            Self::InvalidHashCost {
                value,
                minimum,
                maximum,
            } => {
                write!(
                    f,
                    "Invalid password hash cost: {} (must be between {} and {})",
                    value, minimum, maximum
                )
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{}' (valid: trace, debug, info, warn, error)",
                    value
                )
            }
            Self::MissingRedirectUrl { provider } => {
                write!(f, "OAuth provider '{}' has credentials but no redirect_url", provider)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Minimum JWT secret length outside development.
    const MIN_JWT_SECRET_LENGTH: usize = 32;
    /// Argon2 time cost bounds.
    const MIN_HASH_COST: u32 = 1;
    const MAX_HASH_COST: u32 = 10;
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    /// Validates the entire application configuration.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_security(config, &mut errors);
        Self::validate_server(config, &mut errors);
        if config.storage.backend == StorageBackend::Mysql {
            Self::validate_database(config, &mut errors);
        }
        Self::validate_cache(config, &mut errors);
        Self::validate_oauth("google", &config.oauth.google, &mut errors);
        Self::validate_oauth("tiktok", &config.oauth.tiktok, &mut errors);
        Self::validate_observability(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_security(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let security = &config.security;
        if config.app.environment != "development"
            && security.jwt_secret.len() < Self::MIN_JWT_SECRET_LENGTH
        {
            errors.push(ConfigValidationError::JwtSecretTooShort {
                actual: security.jwt_secret.len(),
                minimum: Self::MIN_JWT_SECRET_LENGTH,
            });
        }

        if security.password_hash_cost < Self::MIN_HASH_COST
            || security.password_hash_cost > Self::MAX_HASH_COST
        {
            errors.push(ConfigValidationError::InvalidHashCost {
                value: security.password_hash_cost,
                minimum: Self::MIN_HASH_COST,
                maximum: Self::MAX_HASH_COST,
            });
        }

        if security.jwt_expiration_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveValue {
                name: "security.jwt_expiration_secs".to_string(),
            });
        }
    }

    fn validate_server(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.server.port == 0 {
            errors.push(ConfigValidationError::InvalidPort { value: 0 });
        }
        if config.server.request_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveValue {
                name: "server.request_timeout_secs".to_string(),
            });
        }
    }

    fn validate_database(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let database = &config.database;
        if database.url.is_empty() {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        } else if !database.url.starts_with("mysql://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL must start with mysql://".to_string(),
            });
        }

        if database.min_connections > database.max_connections {
            errors.push(ConfigValidationError::InvalidPoolSize {
                min: database.min_connections,
                max: database.max_connections,
            });
        }

        if database.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveValue {
                name: "database.connect_timeout_secs".to_string(),
            });
        }
    }

    fn validate_cache(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let cache = &config.cache;
        if !cache.enabled {
            return;
        }

        if cache.ttl_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveValue {
                name: "cache.ttl_secs".to_string(),
            });
        }

        if cache.backend == crate::CacheBackend::Redis
            && !cache.url.starts_with("redis://")
            && !cache.url.starts_with("rediss://")
        {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            });
        }
    }

    fn validate_oauth(
        provider: &str,
        config: &OAuthProviderConfig,
        errors: &mut Vec<ConfigValidationError>,
    ) {
        if !config.is_configured() {
            return;
        }

        if config.redirect_url.is_empty() {
            errors.push(ConfigValidationError::MissingRedirectUrl {
                provider: provider.to_string(),
            });
        }

        let urls = [
            Some(config.redirect_url.as_str()).filter(|u| !u.is_empty()),
            config.auth_url.as_deref(),
            config.token_url.as_deref(),
            config.userinfo_url.as_deref(),
        ];
        for url in urls.into_iter().flatten() {
            if let Err(e) = Url::parse(url) {
                errors.push(ConfigValidationError::InvalidUrl {
                    url_type: format!("oauth.{provider}"),
                    message: format!("{url}: {e}"),
                });
            }
        }
    }

    fn validate_observability(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let level = config.observability.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.observability.log_level.clone(),
            });
        }
    }
}
