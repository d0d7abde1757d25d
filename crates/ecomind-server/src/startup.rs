//! Server startup utilities.

use ecomind_config::AppConfig;
use tracing::info;

/// Logs where the server listens and what it is backed by.
pub fn print_startup_info(config: &AppConfig, providers: &[&str]) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("REST API:  http://{}/api", config.server.addr());
    info!("Health:    http://{}/health", config.server.addr());
    info!("Storage:   {}", config.storage.backend);
    if config.cache.enabled {
        info!("Cache:     {:?}, ttl {}s, {}", config.cache.backend, config.cache.ttl_secs, config.cache.failure_policy);
    } else {
        info!("Cache:     disabled");
    }
    if providers.is_empty() {
        info!("Sign-in:   password only");
    } else {
        info!("Sign-in:   password, {}", providers.join(", "));
    }
    info!("{}", separator);
}
