//! Application builder.
//!
//! Picks the user store variant from configuration and assembles the
//! services and router on top of it.

use ecomind_config::{AppConfig, CacheBackend, StorageBackend};
use ecomind_core::{EcoMindError, EcoMindResult};
use ecomind_repository::{
    cache::create_redis_pool, create_pool, CacheInterface, CachedUserStore, DatabasePool,
    InMemoryUserStore, MemoryCacheService, MySqlUserDaoImpl, RedisCacheService, UserStore,
};
use ecomind_rest::{create_router, AppState};
use ecomind_security::{IdentityProviders, PasswordHasher, TokenProvider};
use ecomind_service::{AuthServiceImpl, UserServiceImpl};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, info_span};

/// A fully wired application, ready to serve.
pub struct Application {
    config: AppConfig,
    router: Router,
    pool: Option<Arc<DatabasePool>>,
    providers: Vec<&'static str>,
}

impl Application {
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn providers(&self) -> &[&'static str] {
        &self.providers
    }

    /// Serves until `shutdown` resolves, then closes the database pool.
    pub async fn serve(self, shutdown: impl Future<Output = ()> + Send + 'static) -> EcoMindResult<()> {
        let addr = self.config.server.addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| EcoMindError::Internal(format!("Failed to bind {}: {}", addr, e)))?;
        info!("Listening on http://{}", addr);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| EcoMindError::Internal(format!("REST server error: {}", e)))?;

        if let Some(pool) = self.pool {
            pool.close().await;
        }
        info!("Server shutdown complete");
        Ok(())
    }
}

/// Application builder for constructing the server.
pub struct AppBuilder {
    config: Option<AppConfig>,
}

impl AppBuilder {
    /// Creates a new application builder.
    pub fn new() -> Self {
        Self { config: None }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Connects storage and wires every component.
    pub async fn build(self) -> EcoMindResult<Application> {
        let config = self.config.unwrap_or_default();

        let (store, pool) = build_store(&config).await?;

        let security = Arc::new(config.security.clone());
        let hasher = Arc::new(PasswordHasher::from_config(&security));
        let tokens = Arc::new(TokenProvider::new(security));

        let user_service = Arc::new(UserServiceImpl::new(store.clone(), hasher));
        let auth_service = Arc::new(AuthServiceImpl::new(user_service.clone(), tokens));

        let identity_providers = IdentityProviders::from_config(&config.oauth)?;
        let providers = identity_providers.names();

        let state = AppState::new(user_service, auth_service, identity_providers, store)
            .with_secure_cookies(config.app.is_production());
        let router = create_router(state, &config.server);

        Ok(Application {
            config,
            router,
            pool,
            providers,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the configured user store variant.
pub async fn build_store(
    config: &AppConfig,
) -> EcoMindResult<(Arc<dyn UserStore>, Option<Arc<DatabasePool>>)> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory user store");
            let store: Arc<dyn UserStore> =
                Arc::new(InMemoryUserStore::new(info_span!("user_store", backend = "memory")));
            Ok((store, None))
        }
        StorageBackend::Mysql => {
            let pool = create_pool(&config.database).await?;
            if config.database.run_migrations {
                pool.run_migrations().await?;
            }

            let cache = build_cache(config).await?;
            let dao = Arc::new(MySqlUserDaoImpl::new(pool.clone()));
            let store: Arc<dyn UserStore> = Arc::new(
                CachedUserStore::new(dao, cache, info_span!("user_store", backend = "mysql"))
                    .with_ttl(config.cache.ttl())
                    .with_failure_policy(config.cache.failure_policy),
            );

            info!(
                "Using MySQL user store (cache {}, policy {})",
                if config.cache.enabled { "on" } else { "off" },
                config.cache.failure_policy
            );
            Ok((store, Some(pool)))
        }
    }
}

async fn build_cache(config: &AppConfig) -> EcoMindResult<Arc<dyn CacheInterface>> {
    if !config.cache.enabled {
        return Ok(Arc::new(RedisCacheService::disabled()));
    }
    match config.cache.backend {
        CacheBackend::Redis => {
            let pool = create_redis_pool(&config.cache).await?;
            Ok(Arc::new(RedisCacheService::new(Arc::new(pool))))
        }
        CacheBackend::Memory => Ok(Arc::new(MemoryCacheService::new())),
    }
}
