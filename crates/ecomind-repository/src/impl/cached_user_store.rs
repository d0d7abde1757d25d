//! `CachedUserStore`: cache-aside reads and invalidating writes over a
//! [`UserDao`].
//!
//! Reads probe the cache under a field-namespaced key, fall back to the DAO
//! on a miss and repopulate the same key. Writes go to the DAO first and
//! then delete every key that could now be stale. Cache writes and deletes
//! never decide the outcome of a store write.
//!
//! [`UserDao`]: crate::dao::UserDao

use super::ensure_immutable_fields;
use crate::cache::{cache_keys, CacheExt, CacheInterface, DEFAULT_TTL};
use crate::{dao::UserDao, traits::UserStore};
use async_trait::async_trait;
use ecomind_config::CacheFailurePolicy;
use ecomind_core::{EcoMindError, EcoMindResult, User, UserId};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, debug_span, error, warn, Instrument, Span};

/// Relational store with a cache in front.
pub struct CachedUserStore {
    dao: Arc<dyn UserDao>,
    cache: Arc<dyn CacheInterface>,
    ttl: Duration,
    failure_policy: CacheFailurePolicy,
    /// Parent of every span this store emits.
    span: Span,
}

impl CachedUserStore {
    /// Creates a store with the default TTL and `FailClosed` cache policy.
    ///
    /// `span` is the logging context for all events the store emits.
    #[must_use]
    pub fn new(dao: Arc<dyn UserDao>, cache: Arc<dyn CacheInterface>, span: Span) -> Self {
        Self {
            dao,
            cache,
            ttl: DEFAULT_TTL,
            failure_policy: CacheFailurePolicy::default(),
            span,
        }
    }

    /// Sets the TTL of populated entries.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets what reads do when the cache backend fails.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: CacheFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    fn op_span(&self, operation: &'static str) -> Span {
        debug_span!(parent: &self.span, "user_store", op = operation)
    }

    /// Cache-aside read of one key.
    ///
    /// An entry that fails to decode counts as a miss. `NotFound` is never
    /// cached. A record is only cached under `key` when `key` is one of the
    /// record's own keys: the database collation can match a lookup that
    /// differs from the stored value (case, accents, trailing spaces), and
    /// such alias keys would never be invalidated by a write.
    async fn read_through<F>(&self, key: String, lookup: String, fetch: F) -> EcoMindResult<User>
    where
        F: Future<Output = EcoMindResult<Option<User>>> + Send,
    {
        match self.cache.get_raw(&key).await {
            Ok(Some(json)) => match serde_json::from_str::<User>(&json) {
                Ok(user) => {
                    debug!(%key, "cache hit");
                    return Ok(user);
                }
                Err(e) => warn!(%key, error = %e, "discarding undecodable cache entry"),
            },
            Ok(None) => debug!(%key, "cache miss"),
            Err(e) => match self.failure_policy {
                CacheFailurePolicy::FailClosed => {
                    error!(%key, error = %e, "cache read failed");
                    return Err(as_cache_error(e));
                }
                CacheFailurePolicy::FailOpen => {
                    warn!(%key, error = %e, "cache read failed, reading store");
                }
            },
        }

        let user = fetch
            .await
            .inspect_err(|e| log_store_error("read", &lookup, e))?
            .ok_or_else(|| EcoMindError::not_found("User", &lookup))?;

        if !cache_keys::keys_for(&user).contains(&key) {
            debug!(%key, id = %user.id, "lookup matched a differently spelled value, not caching");
        } else if let Err(e) = self.cache.set(&key, &user, self.ttl).await {
            warn!(%key, error = %e, "failed to populate cache");
        }

        Ok(user)
    }

    /// Deletes `keys`; failures are logged, the stale window is bounded by TTL.
    async fn invalidate(&self, mut keys: Vec<String>) {
        keys.sort();
        keys.dedup();
        match self.cache.delete_many(&keys).await {
            Ok(deleted) => debug!(keys = keys.len(), deleted, "invalidated cache keys"),
            Err(e) => warn!(?keys, error = %e, "cache invalidation failed"),
        }
    }
}

fn as_cache_error(err: EcoMindError) -> EcoMindError {
    match err {
        EcoMindError::Cache(_) => err,
        other => EcoMindError::cache(other.to_string()),
    }
}

fn log_store_error(operation: &str, target: &str, err: &EcoMindError) {
    if err.is_infrastructure() {
        error!(operation, target, error = %err, "store operation failed");
    }
}

#[async_trait]
impl UserStore for CachedUserStore {
    async fn get_by_login(&self, login: &str) -> EcoMindResult<User> {
        self.read_through(
            cache_keys::user_by_login(login),
            format!("login {login}"),
            self.dao.find_by_login(login),
        )
        .instrument(self.op_span("get_by_login"))
        .await
    }

    async fn get_by_email(&self, email: &str) -> EcoMindResult<User> {
        self.read_through(
            cache_keys::user_by_email(email),
            format!("email {email}"),
            self.dao.find_by_email(email),
        )
        .instrument(self.op_span("get_by_email"))
        .await
    }

    async fn get_by_phone_number(&self, phone_number: &str) -> EcoMindResult<User> {
        self.read_through(
            cache_keys::user_by_phone_number(phone_number),
            format!("phone number {phone_number}"),
            self.dao.find_by_phone_number(phone_number),
        )
        .instrument(self.op_span("get_by_phone_number"))
        .await
    }

    async fn get_by_id(&self, id: UserId) -> EcoMindResult<User> {
        self.read_through(
            cache_keys::user_by_id(id),
            format!("id {id}"),
            self.dao.find_by_id(id),
        )
        .instrument(self.op_span("get_by_id"))
        .await
    }

    async fn get_by_provider(&self, provider: &str, provider_user_id: &str) -> EcoMindResult<User> {
        self.read_through(
            cache_keys::user_by_provider(provider, provider_user_id),
            format!("provider {provider}:{provider_user_id}"),
            self.dao.find_by_provider(provider, provider_user_id),
        )
        .instrument(self.op_span("get_by_provider"))
        .await
    }

    async fn create(&self, user: &User) -> EcoMindResult<User> {
        async {
            let taken = self
                .dao
                .exists_any(&user.login, &user.email, &user.phone_number)
                .await
                .inspect_err(|e| log_store_error("exists_any", &user.login, e))?;
            if taken {
                debug!(login = %user.login, "create rejected by existence check");
                return Err(EcoMindError::already_exists(
                    "a user with this login, email or phone number already exists",
                ));
            }

            self.dao
                .insert(user)
                .await
                .inspect_err(|e| log_store_error("insert", &user.login, e))?;

            self.invalidate(cache_keys::keys_for(user)).await;
            debug!(id = %user.id, login = %user.login, "user created");
            Ok(user.clone())
        }
        .instrument(self.op_span("create"))
        .await
    }

    async fn update(&self, user: &User) -> EcoMindResult<User> {
        async {
            let target = user.id.to_string();
            let previous = self
                .dao
                .find_by_id(user.id)
                .await
                .inspect_err(|e| log_store_error("find_by_id", &target, e))?
                .ok_or_else(|| EcoMindError::not_found("User", format!("id {}", user.id)))?;
            ensure_immutable_fields(&previous, user)?;

            self.dao
                .update(user)
                .await
                .inspect_err(|e| log_store_error("update", &target, e))?;

            let mut keys = cache_keys::keys_for(&previous);
            keys.extend(cache_keys::keys_for(user));
            self.invalidate(keys).await;
            Ok(user.clone())
        }
        .instrument(self.op_span("update"))
        .await
    }

    async fn update_auth_token(&self, id: UserId, token: &str) -> EcoMindResult<()> {
        async {
            let target = id.to_string();
            self.dao
                .update_auth_token(id, token)
                .await
                .inspect_err(|e| log_store_error("update_auth_token", &target, e))?;

            // The token is part of the cached record, so every key of this
            // user is stale, not only the id key.
            let mut keys = vec![cache_keys::user_by_id(id)];
            match self.dao.find_by_id(id).await {
                Ok(Some(user)) => keys.extend(cache_keys::keys_for(&user)),
                Ok(None) => {
                    self.invalidate(keys).await;
                    return Err(EcoMindError::not_found("User", format!("id {id}")));
                }
                Err(e) => warn!(%id, error = %e, "could not reload user, invalidating id key only"),
            }
            self.invalidate(keys).await;
            Ok(())
        }
        .instrument(self.op_span("update_auth_token"))
        .await
    }

    async fn health_check(&self) -> EcoMindResult<()> {
        self.dao.health_check().await
    }
}
