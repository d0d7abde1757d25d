//! Process-local `UserStore`.

use super::ensure_immutable_fields;
use crate::traits::UserStore;
use async_trait::async_trait;
use ecomind_core::{EcoMindError, EcoMindResult, User, UserId};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, Span};

#[derive(Default)]
struct Indexes {
    users: HashMap<UserId, User>,
    by_login: HashMap<String, UserId>,
    by_email: HashMap<String, UserId>,
    by_phone: HashMap<String, UserId>,
    by_provider: HashMap<(String, String), UserId>,
}

/// Index keys of one user. Login and email compare case-insensitively,
/// matching the MySQL collation.
struct IndexKeys {
    login: String,
    email: Option<String>,
    phone: Option<String>,
    provider: Option<(String, String)>,
}

impl IndexKeys {
    fn of(user: &User) -> Self {
        Self {
            login: user.login.to_lowercase(),
            email: user.has_email().then(|| user.email.to_lowercase()),
            phone: user.has_phone_number().then(|| user.phone_number.clone()),
            provider: match (&user.provider, &user.provider_user_id) {
                (Some(p), Some(id)) => Some((p.to_lowercase(), id.clone())),
                _ => None,
            },
        }
    }
}

impl Indexes {
    /// Returns true when another user than `owner` holds any of `keys`.
    fn collides(&self, keys: &IndexKeys, owner: UserId) -> bool {
        let taken = |holder: Option<&UserId>| holder.is_some_and(|id| *id != owner);
        taken(self.by_login.get(&keys.login))
            || keys.email.as_ref().is_some_and(|e| taken(self.by_email.get(e)))
            || keys.phone.as_ref().is_some_and(|p| taken(self.by_phone.get(p)))
            || keys.provider.as_ref().is_some_and(|p| taken(self.by_provider.get(p)))
    }

    fn index(&mut self, keys: IndexKeys, id: UserId) {
        self.by_login.insert(keys.login, id);
        if let Some(email) = keys.email {
            self.by_email.insert(email, id);
        }
        if let Some(phone) = keys.phone {
            self.by_phone.insert(phone, id);
        }
        if let Some(provider) = keys.provider {
            self.by_provider.insert(provider, id);
        }
    }

    fn unindex(&mut self, keys: &IndexKeys) {
        self.by_login.remove(&keys.login);
        if let Some(email) = &keys.email {
            self.by_email.remove(email);
        }
        if let Some(phone) = &keys.phone {
            self.by_phone.remove(phone);
        }
        if let Some(provider) = &keys.provider {
            self.by_provider.remove(provider);
        }
    }

    fn lookup(&self, id: Option<&UserId>) -> Option<User> {
        id.and_then(|id| self.users.get(id)).cloned()
    }
}

/// `UserStore` kept entirely in memory, with the same uniqueness rules as
/// the MySQL schema. Nothing survives a restart.
pub struct InMemoryUserStore {
    inner: RwLock<Indexes>,
    span: Span,
}

impl InMemoryUserStore {
    /// Creates an empty store logging under `span`.
    #[must_use]
    pub fn new(span: Span) -> Self {
        Self {
            inner: RwLock::new(Indexes::default()),
            span,
        }
    }

    /// Number of stored users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn found(user: Option<User>, lookup: String) -> EcoMindResult<User> {
        user.ok_or_else(|| EcoMindError::not_found("User", lookup))
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new(Span::none())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_by_login(&self, login: &str) -> EcoMindResult<User> {
        let inner = self.inner.read();
        Self::found(
            inner.lookup(inner.by_login.get(&login.to_lowercase())),
            format!("login {login}"),
        )
    }

    async fn get_by_email(&self, email: &str) -> EcoMindResult<User> {
        let inner = self.inner.read();
        Self::found(
            inner.lookup(inner.by_email.get(&email.to_lowercase())),
            format!("email {email}"),
        )
    }

    async fn get_by_phone_number(&self, phone_number: &str) -> EcoMindResult<User> {
        let inner = self.inner.read();
        Self::found(
            inner.lookup(inner.by_phone.get(phone_number)),
            format!("phone number {phone_number}"),
        )
    }

    async fn get_by_id(&self, id: UserId) -> EcoMindResult<User> {
        let inner = self.inner.read();
        Self::found(inner.users.get(&id).cloned(), format!("id {id}"))
    }

    async fn get_by_provider(&self, provider: &str, provider_user_id: &str) -> EcoMindResult<User> {
        let inner = self.inner.read();
        let key = (provider.to_lowercase(), provider_user_id.to_string());
        Self::found(
            inner.lookup(inner.by_provider.get(&key)),
            format!("provider {provider}:{provider_user_id}"),
        )
    }

    async fn create(&self, user: &User) -> EcoMindResult<User> {
        let keys = IndexKeys::of(user);
        let mut inner = self.inner.write();
        if inner.users.contains_key(&user.id) || inner.collides(&keys, user.id) {
            return Err(EcoMindError::already_exists(
                "a user with this login, email or phone number already exists",
            ));
        }
        inner.index(keys, user.id);
        inner.users.insert(user.id, user.clone());
        debug!(parent: &self.span, id = %user.id, login = %user.login, "user created");
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> EcoMindResult<User> {
        let mut inner = self.inner.write();
        let previous = inner
            .users
            .get(&user.id)
            .cloned()
            .ok_or_else(|| EcoMindError::not_found("User", format!("id {}", user.id)))?;
        ensure_immutable_fields(&previous, user)?;

        let keys = IndexKeys::of(user);
        if inner.collides(&keys, user.id) {
            return Err(EcoMindError::already_exists(
                "email or phone number already belongs to another user",
            ));
        }
        inner.unindex(&IndexKeys::of(&previous));
        inner.index(keys, user.id);
        inner.users.insert(user.id, user.clone());
        debug!(parent: &self.span, id = %user.id, "user updated");
        Ok(user.clone())
    }

    async fn update_auth_token(&self, id: UserId, token: &str) -> EcoMindResult<()> {
        let mut inner = self.inner.write();
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| EcoMindError::not_found("User", format!("id {id}")))?;
        user.set_auth_token(token.to_string());
        debug!(parent: &self.span, %id, "auth token updated");
        Ok(())
    }

    async fn health_check(&self) -> EcoMindResult<()> {
        Ok(())
    }
}
