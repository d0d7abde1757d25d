//! Repository trait definitions.

use async_trait::async_trait;
use ecomind_core::{EcoMindResult, User, UserId};

/// Durable user storage as seen by the service layer.
///
/// Lookups return `NotFound` rather than `Option` so that absence reads the
/// same across variants. Uniqueness of login, email, phone number and
/// provider identity is decided by the store; a collision on any write is
/// `AlreadyExists`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by login.
    async fn get_by_login(&self, login: &str) -> EcoMindResult<User>;

    /// Finds a user by email.
    async fn get_by_email(&self, email: &str) -> EcoMindResult<User>;

    /// Finds a user by phone number.
    async fn get_by_phone_number(&self, phone_number: &str) -> EcoMindResult<User>;

    /// Finds a user by ID.
    async fn get_by_id(&self, id: UserId) -> EcoMindResult<User>;

    /// Finds a provider account by `(provider, provider_user_id)`.
    async fn get_by_provider(&self, provider: &str, provider_user_id: &str) -> EcoMindResult<User>;

    /// Persists a new user.
    async fn create(&self, user: &User) -> EcoMindResult<User>;

    /// Persists changes to email, phone number, password hash, co2 and auth token.
    ///
    /// Login and provider identity are immutable; changing them is a
    /// validation error.
    async fn update(&self, user: &User) -> EcoMindResult<User>;

    /// Stores the latest session token for a user.
    async fn update_auth_token(&self, id: UserId, token: &str) -> EcoMindResult<()>;

    /// Checks that the backing store is reachable.
    async fn health_check(&self) -> EcoMindResult<()>;
}
