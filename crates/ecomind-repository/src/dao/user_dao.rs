//! UserDao trait: low-level user data access abstraction.
//!
//! Implementations talk to a single data source. [`CachedUserStore`] puts a
//! cache in front of one.
//!
//! [`CachedUserStore`]: crate::CachedUserStore

use async_trait::async_trait;
use ecomind_core::{EcoMindResult, User, UserId};

/// Low-level user data access object.
#[async_trait]
pub trait UserDao: Send + Sync {
    /// Finds a user by ID.
    async fn find_by_id(&self, id: UserId) -> EcoMindResult<Option<User>>;

    /// Finds a user by login.
    async fn find_by_login(&self, login: &str) -> EcoMindResult<Option<User>>;

    /// Finds a user by email.
    async fn find_by_email(&self, email: &str) -> EcoMindResult<Option<User>>;

    /// Finds a user by phone number.
    async fn find_by_phone_number(&self, phone_number: &str) -> EcoMindResult<Option<User>>;

    /// Finds a user by provider identity.
    async fn find_by_provider(
        &self,
        provider: &str,
        provider_user_id: &str,
    ) -> EcoMindResult<Option<User>>;

    /// Checks in a single query whether any user has this login, or this
    /// email or phone number when those are non-empty.
    async fn exists_any(&self, login: &str, email: &str, phone_number: &str) -> EcoMindResult<bool>;

    /// Inserts a new user. A unique-index violation is `AlreadyExists`.
    async fn insert(&self, user: &User) -> EcoMindResult<()>;

    /// Updates the mutable columns of an existing user.
    async fn update(&self, user: &User) -> EcoMindResult<()>;

    /// Updates only the auth token column.
    async fn update_auth_token(&self, id: UserId, token: &str) -> EcoMindResult<()>;

    /// Checks that the data source is reachable.
    async fn health_check(&self) -> EcoMindResult<()>;
}
