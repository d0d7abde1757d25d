//! User service trait definition.

use crate::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
use async_trait::async_trait;
use ecomind_core::{EcoMindResult, User, UserId};

/// User service trait.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Registers a user with a password.
    async fn create_user(&self, request: CreateUserRequest) -> EcoMindResult<UserResponse>;

    /// Gets a user by ID.
    async fn get_user(&self, id: UserId) -> EcoMindResult<UserResponse>;

    /// Gets a user by login.
    async fn get_user_by_login(&self, login: &str) -> EcoMindResult<UserResponse>;

    /// Gets a user by email.
    async fn get_user_by_email(&self, email: &str) -> EcoMindResult<UserResponse>;

    /// Gets a user by phone number.
    async fn get_user_by_phone_number(&self, phone_number: &str) -> EcoMindResult<UserResponse>;

    /// Returns the account linked to a provider identity, creating it on
    /// first sign-in.
    ///
    /// Fails with `Conflict` when `email` already belongs to another account.
    async fn find_or_create_by_provider(
        &self,
        provider: &str,
        provider_user_id: &str,
        email: &str,
    ) -> EcoMindResult<User>;

    /// Checks a password and returns the account it unlocks.
    async fn validate_password(&self, login: &str, password: &str) -> EcoMindResult<User>;

    /// Applies a partial profile update.
    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> EcoMindResult<UserResponse>;

    /// Records the session token last issued to a user.
    async fn update_auth_token(&self, id: UserId, token: &str) -> EcoMindResult<()>;
}
