//! User service implementation.

use crate::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::user_service::UserService;
use async_trait::async_trait;
use ecomind_core::validation::require_non_blank;
use ecomind_core::{EcoMindError, EcoMindResult, ProviderIdentity, User, UserId, ValidateExt};
use ecomind_repository::UserStore;
use ecomind_security::PasswordHasherInterface;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info, warn};

/// User service over any [`UserStore`].
pub struct UserServiceImpl {
    store: Arc<dyn UserStore>,
    password_hasher: Arc<dyn PasswordHasherInterface>,
}

impl UserServiceImpl {
    /// Creates a new user service.
    pub fn new(store: Arc<dyn UserStore>, password_hasher: Arc<dyn PasswordHasherInterface>) -> Self {
        Self {
            store,
            password_hasher,
        }
    }

    /// Hashes on the blocking pool; Argon2 would otherwise stall the runtime.
    async fn hash_password(&self, password: String) -> EcoMindResult<String> {
        let hasher = Arc::clone(&self.password_hasher);
        task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(join_error)?
    }

    /// Verifies `password` and, when the stored hash uses outdated
    /// parameters, returns a fresh hash to persist.
    async fn verify_password(
        &self,
        password: String,
        hash: String,
    ) -> EcoMindResult<(bool, Option<String>)> {
        let hasher = Arc::clone(&self.password_hasher);
        task::spawn_blocking(move || {
            if !hasher.verify(&password, &hash)? {
                return Ok((false, None));
            }
            let rehashed = if hasher.needs_rehash(&hash) {
                Some(hasher.hash(&password)?)
            } else {
                None
            };
            Ok((true, rehashed))
        })
        .await
        .map_err(join_error)?
    }
}

fn join_error(err: task::JoinError) -> EcoMindError {
    EcoMindError::Internal(format!("Password task failed: {}", err))
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn create_user(&self, request: CreateUserRequest) -> EcoMindResult<UserResponse> {
        debug!("Creating user: {}", request.login);

        request.validate_request()?;

        let CreateUserRequest {
            login,
            email,
            phone_number,
            password,
        } = request;
        let password_hash = self.hash_password(password).await?;

        let user = User::new(
            login.trim().to_string(),
            email.trim().to_string(),
            phone_number.trim().to_string(),
            password_hash,
        );
        let saved_user = self.store.create(&user).await?;

        info!("User created: {}", saved_user.id);
        Ok(UserResponse::from(saved_user))
    }

    async fn get_user(&self, id: UserId) -> EcoMindResult<UserResponse> {
        debug!("Getting user: {}", id);
        self.store.get_by_id(id).await.map(UserResponse::from)
    }

    async fn get_user_by_login(&self, login: &str) -> EcoMindResult<UserResponse> {
        require_non_blank("login", login)?;
        self.store.get_by_login(login.trim()).await.map(UserResponse::from)
    }

    async fn get_user_by_email(&self, email: &str) -> EcoMindResult<UserResponse> {
        require_non_blank("email", email)?;
        self.store.get_by_email(email.trim()).await.map(UserResponse::from)
    }

    async fn get_user_by_phone_number(&self, phone_number: &str) -> EcoMindResult<UserResponse> {
        require_non_blank("phone_number", phone_number)?;
        self.store
            .get_by_phone_number(phone_number.trim())
            .await
            .map(UserResponse::from)
    }

    async fn find_or_create_by_provider(
        &self,
        provider: &str,
        provider_user_id: &str,
        email: &str,
    ) -> EcoMindResult<User> {
        require_non_blank("provider", provider)?;
        require_non_blank("provider_user_id", provider_user_id)?;
        let provider = provider.to_lowercase();

        match self.store.get_by_provider(&provider, provider_user_id).await {
            Ok(user) => {
                debug!("Provider account found: {}", user.id);
                return Ok(user);
            }
            Err(EcoMindError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let email = email.trim();
        if !email.is_empty() {
            match self.store.get_by_email(email).await {
                Ok(owner) => {
                    warn!(
                        "Refusing to link {}:{} to existing account {}",
                        provider, provider_user_id, owner.id
                    );
                    return Err(EcoMindError::conflict(
                        "email is already registered to another account",
                    ));
                }
                Err(EcoMindError::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        let identity = ProviderIdentity::new(provider, provider_user_id, email);
        match self.store.create(&User::from_provider(&identity)).await {
            Ok(user) => {
                info!("Provider account created: {} for {}", user.id, identity);
                Ok(user)
            }
            // A concurrent first sign-in may have won the insert.
            Err(EcoMindError::AlreadyExists(reason)) => {
                match self
                    .store
                    .get_by_provider(&identity.provider, &identity.provider_user_id)
                    .await
                {
                    Ok(user) => Ok(user),
                    Err(EcoMindError::NotFound { .. }) => Err(EcoMindError::AlreadyExists(reason)),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn validate_password(&self, login: &str, password: &str) -> EcoMindResult<User> {
        require_non_blank("login", login)?;

        let user = self.store.get_by_login(login.trim()).await?;
        let Some(hash) = user.password_hash.clone() else {
            warn!("Password login attempted for provider account: {}", user.id);
            return Err(EcoMindError::InvalidCredentials);
        };

        let (valid, rehashed) = self.verify_password(password.to_string(), hash).await?;
        if !valid {
            warn!("Invalid password for user: {}", user.id);
            return Err(EcoMindError::InvalidCredentials);
        }

        if let Some(new_hash) = rehashed {
            let mut upgraded = user.clone();
            upgraded.password_hash = Some(new_hash);
            match self.store.update(&upgraded).await {
                Ok(saved) => {
                    debug!("Password hash upgraded for user: {}", saved.id);
                    return Ok(saved);
                }
                Err(e) => warn!("Could not upgrade password hash for {}: {}", user.id, e),
            }
        }

        Ok(user)
    }

    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> EcoMindResult<UserResponse> {
        debug!("Updating user: {}", id);

        request.validate_request()?;

        let mut user = self.store.get_by_id(id).await?;
        if request.is_empty() {
            return Ok(UserResponse::from(user));
        }

        if let Some(email) = request.email {
            user.set_email(email.trim().to_string());
        }
        if let Some(phone_number) = request.phone_number {
            user.set_phone_number(phone_number.trim().to_string());
        }
        if let Some(co2) = request.co2 {
            user.set_co2(co2);
        }

        let updated_user = self.store.update(&user).await?;

        info!("User updated: {}", id);
        Ok(UserResponse::from(updated_user))
    }

    async fn update_auth_token(&self, id: UserId, token: &str) -> EcoMindResult<()> {
        require_non_blank("token", token)?;
        self.store.update_auth_token(id, token).await?;
        debug!("Auth token updated for user: {}", id);
        Ok(())
    }
}
