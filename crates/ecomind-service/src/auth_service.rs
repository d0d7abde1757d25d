//! Authentication service: password and provider sign-in, session tokens.

use crate::dto::{AuthResponse, LoginRequest, UserResponse};
use crate::user_service::UserService;
use async_trait::async_trait;
use ecomind_core::{EcoMindError, EcoMindResult, ProviderIdentity, User, ValidateExt};
use ecomind_security::{Claims, TokenProvider};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Authentication service trait.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Logs in with login and password.
    async fn login(&self, request: LoginRequest) -> EcoMindResult<AuthResponse>;

    /// Logs in with an identity vouched for by a provider, creating the
    /// account on first sign-in.
    async fn provider_login(&self, identity: ProviderIdentity) -> EcoMindResult<AuthResponse>;

    /// Validates a session token and returns its claims.
    async fn validate_token(&self, token: &str) -> EcoMindResult<Claims>;
}

/// Authentication service implementation.
pub struct AuthServiceImpl {
    user_service: Arc<dyn UserService>,
    token_provider: Arc<TokenProvider>,
}

impl AuthServiceImpl {
    /// Creates a new authentication service.
    pub fn new(user_service: Arc<dyn UserService>, token_provider: Arc<TokenProvider>) -> Self {
        Self {
            user_service,
            token_provider,
        }
    }

    /// Issues a token, records it on the account and builds the response.
    async fn start_session(&self, user: User) -> EcoMindResult<AuthResponse> {
        let issued = self.token_provider.issue(user.id, &user.login)?;
        self.user_service
            .update_auth_token(user.id, &issued.token)
            .await?;

        info!("Session started for user: {}", user.id);
        Ok(AuthResponse::bearer(
            issued.token,
            issued.expires_in,
            UserResponse::from(user),
        ))
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn login(&self, request: LoginRequest) -> EcoMindResult<AuthResponse> {
        debug!("Login attempt for: {}", request.login);

        request.validate_request()?;

        // Unknown logins look like bad passwords to the caller.
        let user = self
            .user_service
            .validate_password(&request.login, &request.password)
            .await
            .map_err(|e| match e {
                EcoMindError::NotFound { .. } => {
                    warn!("Login failed: user not found - {}", request.login);
                    EcoMindError::InvalidCredentials
                }
                other => other,
            })?;

        self.start_session(user).await
    }

    async fn provider_login(&self, identity: ProviderIdentity) -> EcoMindResult<AuthResponse> {
        debug!("Provider login for: {}", identity);

        let user = self
            .user_service
            .find_or_create_by_provider(
                &identity.provider,
                &identity.provider_user_id,
                &identity.email,
            )
            .await?;

        self.start_session(user).await
    }

    async fn validate_token(&self, token: &str) -> EcoMindResult<Claims> {
        self.token_provider.validate_token(token)
    }
}
