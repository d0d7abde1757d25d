//! Application state for Axum handlers.

use ecomind_repository::UserStore;
use ecomind_security::IdentityProviders;
use ecomind_service::{AuthService, UserService};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub auth_service: Arc<dyn AuthService>,
    pub identity_providers: Arc<IdentityProviders>,
    /// Probed by `/ready`.
    pub store: Arc<dyn UserStore>,
    /// Marks the OAuth state cookie `Secure`.
    pub secure_cookies: bool,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        user_service: Arc<dyn UserService>,
        auth_service: Arc<dyn AuthService>,
        identity_providers: IdentityProviders,
        store: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            user_service,
            auth_service,
            identity_providers: Arc::new(identity_providers),
            store,
            secure_cookies: false,
        }
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}
