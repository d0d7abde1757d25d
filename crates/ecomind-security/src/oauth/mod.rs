//! Third-party identity providers (OAuth2 authorization-code flow).

mod client;
mod google;
mod tiktok;

pub use google::GoogleProvider;
pub use tiktok::TikTokProvider;

use async_trait::async_trait;
use ecomind_config::OAuthConfig;
use ecomind_core::{EcoMindError, EcoMindResult, ProviderIdentity};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Where to send the user to sign in, and the state to expect back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub url: String,
    /// Anti-CSRF value the callback must echo in its `state` parameter.
    pub csrf_state: String,
}

/// A provider that can vouch for a user's identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Lowercase provider name, also the path segment in `/api/auth/{name}`.
    fn name(&self) -> &'static str;

    /// Builds the provider's consent URL with a fresh CSRF state.
    fn authorize_url(&self) -> AuthorizationRequest;

    /// Exchanges an authorization code for the identity it belongs to.
    ///
    /// Provider failures surface as `ExternalService`.
    async fn exchange_code(&self, code: &str) -> EcoMindResult<ProviderIdentity>;
}

/// Registry of configured identity providers, keyed by name.
#[derive(Clone, Default)]
pub struct IdentityProviders {
    providers: BTreeMap<&'static str, Arc<dyn IdentityProvider>>,
}

impl IdentityProviders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every provider that has client credentials.
    pub fn from_config(config: &OAuthConfig) -> EcoMindResult<Self> {
        let mut providers = Self::new();
        if config.google.is_configured() {
            providers.register(Arc::new(GoogleProvider::new(&config.google)?));
        }
        if config.tiktok.is_configured() {
            providers.register(Arc::new(TikTokProvider::new(&config.tiktok)?));
        }
        info!(providers = ?providers.names(), "Identity providers registered");
        Ok(providers)
    }

    pub fn register(&mut self, provider: Arc<dyn IdentityProvider>) {
        self.providers.insert(provider.name(), provider);
    }

    /// Looks up a provider; unknown or unconfigured names are `NotFound`.
    pub fn get(&self, name: &str) -> EcoMindResult<Arc<dyn IdentityProvider>> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| EcoMindError::not_found("IdentityProvider", name))
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.providers.keys().copied().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for IdentityProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityProviders")
            .field("providers", &self.names())
            .finish()
    }
}
