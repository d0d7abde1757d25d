//! Google sign-in.

use super::client::{Endpoints, OAuthClient};
use super::{AuthorizationRequest, IdentityProvider};
use async_trait::async_trait;
use ecomind_config::OAuthProviderConfig;
use ecomind_core::{EcoMindError, EcoMindResult, ProviderIdentity};
use oauth2::AuthType;
use serde::Deserialize;

const GOOGLE: Endpoints = Endpoints {
    auth_url: "https://accounts.google.com/o/oauth2/v2/auth",
    token_url: "https://oauth2.googleapis.com/token",
    userinfo_url: "https://www.googleapis.com/oauth2/v3/userinfo",
};

const SCOPES: &[&str] = &["openid", "email", "profile"];

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    #[serde(default)]
    email: String,
}

/// Google OpenID Connect provider. The identity is `sub`, plus the email.
pub struct GoogleProvider {
    client: OAuthClient,
}

impl GoogleProvider {
    pub const NAME: &'static str = "google";

    pub fn new(config: &OAuthProviderConfig) -> EcoMindResult<Self> {
        let client = OAuthClient::new(Self::NAME, config, &GOOGLE, SCOPES, AuthType::BasicAuth)?
            .with_extra_param("access_type", "online".to_string());
        Ok(Self { client })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn authorize_url(&self) -> AuthorizationRequest {
        self.client.authorize_url()
    }

    async fn exchange_code(&self, code: &str) -> EcoMindResult<ProviderIdentity> {
        let token = self.client.exchange(code).await?;
        let response = self
            .client
            .http()
            .get(self.client.userinfo_url())
            .bearer_auth(token.secret())
            .send()
            .await;
        let info: GoogleUserInfo = self.client.read_json(response).await?;

        if info.sub.is_empty() {
            return Err(EcoMindError::external(
                self.client.provider(),
                "user info has no subject",
            ));
        }
        Ok(ProviderIdentity::new(Self::NAME, info.sub, info.email))
    }
}

impl std::fmt::Debug for GoogleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleProvider").finish_non_exhaustive()
    }
}
