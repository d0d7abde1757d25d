//! TikTok login kit.

use super::client::{Endpoints, OAuthClient};
use super::{AuthorizationRequest, IdentityProvider};
use async_trait::async_trait;
use ecomind_config::OAuthProviderConfig;
use ecomind_core::{EcoMindError, EcoMindResult, ProviderIdentity};
use oauth2::AuthType;
use serde::Deserialize;

const TIKTOK: Endpoints = Endpoints {
    auth_url: "https://www.tiktok.com/v2/oauth/authorize/",
    token_url: "https://open-api.tiktok.com/oauth/access_token/",
    userinfo_url: "https://open-api.tiktok.com/user/info/",
};

const SCOPES: &[&str] = &["user.info.basic"];

#[derive(Debug, Deserialize)]
struct TikTokUserInfo {
    user: TikTokUser,
}

#[derive(Debug, Deserialize)]
struct TikTokUser {
    user_id: String,
}

/// TikTok provider. TikTok shares no email, so identities carry none.
pub struct TikTokProvider {
    client: OAuthClient,
}

impl TikTokProvider {
    pub const NAME: &'static str = "tiktok";

    pub fn new(config: &OAuthProviderConfig) -> EcoMindResult<Self> {
        // TikTok reads the client id from `client_key` and the secret from the body.
        let client = OAuthClient::new(Self::NAME, config, &TIKTOK, SCOPES, AuthType::RequestBody)?
            .with_extra_param("client_key", config.client_id.clone());
        Ok(Self { client })
    }
}

#[async_trait]
impl IdentityProvider for TikTokProvider {
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
            .query(&[("access_token", token.secret())])
            .send()
            .await;
        let info: TikTokUserInfo = self.client.read_json(response).await?;

        if info.user.user_id.is_empty() {
            return Err(EcoMindError::external(
                self.client.provider(),
                "user info has no user_id",
            ));
        }
        Ok(ProviderIdentity::new(Self::NAME, info.user.user_id, ""))
    }
}

impl std::fmt::Debug for TikTokProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TikTokProvider").finish_non_exhaustive()
    }
}
