//! Authorization-code client shared by the concrete providers.

use super::AuthorizationRequest;
use ecomind_config::OAuthProviderConfig;
use ecomind_core::{EcoMindError, EcoMindResult};
use oauth2::{
    basic::BasicClient, AccessToken, AuthType, AuthUrl, AuthorizationCode, ClientId,
    ClientSecret, CsrfToken, EndpointNotSet, EndpointSet, RedirectUrl, Scope, TokenResponse,
    TokenUrl,
};
use std::time::Duration;
use tracing::{debug, error};

type ConfiguredClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Public endpoints of a provider; any of them may be overridden in config.
pub(crate) struct Endpoints {
    pub auth_url: &'static str,
    pub token_url: &'static str,
    pub userinfo_url: &'static str,
}

pub(crate) struct OAuthClient {
    provider: &'static str,
    client: ConfiguredClient,
    http: reqwest::Client,
    userinfo_url: String,
    scopes: &'static [&'static str],
    extra_params: Vec<(&'static str, String)>,
}

impl OAuthClient {
    pub(crate) fn new(
        provider: &'static str,
        config: &OAuthProviderConfig,
        defaults: &Endpoints,
        scopes: &'static [&'static str],
        auth_type: AuthType,
    ) -> EcoMindResult<Self> {
        let auth_url = config.auth_url.as_deref().unwrap_or(defaults.auth_url);
        let token_url = config.token_url.as_deref().unwrap_or(defaults.token_url);

        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_type(auth_type)
            .set_auth_uri(
                AuthUrl::new(auth_url.to_string()).map_err(|e| invalid(provider, "auth_url", e))?,
            )
            .set_token_uri(
                TokenUrl::new(token_url.to_string())
                    .map_err(|e| invalid(provider, "token_url", e))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(config.redirect_url.clone())
                    .map_err(|e| invalid(provider, "redirect_url", e))?,
            );

        // Following redirects during token exchange would allow SSRF.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| EcoMindError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            provider,
            client,
            http,
            userinfo_url: config
                .userinfo_url
                .clone()
                .unwrap_or_else(|| defaults.userinfo_url.to_string()),
            scopes,
            extra_params: Vec::new(),
        })
    }

    /// Adds a query parameter to every consent URL.
    pub(crate) fn with_extra_param(mut self, name: &'static str, value: String) -> Self {
        self.extra_params.push((name, value));
        self
    }

    pub(crate) fn authorize_url(&self) -> AuthorizationRequest {
        let mut request = self.client.authorize_url(CsrfToken::new_random);
        for scope in self.scopes {
            request = request.add_scope(Scope::new((*scope).to_string()));
        }
        for (name, value) in &self.extra_params {
            request = request.add_extra_param(*name, value.clone());
        }
        let (url, csrf_state) = request.url();

        AuthorizationRequest {
            url: url.to_string(),
            csrf_state: csrf_state.secret().clone(),
        }
    }

    pub(crate) async fn exchange(&self, code: &str) -> EcoMindResult<AccessToken> {
        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| {
                error!(provider = self.provider, error = %e, "Authorization code exchange failed");
                EcoMindError::external(self.provider, format!("code exchange failed: {e}"))
            })?;

        debug!(provider = self.provider, "Authorization code exchanged");
        Ok(response.access_token().clone())
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn userinfo_url(&self) -> &str {
        &self.userinfo_url
    }

    pub(crate) fn provider(&self) -> &'static str {
        self.provider
    }

    /// Reads a successful JSON body, mapping transport and status failures.
    pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> EcoMindResult<T> {
        let response = response.map_err(|e| self.upstream("user info request failed", &e))?;
        let status = response.status();
        if !status.is_success() {
            error!(provider = self.provider, %status, "User info endpoint returned an error");
            return Err(EcoMindError::external(
                self.provider,
                format!("user info endpoint returned {status}"),
            ));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| self.upstream("invalid user info payload", &e))
    }

    fn upstream(&self, what: &str, err: &reqwest::Error) -> EcoMindError {
        error!(provider = self.provider, error = %err, "{}", what);
        EcoMindError::external(self.provider, format!("{what}: {err}"))
    }
}

fn invalid(provider: &str, field: &str, err: oauth2::url::ParseError) -> EcoMindError {
    EcoMindError::Configuration(format!("oauth.{provider}.{field} is not a valid URL: {err}"))
}
