#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use ecomind_config::{SecurityConfig, ServerConfig};
use ecomind_core::{EcoMindResult, ProviderIdentity};
use ecomind_repository::InMemoryUserStore;
use ecomind_rest::{create_router, AppState};
use ecomind_security::{
    AuthorizationRequest, IdentityProvider, IdentityProviders, PasswordHasher, TokenProvider,
};
use ecomind_service::{AuthServiceImpl, UserServiceImpl};
use http_body_util::BodyExt;
use mockall::mock;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

mock! {
    pub Provider {}

    #[async_trait]
    impl IdentityProvider for Provider {
        fn name(&self) -> &'static str;
        fn authorize_url(&self) -> AuthorizationRequest;
        async fn exchange_code(&self, code: &str) -> EcoMindResult<ProviderIdentity>;
    }
}

/// A provider named `google` that always hands out state `s1`.
pub fn google(configure: impl FnOnce(&mut MockProvider)) -> MockProvider {
    let mut provider = MockProvider::new();
    provider.expect_name().return_const("google");
    provider.expect_authorize_url().returning(|| AuthorizationRequest {
        url: "https://accounts.example/auth?state=s1".to_string(),
        csrf_state: "s1".to_string(),
    });
    configure(&mut provider);
    provider
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryUserStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_providers(IdentityProviders::new())
    }

    pub fn with_provider(provider: MockProvider) -> Self {
        let mut providers = IdentityProviders::new();
        providers.register(Arc::new(provider));
        Self::with_providers(providers)
    }

    pub fn with_providers(providers: IdentityProviders) -> Self {
        let store = Arc::new(InMemoryUserStore::default());
        let users = Arc::new(UserServiceImpl::new(
            store.clone(),
            Arc::new(PasswordHasher::with_cost(1)),
        ));
        let tokens = Arc::new(TokenProvider::new(Arc::new(SecurityConfig {
            jwt_secret: "rest-integration-test-secret-32-bytes".to_string(),
            ..Default::default()
        })));
        let auth = Arc::new(AuthServiceImpl::new(users.clone(), tokens));

        let state = AppState::new(users, auth, providers, store.clone());
        Self {
            router: create_router(state, &ServerConfig::default()),
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(json_request("POST", uri, body, None)).await
    }

    /// Registers alice and returns her JSON representation.
    pub async fn register_alice(&self) -> Value {
        let response = self
            .post_json(
                "/api/users",
                serde_json::json!({
                    "login": "alice",
                    "email": "a@x.com",
                    "phone_number": "+1000",
                    "password": "pw",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body
    }

    pub async fn login(&self, login: &str, password: &str) -> TestResponse {
        self.post_json(
            "/api/auth/login",
            serde_json::json!({ "login": login, "password": password }),
        )
        .await
    }
}

pub fn json_request(method: &str, uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }

    pub fn set_cookie(&self) -> String {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }
}
