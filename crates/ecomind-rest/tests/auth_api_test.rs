//! Authentication endpoints over the full router.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{google, TestApp};
use ecomind_core::{EcoMindError, ProviderIdentity};
use mockall::predicate::eq;

fn callback(query: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(format!("/api/auth/google/callback?{query}"));
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_password_login_returns_bearer_token() {
    let app = TestApp::new();
    let alice = app.register_alice().await;

    let response = app.login("alice", "pw").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["token_type"], "Bearer");
    assert!(response.body["expires_in"].as_u64().unwrap() > 0);
    assert_eq!(response.body["user"]["id"], alice["id"]);
    assert!(response.body["user"].get("auth_token").is_none());
}

#[tokio::test]
async fn test_bad_credentials_look_the_same() {
    let app = TestApp::new();
    app.register_alice().await;

    for (login, password) in [("alice", "wrong"), ("nobody", "pw")] {
        let response = app.login(login, password).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.code(), "INVALID_CREDENTIALS");
    }
}

#[tokio::test]
async fn test_provider_redirect_sets_state_cookie() {
    let app = TestApp::with_provider(google(|_| {}));

    let response = app.get("/api/auth/Google").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers[header::LOCATION],
        "https://accounts.example/auth?state=s1"
    );
    let cookie = response.set_cookie();
    assert!(cookie.starts_with("ecomind_oauth_state=s1"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/api/auth"));
}

#[tokio::test]
async fn test_provider_callback_creates_then_reuses_account() {
    let app = TestApp::with_provider(google(|p| {
        p.expect_exchange_code()
            .with(eq("code-1"))
            .times(2)
            .returning(|_| Ok(ProviderIdentity::new("google", "g1", "")));
    }));

    let first = app
        .send(callback("code=code-1&state=s1", Some("ecomind_oauth_state=s1")))
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["user"]["login"], "google:g1");
    assert!(first.set_cookie().contains("Max-Age=0"));

    let second = app
        .send(callback("code=code-1&state=s1", Some("ecomind_oauth_state=s1")))
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["user"]["id"], first.body["user"]["id"]);
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn test_provider_callback_rejects_state_mismatch() {
    // No exchange expectation: reaching the provider fails the test.
    let app = TestApp::with_provider(google(|_| {}));

    for request in [
        callback("code=c&state=s1", None),
        callback("code=c&state=s1", Some("ecomind_oauth_state=other")),
        callback("code=c", Some("ecomind_oauth_state=s1")),
    ] {
        let response = app.send(request).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.code(), "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn test_provider_denial_is_unauthorized() {
    let app = TestApp::with_provider(google(|_| {}));

    let response = app
        .send(callback("error=access_denied&state=s1", Some("ecomind_oauth_state=s1")))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_provider_email_conflict() {
    let app = TestApp::with_provider(google(|p| {
        p.expect_exchange_code()
            .returning(|_| Ok(ProviderIdentity::new("google", "g1", "a@x.com")));
    }));
    app.register_alice().await;

    let response = app
        .send(callback("code=c&state=s1", Some("ecomind_oauth_state=s1")))
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.code(), "CONFLICT");
}

#[tokio::test]
async fn test_provider_outage_is_bad_gateway() {
    let app = TestApp::with_provider(google(|p| {
        p.expect_exchange_code()
            .returning(|_| Err(EcoMindError::external("google", "token endpoint returned 503")));
    }));

    let response = app
        .send(callback("code=c&state=s1", Some("ecomind_oauth_state=s1")))
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(!response.body["message"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_unknown_provider_is_not_found() {
    let app = TestApp::new();

    assert_eq!(app.get("/api/auth/myspace").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lists_configured_providers() {
    let app = TestApp::with_provider(google(|_| {}));

    let response = app.get("/api/auth/providers").await;

    assert_eq!(response.body, serde_json::json!(["google"]));
}
