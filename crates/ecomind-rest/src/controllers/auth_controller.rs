//! Authentication controller: password login and the provider redirect flow.

use crate::{
    extractors::ApiJson,
    responses::{ok, AppError, ApiResult},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use ecomind_core::EcoMindError;
use ecomind_service::{AuthResponse, LoginRequest};
use serde::Deserialize;
use tracing::{debug, warn};

/// Cookie carrying the CSRF state between the redirect and the callback.
pub const STATE_COOKIE: &str = "ecomind_oauth_state";
const STATE_COOKIE_PATH: &str = "/api/auth";

/// Creates the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/providers", get(list_providers))
        .route("/:provider", get(authorize))
        .route("/:provider/callback", get(callback))
}

/// Query parameters a provider appends when redirecting back.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Login with login and password.
async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<AuthResponse> {
    debug!("Login request for: {}", request.login);

    ok(state.auth_service.login(request).await?)
}

/// Names of the configured providers.
async fn list_providers(State(state): State<AppState>) -> Json<Vec<&'static str>> {
    Json(state.identity_providers.names())
}

/// Redirect to the provider's consent page.
async fn authorize(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let provider = state
        .identity_providers
        .get(&provider.to_ascii_lowercase())?;
    debug!("Redirecting to provider: {}", provider.name());

    let request = provider.authorize_url();
    let cookie = Cookie::build((STATE_COOKIE, request.csrf_state))
        .path(STATE_COOKIE_PATH)
        .http_only(true)
        .secure(state.secure_cookies)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Redirect::to(&request.url)))
}

/// Finish the provider flow. The state cookie is cleared whatever the outcome.
async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> (CookieJar, ApiResult<AuthResponse>) {
    let expected_state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(Cookie::build(STATE_COOKIE).path(STATE_COOKIE_PATH));

    let result = complete_sign_in(&state, &provider, query, expected_state).await;
    (jar, result)
}

async fn complete_sign_in(
    state: &AppState,
    provider: &str,
    query: CallbackQuery,
    expected_state: Option<String>,
) -> ApiResult<AuthResponse> {
    let provider = state
        .identity_providers
        .get(&provider.to_ascii_lowercase())?;

    if let Some(error) = query.error {
        warn!("Provider {} returned an error: {}", provider.name(), error);
        return Err(AppError(EcoMindError::unauthorized(format!(
            "Sign-in with {} was not completed",
            provider.name()
        ))));
    }

    match (query.state.as_deref(), expected_state.as_deref()) {
        (Some(received), Some(expected)) if !expected.is_empty() && received == expected => {}
        _ => {
            warn!("OAuth state mismatch for provider: {}", provider.name());
            return Err(AppError(EcoMindError::unauthorized("Invalid OAuth state")));
        }
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError(EcoMindError::validation("Missing authorization code")))?;

    let identity = provider.exchange_code(&code).await?;
    ok(state.auth_service.provider_login(identity).await?)
}
