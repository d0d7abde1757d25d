//! User account controller.

use crate::{
    extractors::{ApiJson, AuthenticatedUser},
    responses::{created, ok, AppError, ApiResult},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use ecomind_service::{CreateUserRequest, UpdateUserRequest, UserResponse};
use tracing::debug;

/// Creates the user router.
///
/// `/me` and the `by-*` prefixes take precedence over `/:login`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/me", patch(update_current_user))
        .route("/by-email/:email", get(get_user_by_email))
        .route("/by-phone/:phone", get(get_user_by_phone_number))
        .route("/:login", get(get_user_by_login))
}

/// Register a new account.
async fn create_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    debug!("Create user request: {}", request.login);

    let response = state.user_service.create_user(request).await?;
    Ok(created(response))
}

async fn get_user_by_login(
    State(state): State<AppState>,
    Path(login): Path<String>,
) -> ApiResult<UserResponse> {
    debug!("Get user by login: {}", login);

    ok(state.user_service.get_user_by_login(&login).await?)
}

async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<UserResponse> {
    debug!("Get user by email: {}", email);

    ok(state.user_service.get_user_by_email(&email).await?)
}

async fn get_user_by_phone_number(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> ApiResult<UserResponse> {
    debug!("Get user by phone number: {}", phone);

    ok(state.user_service.get_user_by_phone_number(&phone).await?)
}

/// Update the caller's own profile.
async fn update_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> ApiResult<UserResponse> {
    let user_id = user.user_id()?;
    debug!("Update user request: {}", user_id);

    ok(state.user_service.update_user(user_id, request).await?)
}
