//! Bearer-token extractor.

use crate::{responses::AppError, state::AppState};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use ecomind_core::{EcoMindError, UserId};
use ecomind_security::Claims;

/// Claims of a caller that presented a valid `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    /// The authenticated account.
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0
            .user_id()
            .ok_or_else(|| AppError(EcoMindError::InvalidToken("malformed subject".to_string())))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = Claims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError(EcoMindError::unauthorized("Missing authorization header")))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError(EcoMindError::unauthorized("Invalid authorization format")))?;

        let claims = state.auth_service.validate_token(token).await?;
        Ok(AuthenticatedUser(claims))
    }
}
