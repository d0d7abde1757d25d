//! Authentication-related DTOs.

use super::UserResponse;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Password login request.
#[derive(Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Login is required"))]
    pub login: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

/// Issued session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
    pub user: UserResponse,
}

impl AuthResponse {
    pub const TOKEN_TYPE: &'static str = "Bearer";

    #[must_use]
    pub fn bearer(token: String, expires_in: u64, user: UserResponse) -> Self {
        Self {
            token,
            token_type: Self::TOKEN_TYPE.to_string(),
            expires_in,
            user,
        }
    }
}
