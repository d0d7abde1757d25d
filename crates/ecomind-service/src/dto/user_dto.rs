//! User-related DTOs.

use ecomind_core::validation::rules;
use ecomind_core::{User, UserId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to register a user with a password.
///
/// Missing JSON fields deserialize as empty strings and fail validation.
#[derive(Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CreateUserRequest {
    #[validate(custom(function = "rules::valid_login"))]
    pub login: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = "rules::valid_phone_number"))]
    pub phone_number: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("login", &self.login)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .finish_non_exhaustive()
    }
}

/// Partial update of the caller's own profile. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(custom(function = "rules::valid_phone_number"))]
    pub phone_number: Option<String>,

    /// Carbon footprint in kilograms.
    #[validate(range(min = 0.0, message = "co2 must not be negative"))]
    pub co2: Option<f64>,
}

impl UpdateUserRequest {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone_number.is_none() && self.co2.is_none()
    }
}

/// User response DTO. Never carries the password hash or session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub login: String,
    pub email: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co2: Option<f64>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            login: user.login,
            email: user.email,
            phone_number: user.phone_number,
            co2: user.co2,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            login: user.login.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            co2: user.co2,
        }
    }
}
