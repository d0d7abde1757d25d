//! Cache key generators for consistent key naming.
//!
//! Keys look like `ecomind:v1:user:<field>:<value>`. The version segment is
//! [`SCHEMA_VERSION`]; bump it whenever the serialized `User` changes shape
//! so entries written by older builds are never decoded.

use ecomind_core::{User, UserId};

/// Version of the cached `User` representation.
pub const SCHEMA_VERSION: u32 = 1;

/// Prefix for all cache keys to namespace them.
const CACHE_PREFIX: &str = "ecomind";

fn user_key(field: &str, value: &str) -> String {
    format!("{}:v{}:user:{}:{}", CACHE_PREFIX, SCHEMA_VERSION, field, value)
}

/// Cache key for a user by login. Logins compare case-insensitively.
#[must_use]
pub fn user_by_login(login: &str) -> String {
    user_key("login", &login.to_lowercase())
}

/// Cache key for a user by email. Emails compare case-insensitively.
#[must_use]
pub fn user_by_email(email: &str) -> String {
    user_key("email", &email.to_lowercase())
}

/// Cache key for a user by phone number.
#[must_use]
pub fn user_by_phone_number(phone_number: &str) -> String {
    user_key("phone", phone_number)
}

/// Cache key for a user by ID.
#[must_use]
pub fn user_by_id(id: UserId) -> String {
    user_key("id", &id.to_string())
}

/// Cache key for a provider account.
#[must_use]
pub fn user_by_provider(provider: &str, provider_user_id: &str) -> String {
    user_key("provider", &format!("{}:{}", provider.to_lowercase(), provider_user_id))
}

/// Every key under which `user` may be cached.
///
/// Empty email or phone values are never looked up, so they have no key.
#[must_use]
pub fn keys_for(user: &User) -> Vec<String> {
    let mut keys = vec![user_by_login(&user.login), user_by_id(user.id)];
    if user.has_email() {
        keys.push(user_by_email(&user.email));
    }
    if user.has_phone_number() {
        keys.push(user_by_phone_number(&user.phone_number));
    }
    if let (Some(provider), Some(provider_user_id)) = (&user.provider, &user.provider_user_id) {
        keys.push(user_by_provider(provider, provider_user_id));
    }
    keys
}
