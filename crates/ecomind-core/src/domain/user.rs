//! User entity.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Identity asserted by a third-party provider after a code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    /// Provider name, e.g. `google` or `tiktok`.
    pub provider: String,
    /// Stable account identifier issued by the provider.
    pub provider_user_id: String,
    /// Verified email, empty when the provider does not share one.
    #[serde(default)]
    pub email: String,
}

impl ProviderIdentity {
    /// Creates a provider identity.
    #[must_use]
    pub fn new(
        provider: impl Into<String>,
        provider_user_id: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            provider_user_id: provider_user_id.into(),
            email: email.into(),
        }
    }
}

impl Display for ProviderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.provider_user_id)
    }
}

/// User account.
///
/// `login`, a non-empty `email`, a non-empty `phone_number` and the
/// `(provider, provider_user_id)` pair each identify at most one user; the
/// store enforces this with unique indexes. Empty strings mean "absent" for
/// `email` and `phone_number`.
///
/// The serialized form is the cache representation and includes the password
/// hash. API responses go through a separate DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    /// PHC-formatted hash; `None` for provider-created accounts.
    pub password_hash: Option<String>,
    pub provider: Option<String>,
    pub provider_user_id: Option<String>,
    pub co2: Option<f64>,
    /// Last session token issued to this user.
    pub auth_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Width of the `login` column.
    pub const MAX_LOGIN_LENGTH: usize = 64;

    /// Creates a directly registered user.
    #[must_use]
    pub fn new(login: String, email: String, phone_number: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            login,
            email,
            phone_number,
            password_hash: Some(password_hash),
            provider: None,
            provider_user_id: None,
            co2: None,
            auth_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a provider account with no password and no phone number.
    ///
    /// The login is derived as `<provider>_<provider_user_id>`.
    #[must_use]
    pub fn from_provider(identity: &ProviderIdentity) -> Self {
        let now = Utc::now();
        let id = UserId::new();
        Self {
            id,
            login: Self::provider_login(&identity.provider, &identity.provider_user_id, id),
            email: identity.email.clone(),
            phone_number: String::new(),
            password_hash: None,
            provider: Some(identity.provider.clone()),
            provider_user_id: Some(identity.provider_user_id.clone()),
            co2: None,
            auth_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Login assigned to an account created from a provider identity.
    ///
    /// `<provider>:<provider_user_id>`. Registration rejects `:` in logins, so
    /// these can never be claimed by a direct sign-up. When the result would
    /// not fit the login column, the provider user id is replaced by the
    /// account id.
    #[must_use]
    pub fn provider_login(provider: &str, provider_user_id: &str, id: UserId) -> String {
        let login = format!("{provider}:{provider_user_id}");
        if login.len() <= Self::MAX_LOGIN_LENGTH {
            return login;
        }
        let mut login = format!("{provider}:{}", id.into_inner().simple());
        if login.len() > Self::MAX_LOGIN_LENGTH {
            // 32 hex digits plus `:` leave 31 bytes of provider name.
            let provider: String = provider.chars().filter(char::is_ascii).take(31).collect();
            login = format!("{provider}:{}", id.into_inner().simple());
        }
        login
    }

    #[must_use]
    pub fn has_email(&self) -> bool {
        !self.email.is_empty()
    }

    #[must_use]
    pub fn has_phone_number(&self) -> bool {
        !self.phone_number.is_empty()
    }

    pub fn set_email(&mut self, email: String) {
        self.email = email;
        self.updated_at = Utc::now();
    }

    pub fn set_phone_number(&mut self, phone_number: String) {
        self.phone_number = phone_number;
        self.updated_at = Utc::now();
    }

    pub fn set_co2(&mut self, co2: f64) {
        self.co2 = Some(co2);
        self.updated_at = Utc::now();
    }

    pub fn set_auth_token(&mut self, token: String) {
        self.auth_token = Some(token);
        self.updated_at = Utc::now();
    }
}
