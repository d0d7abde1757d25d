//! JWT token provider for issuing and validating session tokens.

use super::Claims;
use chrono::{Duration, Utc};
use ecomind_config::SecurityConfig;
use ecomind_core::{EcoMindError, EcoMindResult, UserId};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{debug, warn};

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWS.
    pub token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
    /// Expiration timestamp.
    pub expires_at: i64,
}

/// HS256 session token provider.
#[derive(Clone)]
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: Arc<SecurityConfig>,
    validation: Validation,
}

impl TokenProvider {
    /// Creates a new token provider.
    #[must_use]
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_audience(&[&config.jwt_audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self {
            encoding_key,
            decoding_key,
            config,
            validation,
        }
    }

    /// Issues a session token for a user.
    pub fn issue(&self, user_id: UserId, login: &str) -> EcoMindResult<IssuedToken> {
        let expires_in = self.config.jwt_expiration_secs;
        let expires_at = i64::try_from(expires_in)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                EcoMindError::Configuration(format!(
                    "jwt_expiration_secs {expires_in} is out of range"
                ))
            })?;

        let claims = Claims::new(
            user_id,
            login.to_string(),
            self.config.jwt_issuer.clone(),
            self.config.jwt_audience.clone(),
            expires_at,
        );

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| EcoMindError::Internal(format!("Failed to sign token: {}", e)))?;

        debug!("Issued session token for user {}", user_id);
        Ok(IssuedToken {
            token,
            expires_in,
            expires_at: claims.exp,
        })
    }

    /// Validates a token and returns the claims.
    pub fn validate_token(&self, token: &str) -> EcoMindResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                warn!("Token validation failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => EcoMindError::TokenExpired,
                    ErrorKind::InvalidToken | ErrorKind::InvalidSignature => {
                        EcoMindError::InvalidToken("Invalid token signature".to_string())
                    }
                    ErrorKind::InvalidIssuer => {
                        EcoMindError::InvalidToken("Invalid token issuer".to_string())
                    }
                    ErrorKind::InvalidAudience => {
                        EcoMindError::InvalidToken("Invalid token audience".to_string())
                    }
                    ErrorKind::ImmatureSignature => {
                        EcoMindError::InvalidToken("Token not yet valid".to_string())
                    }
                    _ => EcoMindError::InvalidToken(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        if claims.user_id().is_none() {
            return Err(EcoMindError::InvalidToken("Token subject is not a user".to_string()));
        }
        Ok(claims)
    }

    /// Token lifetime in seconds.
    #[must_use]
    pub fn expiration_secs(&self) -> u64 {
        self.config.jwt_expiration_secs
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("issuer", &self.config.jwt_issuer)
            .field("audience", &self.config.jwt_audience)
            .finish_non_exhaustive()
    }
}
