//! Password hashing using Argon2id.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use ecomind_config::SecurityConfig;
use ecomind_core::{EcoMindError, EcoMindResult};
use std::sync::Arc;
use tracing::debug;

/// Memory cost in KiB (19 MiB, the OWASP minimum for Argon2id).
const MEMORY_COST_KIB: u32 = 19 * 1024;

/// Interface for password hashing operations.
///
/// Hashing is CPU-bound; async callers run it on a blocking thread.
pub trait PasswordHasherInterface: Send + Sync {
    /// Hashes a password with a fresh random salt into PHC format.
    fn hash(&self, password: &str) -> EcoMindResult<String>;

    /// Verifies a password against a PHC hash in constant time.
    ///
    /// Returns `Ok(false)` on mismatch and `Err` only for malformed hashes.
    fn verify(&self, password: &str, hash: &str) -> EcoMindResult<bool>;

    /// Checks if a hash was produced with different parameters.
    fn needs_rehash(&self, hash: &str) -> bool;
}

/// Argon2id password hasher.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Arc<Argon2<'static>>,
    time_cost: u32,
}

impl PasswordHasher {
    /// Creates a hasher with the default time cost.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cost(Params::DEFAULT_T_COST)
    }

    /// Creates a hasher with `time_cost` iterations.
    ///
    /// Out-of-range costs fall back to the Argon2 defaults.
    #[must_use]
    pub fn with_cost(time_cost: u32) -> Self {
        let params = Params::new(MEMORY_COST_KIB, time_cost, 1, None).unwrap_or_default();
        let time_cost = params.t_cost();
        Self {
            argon2: Arc::new(Argon2::new(Algorithm::Argon2id, Version::V0x13, params)),
            time_cost,
        }
    }

    /// Creates a hasher from the security configuration.
    #[must_use]
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::with_cost(config.password_hash_cost)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherInterface for PasswordHasher {
    fn hash(&self, password: &str) -> EcoMindResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| EcoMindError::Internal(format!("Failed to hash password: {}", e)))?;

        debug!("Password hashed successfully");
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> EcoMindResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| EcoMindError::Internal(format!("Invalid password hash format: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed: incorrect password");
                Ok(false)
            }
            Err(e) => Err(EcoMindError::Internal(format!(
                "Password verification error: {}",
                e
            ))),
        }
    }

    fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };
        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }
        parsed.params.get_decimal("t") != Some(self.time_cost)
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("time_cost", &self.time_cost)
            .finish_non_exhaustive()
    }
}
