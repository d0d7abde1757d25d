//! # EcoMind Security
//!
//! Password hashing, signed session tokens and third-party identity
//! providers.

pub mod jwt;
pub mod oauth;
pub mod password;

pub use jwt::*;
pub use oauth::*;
pub use password::*;
