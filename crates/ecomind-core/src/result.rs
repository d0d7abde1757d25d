//! Result type aliases for EcoMind.

use crate::EcoMindError;

/// A specialized `Result` type for EcoMind operations.
pub type EcoMindResult<T> = Result<T, EcoMindError>;
