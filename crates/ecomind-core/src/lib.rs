//! # EcoMind Core
//!
//! Core types and error definitions for the EcoMind accounts backend.
//! Every other crate in the workspace builds on the `User` entity, the
//! typed identifiers and the unified `EcoMindError` defined here.

pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;
pub use validation::*;
