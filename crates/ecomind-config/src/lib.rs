//! # EcoMind Config
//!
//! Configuration management for the EcoMind backend.
//! Configuration is layered from TOML files and `ECOMIND__` environment
//! variables, then validated before any component is built from it.

mod app_config;
mod loader;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
