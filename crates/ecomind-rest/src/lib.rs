//! # EcoMind REST
//!
//! REST API layer using Axum for the EcoMind backend.
//! Provides HTTP endpoints for account management, password and provider
//! sign-in, and health probes.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
