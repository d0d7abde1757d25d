//! # EcoMind Server Library
//!
//! Wires configuration, storage, security and services into the HTTP
//! application, and sets up logging.

pub mod app;
pub mod logging;
pub mod startup;
