//! # EcoMind Service
//!
//! Business logic service layer for EcoMind: request preconditions,
//! password handling and session issuance on top of a `UserStore`.

pub mod auth_service;
pub mod dto;
pub mod r#impl;
pub mod user_service;

pub use auth_service::*;
pub use dto::*;
pub use r#impl::UserServiceImpl;
pub use user_service::*;
