//! DAO (Data Access Object) layer.
//!
//! DAOs provide low-level, single-source data access. They report absence
//! as `Ok(None)` and leave caching and not-found semantics to the store.

pub mod r#impl;
pub mod user_dao;

pub use r#impl::MySqlUserDaoImpl;
pub use user_dao::UserDao;
