//! # EcoMind Repository
//!
//! User storage behind one capability, [`UserStore`], with two variants
//! chosen at startup:
//!
//! ```text
//! Service
//!   ↓  Arc<dyn UserStore>
//! CachedUserStore                 InMemoryUserStore
//!   ↓ Arc<dyn CacheInterface>       (process-local, no cache)
//!   ↓ Arc<dyn UserDao>
//! RedisCacheService / MemoryCacheService
//! MySqlUserDaoImpl → MySQL
//! ```
//!
//! ## Structure
//!
//! ```text
//! src/
//!   traits.rs                    ← UserStore trait
//!   impl/
//!     cached_user_store.rs       ← cache-aside over DAO + cache
//!     in_memory_user_store.rs    ← map with uniqueness indexes
//!   dao/
//!     user_dao.rs                ← UserDao trait
//!     impl/mysql/
//!       user_dao_impl.rs         ← MySqlUserDaoImpl
//!   cache/
//!     cache_interface.rs         ← CacheInterface + CacheExt
//!     cache_keys.rs              ← versioned key scheme
//!     redis_cache.rs / memory_cache.rs
//! ```

pub mod cache;
pub mod dao;
pub mod pool;
pub mod traits;
pub mod r#impl;

pub use cache::{CacheExt, CacheInterface, MemoryCacheService, RedisCacheService};
pub use dao::{MySqlUserDaoImpl, UserDao};
pub use pool::*;
pub use r#impl::{CachedUserStore, InMemoryUserStore};
pub use traits::*;
