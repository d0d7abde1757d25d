//! Cache adapters.
//!
//! The cache is a latency optimization and never the source of truth:
//! a miss (`Ok(None)`) and a backend failure (`Err(Cache)`) are distinct so
//! callers can apply their failure policy.

mod cache_interface;
pub mod cache_keys;
mod memory_cache;
mod redis_cache;

pub use cache_interface::{CacheExt, CacheInterface};
pub use memory_cache::MemoryCacheService;
pub use redis_cache::{create_redis_pool, RedisCacheService, DEFAULT_TTL};
