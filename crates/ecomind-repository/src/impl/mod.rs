//! `UserStore` implementations.

mod cached_user_store;
mod in_memory_user_store;

pub use cached_user_store::CachedUserStore;
pub use in_memory_user_store::InMemoryUserStore;

use ecomind_core::{EcoMindError, EcoMindResult, User};

/// Rejects updates that would change a field fixed at creation.
pub(crate) fn ensure_immutable_fields(previous: &User, next: &User) -> EcoMindResult<()> {
    if previous.login != next.login {
        return Err(EcoMindError::validation("login cannot be changed"));
    }
    if previous.provider != next.provider || previous.provider_user_id != next.provider_user_id {
        return Err(EcoMindError::validation("provider identity cannot be changed"));
    }
    Ok(())
}
