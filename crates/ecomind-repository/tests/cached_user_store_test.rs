//! Behavioural tests for `CachedUserStore` over an in-memory DAO and a
//! cache whose failures can be scripted.

mod common;

use common::{registered, FakeUserDao, FlakyCache};
use ecomind_config::CacheFailurePolicy;
use ecomind_core::{EcoMindError, ProviderIdentity, User, UserId};
use ecomind_repository::cache::cache_keys;
use ecomind_repository::{
    CacheInterface, CachedUserStore, MemoryCacheService, RedisCacheService, UserStore,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::Span;

struct Fixture {
    dao: Arc<FakeUserDao>,
    cache: Arc<FlakyCache>,
    store: CachedUserStore,
}

fn fixture(policy: CacheFailurePolicy) -> Fixture {
    let dao = Arc::new(FakeUserDao::new());
    let cache = Arc::new(FlakyCache::new());
    let store = CachedUserStore::new(dao.clone(), cache.clone(), Span::none())
        .with_failure_policy(policy);
    Fixture { dao, cache, store }
}

fn alice() -> User {
    registered("alice", "a@x.com", "+1000")
}

#[tokio::test]
async fn test_create_then_read_by_every_field_returns_same_user() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    let created = f.store.create(&alice()).await.unwrap();

    let by_login = f.store.get_by_login("alice").await.unwrap();
    let by_email = f.store.get_by_email("a@x.com").await.unwrap();
    let by_phone = f.store.get_by_phone_number("+1000").await.unwrap();
    let by_id = f.store.get_by_id(created.id).await.unwrap();

    assert_eq!(by_login, created);
    assert_eq!(by_email.id, created.id);
    assert_eq!(by_phone.id, created.id);
    assert_eq!(by_id.id, created.id);
}

#[tokio::test]
async fn test_second_read_is_served_from_cache() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    f.store.create(&alice()).await.unwrap();

    f.store.get_by_login("alice").await.unwrap();
    let reads_after_miss = f.dao.reads();
    let hit = f.store.get_by_login("alice").await.unwrap();

    assert_eq!(f.dao.reads(), reads_after_miss);
    assert_eq!(hit.login, "alice");
    assert!(f.cache.peek(&cache_keys::user_by_login("alice")).await.is_some());
}

#[tokio::test]
async fn test_login_lookup_shares_key_across_case() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    f.store.create(&alice()).await.unwrap();

    f.store.get_by_login("Alice").await.unwrap();
    let reads = f.dao.reads();
    f.store.get_by_login("ALICE").await.unwrap();

    assert_eq!(f.dao.reads(), reads);
}

#[tokio::test]
async fn test_collation_alias_is_not_cached_and_sees_writes() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    let created = f.store.create(&alice()).await.unwrap();

    let by_alias = f.store.get_by_login("alice ").await.unwrap();
    assert_eq!(by_alias.id, created.id);
    assert!(f.cache.peek(&cache_keys::user_by_login("alice ")).await.is_none());

    let by_email_alias = f.store.get_by_email("a@x.com  ").await.unwrap();
    assert_eq!(by_email_alias.id, created.id);
    assert!(f.cache.peek(&cache_keys::user_by_email("a@x.com  ")).await.is_none());

    f.store.update_auth_token(created.id, "t2").await.unwrap();

    let refreshed = f.store.get_by_login("alice ").await.unwrap();
    assert_eq!(refreshed.auth_token.as_deref(), Some("t2"));
}

#[tokio::test]
async fn test_duplicate_login_is_rejected_without_insert() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    f.store.create(&alice()).await.unwrap();

    let err = f
        .store
        .create(&registered("alice", "other@x.com", "+2000"))
        .await
        .unwrap_err();

    assert!(matches!(err, EcoMindError::AlreadyExists(_)));
    assert_eq!(f.dao.inserts.load(Ordering::SeqCst), 1);
    assert!(f.store.get_by_email("other@x.com").await.is_err());
}

#[tokio::test]
async fn test_duplicate_email_or_phone_is_rejected() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    f.store.create(&alice()).await.unwrap();

    let same_email = f.store.create(&registered("bob", "a@x.com", "+2000")).await;
    let same_phone = f.store.create(&registered("carol", "c@x.com", "+1000")).await;

    assert!(matches!(same_email, Err(EcoMindError::AlreadyExists(_))));
    assert!(matches!(same_phone, Err(EcoMindError::AlreadyExists(_))));
}

#[tokio::test]
async fn test_insert_race_surfaces_store_unique_violation() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    f.store.create(&alice()).await.unwrap();
    f.dao.skip_existence_check.store(true, Ordering::SeqCst);

    let err = f
        .store
        .create(&registered("alice", "late@x.com", "+9999"))
        .await
        .unwrap_err();

    assert!(matches!(err, EcoMindError::AlreadyExists(_)));
    let winner = f.store.get_by_login("alice").await.unwrap();
    assert_eq!(winner.email, "a@x.com");
}

#[tokio::test]
async fn test_create_evicts_previously_cached_entries() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    let stale = registered("alice", "stale@x.com", "+0000");
    f.cache
        .put(
            &cache_keys::user_by_login("alice"),
            &serde_json::to_string(&stale).unwrap(),
        )
        .await;

    let created = f.store.create(&alice()).await.unwrap();
    let read = f.store.get_by_login("alice").await.unwrap();

    assert_eq!(read.id, created.id);
    assert_eq!(read.email, "a@x.com");
}

#[tokio::test]
async fn test_missing_user_is_not_cached() {
    let f = fixture(CacheFailurePolicy::FailClosed);

    let err = f.store.get_by_login("ghost").await.unwrap_err();
    assert!(matches!(err, EcoMindError::NotFound { .. }));
    assert!(f.cache.peek(&cache_keys::user_by_login("ghost")).await.is_none());

    // A later registration is visible immediately.
    f.store.create(&registered("ghost", "", "")).await.unwrap();
    assert_eq!(f.store.get_by_login("ghost").await.unwrap().login, "ghost");
}

#[tokio::test]
async fn test_not_found_reports_lookup_field() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    let err = f.store.get_by_phone_number("+404").await.unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert!(err.to_string().contains("+404"));
}

#[tokio::test]
async fn test_undecodable_entry_is_treated_as_miss_and_replaced() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    let created = f.store.create(&alice()).await.unwrap();
    let key = cache_keys::user_by_id(created.id);
    f.cache.put(&key, "{\"not\":\"a user\"").await;

    let read = f.store.get_by_id(created.id).await.unwrap();

    assert_eq!(read.id, created.id);
    let repaired: User = serde_json::from_str(&f.cache.peek(&key).await.unwrap()).unwrap();
    assert_eq!(repaired.id, created.id);
}

#[tokio::test]
async fn test_cache_read_failure_fails_closed_by_default() {
    let f = fixture(CacheFailurePolicy::default());
    f.store.create(&alice()).await.unwrap();
    f.cache.fail_reads.store(true, Ordering::SeqCst);
    let reads = f.dao.reads();

    let err = f.store.get_by_login("alice").await.unwrap_err();

    assert!(matches!(err, EcoMindError::Cache(_)));
    assert_eq!(err.status_code(), 500);
    assert_eq!(f.dao.reads(), reads);
}

#[tokio::test]
async fn test_cache_read_failure_fails_open_when_configured() {
    let f = fixture(CacheFailurePolicy::FailOpen);
    let created = f.store.create(&alice()).await.unwrap();
    f.cache.fail_reads.store(true, Ordering::SeqCst);

    let read = f.store.get_by_login("alice").await.unwrap();

    assert_eq!(read.id, created.id);
}

#[tokio::test]
async fn test_cache_write_failures_do_not_fail_operations() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    f.cache.fail_writes.store(true, Ordering::SeqCst);
    f.cache.fail_deletes.store(true, Ordering::SeqCst);

    let created = f.store.create(&alice()).await.unwrap();
    let read = f.store.get_by_id(created.id).await.unwrap();

    assert_eq!(read.login, "alice");
    assert!(f.cache.peek(&cache_keys::user_by_id(created.id)).await.is_none());
}

#[tokio::test]
async fn test_store_failure_is_reported_as_database_error() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    f.dao.set_unavailable(true);

    let read = f.store.get_by_login("alice").await.unwrap_err();
    let write = f.store.create(&alice()).await.unwrap_err();

    assert!(matches!(read, EcoMindError::Database(_)));
    assert!(matches!(write, EcoMindError::Database(_)));
    assert_eq!(write.public_message(), "An internal error occurred");
}

#[tokio::test]
async fn test_update_evicts_old_and_new_keys() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    let created = f.store.create(&alice()).await.unwrap();
    // Warm every key.
    f.store.get_by_email("a@x.com").await.unwrap();
    f.store.get_by_phone_number("+1000").await.unwrap();
    f.store.get_by_id(created.id).await.unwrap();

    let mut changed = created.clone();
    changed.set_email("new@x.com".to_string());
    changed.set_co2(7.5);
    f.store.update(&changed).await.unwrap();

    assert!(matches!(
        f.store.get_by_email("a@x.com").await,
        Err(EcoMindError::NotFound { .. })
    ));
    let by_new_email = f.store.get_by_email("new@x.com").await.unwrap();
    assert_eq!(by_new_email.id, created.id);
    assert_eq!(f.store.get_by_phone_number("+1000").await.unwrap().co2, Some(7.5));
    assert_eq!(f.store.get_by_id(created.id).await.unwrap().email, "new@x.com");
}

#[tokio::test]
async fn test_update_rejects_login_change() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    let created = f.store.create(&alice()).await.unwrap();

    let mut renamed = created.clone();
    renamed.login = "alicia".to_string();
    let err = f.store.update(&renamed).await.unwrap_err();

    assert!(matches!(err, EcoMindError::Validation(_)));
    assert_eq!(f.store.get_by_id(created.id).await.unwrap().login, "alice");
}

#[tokio::test]
async fn test_update_of_unknown_user_is_not_found() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    let err = f.store.update(&alice()).await.unwrap_err();
    assert!(matches!(err, EcoMindError::NotFound { .. }));
}

#[tokio::test]
async fn test_update_auth_token_refreshes_every_cached_view() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    let created = f.store.create(&alice()).await.unwrap();
    f.store.get_by_id(created.id).await.unwrap();
    f.store.get_by_login("alice").await.unwrap();

    f.store.update_auth_token(created.id, "tok-1").await.unwrap();

    let by_id = f.store.get_by_id(created.id).await.unwrap();
    let by_login = f.store.get_by_login("alice").await.unwrap();
    assert_eq!(by_id.auth_token.as_deref(), Some("tok-1"));
    assert_eq!(by_login.auth_token.as_deref(), Some("tok-1"));
    assert_eq!(by_id.email, created.email);
    assert_eq!(by_id.password_hash, created.password_hash);
}

#[tokio::test]
async fn test_update_auth_token_for_unknown_user_is_not_found() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    let err = f
        .store
        .update_auth_token(UserId::new(), "tok")
        .await
        .unwrap_err();
    assert!(matches!(err, EcoMindError::NotFound { .. }));
}

#[tokio::test]
async fn test_provider_account_lookup() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    let identity = ProviderIdentity::new("google", "g123", "g@x.com");
    let created = f.store.create(&User::from_provider(&identity)).await.unwrap();

    let found = f.store.get_by_provider("google", "g123").await.unwrap();
    let by_login = f.store.get_by_login("google:g123").await.unwrap();

    assert_eq!(found.id, created.id);
    assert_eq!(by_login.id, created.id);
    assert!(matches!(
        f.store.get_by_provider("tiktok", "g123").await,
        Err(EcoMindError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_users_without_email_do_not_collide() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    f.store.create(&registered("one", "", "")).await.unwrap();
    f.store.create(&registered("two", "", "")).await.unwrap();

    assert!(f.store.get_by_email("").await.is_err());
    assert_eq!(f.store.get_by_login("two").await.unwrap().login, "two");
}

/// Runs the same scenario against a store and returns observable outcomes.
async fn scenario(store: &dyn UserStore) -> Vec<String> {
    let mut outcomes = Vec::new();
    let created = store.create(&alice()).await.unwrap();
    outcomes.push(format!("{:?}", store.create(&alice()).await.map(|u| u.login)));
    outcomes.push(store.get_by_login("alice").await.unwrap().email);
    outcomes.push(format!("{:?}", store.get_by_email("b@x.com").await.is_err()));

    let mut changed = created.clone();
    changed.set_phone_number("+3000".to_string());
    store.update(&changed).await.unwrap();
    outcomes.push(format!("{:?}", store.get_by_phone_number("+1000").await.is_err()));
    outcomes.push(store.get_by_phone_number("+3000").await.unwrap().login);

    store.update_auth_token(created.id, "tok").await.unwrap();
    outcomes.push(format!("{:?}", store.get_by_id(created.id).await.unwrap().auth_token));
    outcomes
}

#[tokio::test]
async fn test_disabled_cache_behaves_like_enabled_cache() {
    let with_cache = CachedUserStore::new(
        Arc::new(FakeUserDao::new()),
        Arc::new(MemoryCacheService::new()),
        Span::none(),
    );
    let without_cache = CachedUserStore::new(
        Arc::new(FakeUserDao::new()),
        Arc::new(RedisCacheService::disabled()),
        Span::none(),
    );

    let cached = scenario(&with_cache).await;
    let uncached = scenario(&without_cache).await;

    assert_eq!(cached, uncached);
    assert!(!RedisCacheService::disabled().is_enabled());
}

#[tokio::test]
async fn test_health_check_follows_store() {
    let f = fixture(CacheFailurePolicy::FailClosed);
    assert!(f.store.health_check().await.is_ok());
    f.dao.set_unavailable(true);
    assert!(f.store.health_check().await.is_err());
}
