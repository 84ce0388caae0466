//! Trait contract tests for AgentStore.
//!
//! These tests verify the behavioral contract of the store trait using the
//! in-memory fake. Any conforming implementation must pass these.

use std::time::Duration;

use subctl_store::fakes::MemoryStore;
use subctl_store::storage_traits::*;
use subctl_store::{events_key, StoreError, AGENTS_KEY, EVENT_LOG_TTL};

// ===========================================================================
// String values
// ===========================================================================

#[tokio::test]
async fn get_missing_key_is_none() {
    let store = MemoryStore::new();
    assert_eq!(store.get(AGENTS_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn set_then_get_round_trip() {
    let store = MemoryStore::new();
    store.set(AGENTS_KEY, r#"{"a":{}}"#).await.unwrap();
    assert_eq!(
        store.get(AGENTS_KEY).await.unwrap().as_deref(),
        Some(r#"{"a":{}}"#)
    );
}

#[tokio::test]
async fn set_replaces_previous_value() {
    let store = MemoryStore::new();
    store.set(AGENTS_KEY, "first").await.unwrap();
    store.set(AGENTS_KEY, "second").await.unwrap();
    assert_eq!(store.get(AGENTS_KEY).await.unwrap().as_deref(), Some("second"));
}

// ===========================================================================
// Lists
// ===========================================================================

#[tokio::test]
async fn lpush_puts_newest_at_head() {
    let store = MemoryStore::new();
    let key = events_key("x");
    assert_eq!(store.lpush(&key, "one").await.unwrap(), 1);
    assert_eq!(store.lpush(&key, "two").await.unwrap(), 2);
    assert_eq!(store.lpush(&key, "three").await.unwrap(), 3);

    let all = store.lrange(&key, 0, -1).await.unwrap();
    assert_eq!(all, vec!["three", "two", "one"]);
}

#[tokio::test]
async fn lrange_bounds_are_inclusive() {
    let store = MemoryStore::new();
    let key = events_key("x");
    for v in ["a", "b", "c", "d"] {
        store.lpush(&key, v).await.unwrap();
    }
    assert_eq!(store.lrange(&key, 0, 1).await.unwrap(), vec!["d", "c"]);
    assert_eq!(store.lrange(&key, -1, -1).await.unwrap(), vec!["a"]);
    assert!(store.lrange(&key, 10, 20).await.unwrap().is_empty());
}

#[tokio::test]
async fn lrange_missing_key_is_empty() {
    let store = MemoryStore::new();
    assert!(store.lrange("nope", 0, -1).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_ops_on_string_key_are_wrong_type() {
    let store = MemoryStore::new();
    store.set(AGENTS_KEY, "{}").await.unwrap();
    let err = store.lpush(AGENTS_KEY, "v").await.unwrap_err();
    assert!(matches!(err, StoreError::Command(_)));
}

// ===========================================================================
// Expiry
// ===========================================================================

#[tokio::test]
async fn expire_missing_key_returns_false() {
    let store = MemoryStore::new();
    assert!(!store.expire("nope", EVENT_LOG_TTL).await.unwrap());
    assert_eq!(store.ttl("nope").await.unwrap(), None);
}

#[tokio::test]
async fn key_without_expiry_has_no_ttl() {
    let store = MemoryStore::new();
    store.lpush("k", "v").await.unwrap();
    assert_eq!(store.ttl("k").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn expired_key_disappears() {
    let store = MemoryStore::new();
    let key = events_key("x");
    store.lpush(&key, "old").await.unwrap();
    assert!(store.expire(&key, Duration::from_secs(60)).await.unwrap());

    tokio::time::advance(Duration::from_secs(59)).await;
    assert_eq!(store.lrange(&key, 0, -1).await.unwrap(), vec!["old"]);

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(store.lrange(&key, 0, -1).await.unwrap().is_empty());
    assert!(store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn push_after_expiry_starts_fresh_list() {
    let store = MemoryStore::new();
    let key = events_key("x");
    store.lpush(&key, "old").await.unwrap();
    store.expire(&key, Duration::from_secs(10)).await.unwrap();

    tokio::time::advance(Duration::from_secs(11)).await;
    assert_eq!(store.lpush(&key, "new").await.unwrap(), 1);
    assert_eq!(store.ttl(&key).await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn ttl_counts_down() {
    let store = MemoryStore::new();
    store.lpush("k", "v").await.unwrap();
    store.expire("k", EVENT_LOG_TTL).await.unwrap();

    tokio::time::advance(Duration::from_secs(100)).await;
    let ttl = store.ttl("k").await.unwrap().unwrap();
    assert_eq!(ttl, Duration::from_secs(3500));
}

// ===========================================================================
// Availability
// ===========================================================================

#[tokio::test]
async fn unavailable_store_reports_unavailable() {
    let store = MemoryStore::unavailable();
    let err = store.get(AGENTS_KEY).await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
    assert!(err.to_string().contains("memory://"));
}
