//! Storage trait definition for SubCtl
//!
//! `AgentStore` covers the handful of key-value operations the monitor and
//! event producers need:
//! - plain string values (`get` / `set`) for the agent snapshot blob
//! - lists (`lpush` / `lrange`) for per-agent event logs
//! - key expiry (`expire` / `ttl`)
//!
//! The trait is async and backend-agnostic. Semantics follow Redis: list
//! ranges are inclusive and accept negative indices counted from the tail,
//! and a list key that is pushed to after expiring starts empty.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Key-value store holding agent state.
///
/// Implementations never retry; a failed call is reported once and the
/// caller decides what degraded result to use.
#[async_trait]
pub trait AgentStore: Send + Sync {
    /// Read a string value. `None` when the key does not exist.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replace a string value.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Push a value onto the head of a list, returning the new length.
    async fn lpush(&self, key: &str, value: &str) -> StoreResult<u64>;

    /// Read list elements `start..=stop` (negative indices count from the tail).
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>>;

    /// Set a key's expiry. Returns `false` when the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool>;

    /// Remaining time to live. `None` when the key is absent or has no expiry.
    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>>;

    /// Human-readable location of the store, used in diagnostics.
    fn endpoint(&self) -> String;
}
