//! SubCtl Store: key-value boundary for the agent monitor
//!
//! Agent producers publish their live state into a shared key-value store.
//! This crate owns every byte that crosses that boundary: the key layout,
//! the async store trait, a Redis-backed client and an in-memory fake.
//!
//! ## Key Components
//!
//! - `AgentStore`: the narrow set of store operations the monitor uses
//! - `RedisStore` / `RedisConfig`: networked implementation
//! - `fakes::MemoryStore`: in-process implementation honouring TTLs
//! - `keys`: the wire-compatible key layout (`subctl:agents`, `subctl:events:{label}`)

mod error;
pub mod fakes;
pub mod keys;
mod redis_store;
pub mod storage_traits;

pub use error::StoreError;
pub use keys::{events_key, AGENTS_KEY, EVENTS_KEY_PREFIX, EVENT_LOG_TTL};
pub use redis_store::{RedisConfig, RedisStore};
pub use storage_traits::{AgentStore, StoreResult};
