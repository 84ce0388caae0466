//! Monitor configuration, built once at startup and passed by reference.

use std::time::Duration;

use subctl_store::RedisConfig;

use crate::codec::EntryPolicy;

/// Default watch interval.
pub const DEFAULT_REFRESH: Duration = Duration::from_secs(5);

/// Default liveness threshold, in minutes.
pub const DEFAULT_MAX_AGE_MINUTES: i64 = 10;

/// Largest accepted liveness threshold, in minutes (one hundred years).
pub const MAX_AGE_LIMIT_MINUTES: i64 = 525_600 * 100;

/// Default number of event-log entries read for inspection.
pub const DEFAULT_RECENT_EVENTS: usize = 50;

/// Everything the monitor components need to know.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Where the agent store lives.
    pub store: RedisConfig,
    /// Sleep between watch cycles.
    pub refresh: Duration,
    /// Agents older than this are not active.
    pub max_age: chrono::Duration,
    /// Treatment of malformed agent entries.
    pub entry_policy: EntryPolicy,
    /// Event-log entries read per inspection.
    pub recent_events: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            store: RedisConfig::default(),
            refresh: DEFAULT_REFRESH,
            max_age: chrono::Duration::minutes(DEFAULT_MAX_AGE_MINUTES),
            entry_policy: EntryPolicy::default(),
            recent_events: DEFAULT_RECENT_EVENTS,
        }
    }
}

impl MonitorConfig {
    pub fn with_store(mut self, store: RedisConfig) -> Self {
        self.store = store;
        self
    }

    pub fn with_refresh(mut self, refresh: Duration) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_max_age(mut self, max_age: chrono::Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_entry_policy(mut self, policy: EntryPolicy) -> Self {
        self.entry_policy = policy;
        self
    }

    pub fn with_recent_events(mut self, limit: usize) -> Self {
        self.recent_events = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.store.endpoint(), "localhost:6379");
        assert_eq!(config.refresh, Duration::from_secs(5));
        assert_eq!(config.max_age, chrono::Duration::minutes(10));
        assert_eq!(config.entry_policy, EntryPolicy::Skip);
    }

    #[test]
    fn test_builders() {
        let config = MonitorConfig::default()
            .with_store(RedisConfig::new("redis.local", 6380))
            .with_refresh(Duration::from_secs(1))
            .with_max_age(chrono::Duration::minutes(2))
            .with_entry_policy(EntryPolicy::Reject)
            .with_recent_events(5);
        assert_eq!(config.store.port, 6380);
        assert_eq!(config.refresh, Duration::from_secs(1));
        assert_eq!(config.max_age, chrono::Duration::minutes(2));
        assert_eq!(config.entry_policy, EntryPolicy::Reject);
        assert_eq!(config.recent_events, 5);
    }
}
