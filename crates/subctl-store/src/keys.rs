//! Store key layout.
//!
//! These names are shared with external producers and must not change.

use std::time::Duration;

/// Single JSON mapping of label -> agent fields, replaced wholesale by producers.
pub const AGENTS_KEY: &str = "subctl:agents";

/// Prefix of the per-agent event lists (most recent first).
pub const EVENTS_KEY_PREFIX: &str = "subctl:events:";

/// Expiry (re)set on an event list after every append.
pub const EVENT_LOG_TTL: Duration = Duration::from_secs(3600);

/// Key of the event list for one agent label.
pub fn events_key(label: &str) -> String {
    format!("{EVENTS_KEY_PREFIX}{label}")
}
