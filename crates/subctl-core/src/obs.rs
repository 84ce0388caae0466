//! Structured diagnostics for the fetch, record and watch paths.
//!
//! This module provides:
//! - A watch-scoped tracing span via `watch_span`
//! - One emission function per diagnostic, each a single event with a
//!   stable `event` field
//!
//! Degraded outcomes (store down, malformed data, failed writes) are warnings;
//! routine progress is debug. Output format is chosen by `init_tracing`.

use std::time::Duration;

use tracing::{debug, info, warn};

/// Span covering one watch loop, tagged with its settings.
///
/// Attach it with `tracing::Instrument` so the loop future stays `Send`.
///
/// # Example
///
/// ```ignore
/// watch_loop().instrument(watch_span(Duration::from_secs(5), false)).await
/// ```
pub fn watch_span(refresh: Duration, include_stale: bool) -> tracing::Span {
    tracing::info_span!(
        "subctl.watch",
        refresh_secs = refresh.as_secs(),
        stale = include_stale
    )
}

/// Emit event: a fetch degraded to an empty result.
pub fn emit_fetch_failed(key: &str, endpoint: &str, error: &dyn std::fmt::Display) {
    warn!(event = "fetch.failed", key = %key, endpoint = %endpoint, error = %error);
}

/// Emit event: a fetch returned data.
pub fn emit_fetch_completed(key: &str, entries: usize, skipped: usize) {
    debug!(event = "fetch.completed", key = %key, entries = entries, skipped = skipped);
}

/// Emit event: a malformed entry was dropped from a decoded result.
pub fn emit_entry_skipped(key: &str, label: &str, reason: &dyn std::fmt::Display) {
    warn!(event = "decode.entry_skipped", key = %key, label = %label, reason = %reason);
}

/// Emit event: an agent event was appended to its log.
pub fn emit_event_recorded(label: &str, event_type: &str, list_len: u64) {
    debug!(
        event = "event.recorded",
        label = %label,
        event_type = %event_type,
        list_len = list_len,
    );
}

/// Emit event: appending an agent event failed (warning level).
pub fn emit_record_failed(label: &str, error: &dyn std::fmt::Display) {
    warn!(event = "event.record_failed", label = %label, error = %error);
}

/// Emit event: the event was appended but its expiry was not refreshed.
pub fn emit_expiry_failed(label: &str, error: &dyn std::fmt::Display) {
    warn!(event = "event.expiry_failed", label = %label, error = %error);
}

/// Emit event: one watch cycle rendered.
pub fn emit_watch_cycle(cycle: u64, agents: usize) {
    debug!(event = "watch.cycle", cycle = cycle, agents = agents);
}

/// Emit event: the watch loop stopped on request.
pub fn emit_watch_stopped(cycles: u64) {
    info!(event = "watch.stopped", cycles = cycles);
}
