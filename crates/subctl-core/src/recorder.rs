//! Event recorder: appends agent events to their sliding-expiry log.
//!
//! Each append pushes onto the head of `subctl:events:{label}` and then
//! resets the list's expiry, so the whole log lapses after an hour without
//! appends. The two store calls are independent; a failure between them
//! leaves the list with its previous expiry.

use std::sync::Arc;
use std::time::Duration;

use subctl_store::{events_key, AgentStore, StoreError, EVENT_LOG_TTL};

use crate::codec::encode_event;
use crate::domain::AgentEvent;
use crate::obs;

/// What happened to one append.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// Appended and expiry refreshed; `list_len` is the log length after the push.
    Recorded { list_len: u64 },
    /// Appended, but the expiry could not be refreshed.
    ExpiryNotRefreshed { list_len: u64, error: StoreError },
    /// Nothing was written.
    Failed { error: String },
}

impl RecordOutcome {
    /// Whether the event reached the log.
    pub fn is_written(&self) -> bool {
        !matches!(self, RecordOutcome::Failed { .. })
    }
}

/// Write path for agent event logs.
#[derive(Clone)]
pub struct EventRecorder {
    store: Arc<dyn AgentStore>,
    ttl: Duration,
}

impl EventRecorder {
    pub fn new(store: Arc<dyn AgentStore>) -> Self {
        Self {
            store,
            ttl: EVENT_LOG_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Append `event` to the log for `label`.
    ///
    /// Never fails: store and encoding errors are reported as diagnostics
    /// and through the returned outcome.
    pub async fn record(&self, label: &str, event: &AgentEvent) -> RecordOutcome {
        let payload = match encode_event(event) {
            Ok(payload) => payload,
            Err(err) => {
                obs::emit_record_failed(label, &err);
                return RecordOutcome::Failed {
                    error: err.to_string(),
                };
            }
        };

        let key = events_key(label);
        let list_len = match self.store.lpush(&key, &payload).await {
            Ok(len) => len,
            Err(err) => {
                obs::emit_record_failed(label, &err);
                return RecordOutcome::Failed {
                    error: err.to_string(),
                };
            }
        };

        match self.store.expire(&key, self.ttl).await {
            Ok(_) => {
                obs::emit_event_recorded(label, &event.event_type, list_len);
                RecordOutcome::Recorded { list_len }
            }
            Err(error) => {
                obs::emit_expiry_failed(label, &error);
                RecordOutcome::ExpiryNotRefreshed { list_len, error }
            }
        }
    }
}
