//! Agent event log entries.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::timestamp::iso8601;

/// One entry in an agent's append-only event log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentEvent {
    /// Session that produced the event.
    pub session_key: String,

    /// Open-ended event kind (e.g. "tool_call", "ticket_assigned").
    pub event_type: String,

    /// When the event happened.
    #[serde(with = "iso8601")]
    pub timestamp: DateTime<Utc>,

    /// Producer-defined payload.
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,

    /// Producer-supplied integrity tag over the event content. Not verified here.
    #[serde(default)]
    pub cryptographic_hash: String,
}

impl AgentEvent {
    /// Create an event stamped with the current time and a SHA-256 content tag.
    pub fn new(
        session_key: impl Into<String>,
        event_type: impl Into<String>,
        data: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self::at(session_key, event_type, Utc::now(), data)
    }

    /// Create an event with an explicit timestamp.
    pub fn at(
        session_key: impl Into<String>,
        event_type: impl Into<String>,
        timestamp: DateTime<Utc>,
        data: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let mut event = Self {
            session_key: session_key.into(),
            event_type: event_type.into(),
            timestamp,
            data,
            cryptographic_hash: String::new(),
        };
        event.cryptographic_hash = event.content_digest();
        event
    }

    /// SHA-256 hex digest of the event content (everything except the tag).
    ///
    /// Object keys are sorted so the digest does not depend on insertion order.
    pub fn content_digest(&self) -> String {
        let content = serde_json::json!({
            "data": sorted(&serde_json::Value::Object(self.data.clone())),
            "event_type": self.event_type,
            "session_key": self.session_key,
            "timestamp": self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        });
        let mut hasher = Sha256::new();
        hasher.update(content.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn sorted(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();
            let mut out = serde_json::Map::new();
            for key in keys {
                out.insert(key.clone(), sorted(&map[key]));
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(sorted).collect())
        }
        other => other.clone(),
    }
}
