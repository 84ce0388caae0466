//! Record codec: stored JSON <-> typed agent records and events.
//!
//! Agent entries are validated field by field rather than deserialized
//! wholesale, so a single bad entry can be isolated. What happens to that
//! entry is decided by one [`EntryPolicy`] applied to the whole snapshot.
//!
//! Field rules:
//! - `session_key`, `channel`, `status`: required strings
//! - `label`: optional; defaults to the map key and must match it when present
//! - `total_tokens`: required non-negative integer
//! - `last_update`: required ISO-8601 string
//! - `assigned_tickets`: required array of strings, order kept
//! - `package_compliance`, `custom_code_ratio`: required numbers
//! - `consensus_proof`: string, null, or absent
//!
//! Unknown fields are ignored.

use serde_json::{Map, Value};

use crate::domain::{
    parse_timestamp, AgentEvent, AgentRecord, DecodeError, FieldError, Snapshot,
};

/// What to do with an agent entry that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryPolicy {
    /// Drop the entry, keep the rest of the snapshot.
    #[default]
    Skip,
    /// Fail the whole decode.
    Reject,
}

/// An entry dropped under [`EntryPolicy::Skip`].
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub label: String,
    pub reason: FieldError,
}

/// Result of decoding a snapshot blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedSnapshot {
    pub snapshot: Snapshot,
    pub skipped: Vec<SkippedEntry>,
}

/// Decode the stored agent map.
///
/// An absent or blank blob is an empty snapshot, not an error.
pub fn decode_snapshot(
    blob: Option<&str>,
    policy: EntryPolicy,
) -> Result<DecodedSnapshot, DecodeError> {
    let blob = match blob {
        Some(b) if !b.trim().is_empty() => b,
        _ => return Ok(DecodedSnapshot::default()),
    };

    let root: Value = serde_json::from_str(blob)?;
    let entries = match root {
        Value::Object(map) => map,
        other => {
            return Err(DecodeError::NotAMapping {
                found: kind_of(&other),
            })
        }
    };

    let mut decoded = DecodedSnapshot::default();
    for (label, value) in &entries {
        match decode_record(label, value) {
            Ok(record) => {
                decoded.snapshot.insert(record);
            }
            Err(reason) => match policy {
                EntryPolicy::Skip => decoded.skipped.push(SkippedEntry {
                    label: label.clone(),
                    reason,
                }),
                EntryPolicy::Reject => {
                    return Err(DecodeError::Entry {
                        label: label.clone(),
                        source: reason,
                    })
                }
            },
        }
    }
    Ok(decoded)
}

/// Build one record from its map key and field mapping.
pub fn decode_record(key: &str, value: &Value) -> Result<AgentRecord, FieldError> {
    let fields = value.as_object().ok_or(FieldError::NotAMapping)?;

    let label = match fields.get("label") {
        None | Some(Value::Null) => key.to_string(),
        Some(Value::String(label)) if label == key => label.clone(),
        Some(Value::String(label)) => {
            return Err(FieldError::LabelMismatch {
                key: key.to_string(),
                label: label.clone(),
            })
        }
        Some(_) => {
            return Err(FieldError::WrongType {
                field: "label",
                expected: "a string",
            })
        }
    };

    let last_update = parse_timestamp(required_str(fields, "last_update")?)
        .map_err(|reason| FieldError::InvalidTimestamp { reason })?;

    Ok(AgentRecord {
        session_key: required_str(fields, "session_key")?.to_string(),
        label,
        channel: required_str(fields, "channel")?.to_string(),
        total_tokens: required(fields, "total_tokens")?
            .as_u64()
            .ok_or(FieldError::WrongType {
                field: "total_tokens",
                expected: "a non-negative integer",
            })?,
        status: required_str(fields, "status")?.to_string(),
        last_update,
        assigned_tickets: tickets(fields)?,
        package_compliance: required_f64(fields, "package_compliance")?,
        custom_code_ratio: required_f64(fields, "custom_code_ratio")?,
        consensus_proof: match fields.get("consensus_proof") {
            None | Some(Value::Null) => None,
            Some(Value::String(proof)) => Some(proof.clone()),
            Some(_) => {
                return Err(FieldError::WrongType {
                    field: "consensus_proof",
                    expected: "a string or null",
                })
            }
        },
    })
}

/// Encode a snapshot in the producer format (label -> fields, store order).
pub fn encode_snapshot(snapshot: &Snapshot) -> serde_json::Result<String> {
    let mut root = Map::new();
    for record in snapshot {
        root.insert(record.label.clone(), serde_json::to_value(record)?);
    }
    serde_json::to_string(&Value::Object(root))
}

/// Decode one event-log entry.
pub fn decode_event(raw: &str) -> Result<AgentEvent, DecodeError> {
    Ok(serde_json::from_str(raw)?)
}

/// Encode one event-log entry.
pub fn encode_event(event: &AgentEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}

fn required<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, FieldError> {
    match fields.get(field) {
        None | Some(Value::Null) => Err(FieldError::Missing { field }),
        Some(value) => Ok(value),
    }
}

fn required_str<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, FieldError> {
    required(fields, field)?.as_str().ok_or(FieldError::WrongType {
        field,
        expected: "a string",
    })
}

fn required_f64(fields: &Map<String, Value>, field: &'static str) -> Result<f64, FieldError> {
    required(fields, field)?.as_f64().ok_or(FieldError::WrongType {
        field,
        expected: "a number",
    })
}

fn tickets(fields: &Map<String, Value>) -> Result<Vec<String>, FieldError> {
    let wrong = FieldError::WrongType {
        field: "assigned_tickets",
        expected: "an array of strings",
    };
    required(fields, "assigned_tickets")?
        .as_array()
        .ok_or_else(|| wrong.clone())?
        .iter()
        .map(|t| t.as_str().map(str::to_string).ok_or_else(|| wrong.clone()))
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
