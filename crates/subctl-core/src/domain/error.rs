//! Domain-level error taxonomy for SubCtl.

use subctl_store::StoreError;

/// Why a single agent entry could not be turned into an `AgentRecord`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("entry is not a mapping")]
    NotAMapping,

    #[error("missing required field: {field}")]
    Missing { field: &'static str },

    #[error("field {field} must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field last_update is not a valid timestamp: {reason}")]
    InvalidTimestamp { reason: String },

    #[error("label field {label:?} does not match key {key:?}")]
    LabelMismatch { key: String, label: String },

    #[error("event entry is not a valid agent event: {reason}")]
    InvalidEvent { reason: String },
}

/// Errors decoding a stored snapshot or event payload.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Json(String),

    #[error("snapshot must be a mapping of label to agent fields, found {found}")]
    NotAMapping { found: &'static str },

    #[error("agent entry {label:?} is malformed: {source}")]
    Entry {
        label: String,
        #[source]
        source: FieldError,
    },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}

/// Why a fetch degraded to an empty result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors the presenter returns. Store and decode failures degrade to empty
/// views, so only the terminal write can fail.
#[derive(Debug, thiserror::Error)]
pub enum SubctlError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for SubCtl domain operations.
pub type Result<T> = std::result::Result<T, SubctlError>;
