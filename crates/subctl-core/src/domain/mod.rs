//! Domain models for SubCtl.
//!
//! Canonical definitions for the entities producers publish:
//! - `AgentRecord`: latest self-reported state of one agent
//! - `Snapshot`: every agent's latest record, keyed by label in store order
//! - `AgentEvent`: one entry of an agent's append-only event log

pub mod agent;
pub mod error;
pub mod event;
pub mod timestamp;

// Re-export main types and errors
pub use agent::{AgentRecord, Snapshot};
pub use error::{DecodeError, FetchError, FieldError, Result, SubctlError};
pub use event::AgentEvent;
pub use timestamp::parse_timestamp;
