//! SubCtl Core Library
//!
//! Read side of the agent monitor: decode the snapshot producers publish,
//! decide which agents are live, and render them. Also carries the event
//! recorder producers use to append to per-agent event logs.

pub mod codec;
pub mod config;
pub mod domain;
pub mod fetcher;
pub mod liveness;
pub mod obs;
pub mod presenter;
pub mod recorder;
pub mod telemetry;

pub use codec::{
    decode_event, decode_record, decode_snapshot, encode_event, encode_snapshot, DecodedSnapshot,
    EntryPolicy, SkippedEntry,
};
pub use config::{
    MonitorConfig, DEFAULT_MAX_AGE_MINUTES, DEFAULT_RECENT_EVENTS, DEFAULT_REFRESH,
    MAX_AGE_LIMIT_MINUTES,
};
pub use domain::{
    parse_timestamp, AgentEvent, AgentRecord, DecodeError, FetchError, FieldError, Result,
    Snapshot, SubctlError,
};
pub use fetcher::{fetch_all_merged, FetchOutcome, Fetched, MergedFetch, SnapshotFetcher};
pub use liveness::{active, active_now, is_active};
pub use obs::watch_span;
pub use presenter::{ComplianceBand, InspectOutcome, InspectSections, Presenter, StatusTone};
pub use recorder::{EventRecorder, RecordOutcome};
pub use telemetry::init_tracing;

/// SubCtl version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
