//! Polling presenter: turns fetched snapshots into terminal output.
//!
//! - `render`: pure formatting of tables, notices and the inspection view
//! - `monitor`: the `Presenter` driving single-shot, watch and inspect modes

pub mod monitor;
pub mod render;

pub use monitor::{InspectOutcome, InspectSections, Presenter};
pub use render::{ComplianceBand, StatusTone};
