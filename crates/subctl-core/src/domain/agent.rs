//! Agent records and snapshots.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::timestamp::iso8601;

/// Latest self-reported state of one agent.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgentRecord {
    /// Opaque session identifier.
    pub session_key: String,

    /// Unique human-facing name; the snapshot key.
    pub label: String,

    /// Communication channel identifier.
    pub channel: String,

    /// Tokens consumed so far.
    pub total_tokens: u64,

    /// Open-ended status string (`working`, `stalled`, `completed`, `error`, ...).
    pub status: String,

    /// Time of the most recent report; the sole basis for liveness.
    #[serde(with = "iso8601")]
    pub last_update: DateTime<Utc>,

    /// Ticket identifiers in assignment order.
    pub assigned_tickets: Vec<String>,

    /// Dependency-policy adherence in [0, 1].
    pub package_compliance: f64,

    /// Share of hand-written code in [0, 1]. Informational.
    pub custom_code_ratio: f64,

    /// Opaque consensus proof, absent until one has been produced.
    pub consensus_proof: Option<String>,
}

/// Every agent's latest record, keyed by label.
///
/// Iteration follows insertion order, which for decoded snapshots is the
/// order labels appear in the stored blob. Re-inserting a label replaces
/// the record in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    records: Vec<AgentRecord>,
    index: HashMap<String, usize>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its label, returning the record it replaced.
    pub fn insert(&mut self, record: AgentRecord) -> Option<AgentRecord> {
        match self.index.get(&record.label) {
            Some(&pos) => Some(std::mem::replace(&mut self.records[pos], record)),
            None => {
                self.index.insert(record.label.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&AgentRecord> {
        self.index.get(label).map(|&pos| &self.records[pos])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AgentRecord> {
        self.records.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.label.as_str())
    }

    /// Records satisfying `keep`, order preserved.
    pub fn filtered<F>(&self, mut keep: F) -> Snapshot
    where
        F: FnMut(&AgentRecord) -> bool,
    {
        self.records.iter().filter(|&r| keep(r)).cloned().collect()
    }

    /// Union with `other`; on a shared label the record from `other` wins.
    pub fn merge(&mut self, other: Snapshot) {
        for record in other {
            self.insert(record);
        }
    }
}

impl FromIterator<AgentRecord> for Snapshot {
    fn from_iter<I: IntoIterator<Item = AgentRecord>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for record in iter {
            snapshot.insert(record);
        }
        snapshot
    }
}

impl IntoIterator for Snapshot {
    type Item = AgentRecord;
    type IntoIter = std::vec::IntoIter<AgentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a AgentRecord;
    type IntoIter = std::slice::Iter<'a, AgentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(label: &str, last_update: DateTime<Utc>) -> AgentRecord {
        AgentRecord {
            session_key: format!("session-{label}"),
            label: label.to_string(),
            channel: "slack".to_string(),
            total_tokens: 1_000,
            status: "working".to_string(),
            last_update,
            assigned_tickets: vec!["T-1".to_string()],
            package_compliance: 1.0,
            custom_code_ratio: 0.1,
            consensus_proof: None,
        }
    }

    #[test]
    fn test_insert_preserves_order_and_replaces_in_place() {
        let now = Utc::now();
        let mut snapshot = Snapshot::new();
        assert!(snapshot.insert(record("b", now)).is_none());
        assert!(snapshot.insert(record("a", now)).is_none());
        assert!(snapshot.insert(record("c", now)).is_none());

        let mut updated = record("a", now);
        updated.status = "stalled".to_string();
        let previous = snapshot.insert(updated).unwrap();

        assert_eq!(previous.status, "working");
        assert_eq!(snapshot.labels().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(snapshot.get("a").unwrap().status, "stalled");
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_filtered_keeps_order_and_index() {
        let now = Utc::now();
        let snapshot: Snapshot = ["x", "y", "z"].iter().map(|l| record(l, now)).collect();
        let subset = snapshot.filtered(|r| r.label != "y");

        assert_eq!(subset.labels().collect::<Vec<_>>(), vec!["x", "z"]);
        assert!(subset.contains("z"));
        assert!(!subset.contains("y"));
    }

    #[test]
    fn test_merge_last_writer_wins() {
        let now = Utc::now();
        let mut left: Snapshot = ["a", "b"].iter().map(|l| record(l, now)).collect();
        let mut shared = record("b", now);
        shared.total_tokens = 99;
        let right: Snapshot = vec![shared, record("c", now)].into_iter().collect();

        left.merge(right);

        assert_eq!(left.labels().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(left.get("b").unwrap().total_tokens, 99);
    }
}
