//! Snapshot fetcher: reads agent state from the store without ever failing.
//!
//! Every read degrades to an empty value when the store is unreachable or
//! returns undecodable data. The degraded result still says why through
//! [`Fetched::failure`], and exactly one `fetch.failed` diagnostic is emitted,
//! so callers that care can tell "store down" from "nothing there" while
//! callers that don't can use [`Fetched::into_value`].

use std::sync::Arc;

use futures::future::join_all;
use subctl_store::{events_key, AgentStore, AGENTS_KEY};

use crate::codec::{decode_event, decode_snapshot, EntryPolicy, SkippedEntry};
use crate::domain::{AgentEvent, FetchError, FieldError, Snapshot};
use crate::obs;

/// A read result that may have degraded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fetched<T> {
    /// The data read, or an empty value when the read failed.
    pub value: T,
    /// Entries dropped because they were malformed.
    pub skipped: Vec<SkippedEntry>,
    /// Why the read degraded, if it did.
    pub failure: Option<FetchError>,
}

impl<T: Default> Fetched<T> {
    fn ok(value: T, skipped: Vec<SkippedEntry>) -> Self {
        Self {
            value,
            skipped,
            failure: None,
        }
    }

    fn failed(error: FetchError) -> Self {
        Self {
            value: T::default(),
            skipped: Vec::new(),
            failure: Some(error),
        }
    }

    /// Whether the read failed and `value` is a stand-in.
    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Snapshot outcome of [`SnapshotFetcher::fetch_all`].
pub type FetchOutcome = Fetched<Snapshot>;

/// Reads the agent map and event logs from one store.
#[derive(Clone)]
pub struct SnapshotFetcher {
    store: Arc<dyn AgentStore>,
    policy: EntryPolicy,
}

impl SnapshotFetcher {
    pub fn new(store: Arc<dyn AgentStore>, policy: EntryPolicy) -> Self {
        Self { store, policy }
    }

    /// Read and decode the full agent snapshot.
    pub async fn fetch_all(&self) -> FetchOutcome {
        let blob = match self.store.get(AGENTS_KEY).await {
            Ok(blob) => blob,
            Err(err) => return self.degrade(AGENTS_KEY, err.into()),
        };

        match decode_snapshot(blob.as_deref(), self.policy) {
            Ok(decoded) => {
                for entry in &decoded.skipped {
                    obs::emit_entry_skipped(AGENTS_KEY, &entry.label, &entry.reason);
                }
                obs::emit_fetch_completed(
                    AGENTS_KEY,
                    decoded.snapshot.len(),
                    decoded.skipped.len(),
                );
                Fetched::ok(decoded.snapshot, decoded.skipped)
            }
            Err(err) => self.degrade(AGENTS_KEY, err.into()),
        }
    }

    /// Read the most recent `limit` events for `label`, newest first.
    ///
    /// Undecodable entries are skipped (or fail the read under
    /// [`EntryPolicy::Reject`]).
    pub async fn fetch_events(&self, label: &str, limit: usize) -> Fetched<Vec<AgentEvent>> {
        let key = events_key(label);
        if limit == 0 {
            return Fetched::ok(Vec::new(), Vec::new());
        }
        let stop = isize::try_from(limit - 1).unwrap_or(isize::MAX);
        let raw = match self.store.lrange(&key, 0, stop).await {
            Ok(raw) => raw,
            Err(err) => return self.degrade(&key, err.into()),
        };

        let mut events = Vec::with_capacity(raw.len());
        let mut skipped = Vec::new();
        for (position, entry) in raw.iter().enumerate() {
            match decode_event(entry) {
                Ok(event) => events.push(event),
                Err(err) => {
                    let entry_label = format!("{label}[{position}]");
                    if self.policy == EntryPolicy::Reject {
                        return self.degrade(&key, err.into());
                    }
                    obs::emit_entry_skipped(&key, &entry_label, &err);
                    skipped.push(SkippedEntry {
                        label: entry_label,
                        reason: FieldError::InvalidEvent {
                            reason: err.to_string(),
                        },
                    });
                }
            }
        }
        obs::emit_fetch_completed(&key, events.len(), skipped.len());
        Fetched::ok(events, skipped)
    }

    fn degrade<T: Default>(&self, key: &str, error: FetchError) -> Fetched<T> {
        obs::emit_fetch_failed(key, &self.store.endpoint(), &error);
        Fetched::failed(error)
    }
}

/// Union of several store fetches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedFetch {
    pub snapshot: Snapshot,
    pub skipped: Vec<SkippedEntry>,
    /// One entry per store whose fetch degraded, in fetcher order.
    pub failures: Vec<FetchError>,
}

/// Fetch from several stores concurrently and union the snapshots by label.
///
/// Each fetch degrades independently. On a shared label the fetcher later in
/// the slice wins.
pub async fn fetch_all_merged(fetchers: &[SnapshotFetcher]) -> MergedFetch {
    let outcomes = join_all(fetchers.iter().map(|f| f.fetch_all())).await;

    let mut merged = MergedFetch::default();
    for outcome in outcomes {
        merged.snapshot.merge(outcome.value);
        merged.skipped.extend(outcome.skipped);
        merged.failures.extend(outcome.failure);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_snapshot;
    use crate::domain::agent::tests::record;
    use crate::domain::DecodeError;
    use chrono::Utc;
    use subctl_store::fakes::MemoryStore;

    fn fetcher(store: &Arc<MemoryStore>, policy: EntryPolicy) -> SnapshotFetcher {
        SnapshotFetcher::new(store.clone(), policy)
    }

    async fn seed(store: &MemoryStore, labels: &[&str]) {
        let snapshot: Snapshot = labels.iter().map(|l| record(l, Utc::now())).collect();
        let blob = encode_snapshot(&snapshot).unwrap();
        store.set(AGENTS_KEY, &blob).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_key_is_empty_not_degraded() {
        let store = Arc::new(MemoryStore::new());
        let outcome = fetcher(&store, EntryPolicy::Skip).fetch_all().await;
        assert!(outcome.value.is_empty());
        assert!(!outcome.is_degraded());
    }

    #[tokio::test]
    async fn test_unavailable_store_degrades() {
        let store = Arc::new(MemoryStore::unavailable());
        let outcome = fetcher(&store, EntryPolicy::Skip).fetch_all().await;
        assert!(outcome.value.is_empty());
        assert!(matches!(outcome.failure, Some(FetchError::Store(_))));
    }

    #[tokio::test]
    async fn test_garbage_blob_degrades() {
        let store = Arc::new(MemoryStore::new());
        store.set(AGENTS_KEY, "{not json").await.unwrap();
        let outcome = fetcher(&store, EntryPolicy::Skip).fetch_all().await;
        assert!(outcome.value.is_empty());
        assert!(matches!(outcome.failure, Some(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_skip_and_reject_policies() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                AGENTS_KEY,
                r#"{"broken": {"status": "working"}, "also": 3}"#,
            )
            .await
            .unwrap();

        let skipped = fetcher(&store, EntryPolicy::Skip).fetch_all().await;
        assert!(!skipped.is_degraded());
        assert_eq!(skipped.skipped.len(), 2);
        assert_eq!(skipped.skipped[1].reason, FieldError::NotAMapping);

        let rejected = fetcher(&store, EntryPolicy::Reject).fetch_all().await;
        assert!(rejected.value.is_empty());
        assert!(matches!(
            rejected.failure,
            Some(FetchError::Decode(DecodeError::Entry { ref label, .. })) if label == "broken"
        ));
    }

    #[tokio::test]
    async fn test_fetch_events_newest_first_with_limit() {
        let store = Arc::new(MemoryStore::new());
        let key = events_key("alpha");
        for n in 0..5 {
            let event = AgentEvent::new("sess", format!("step-{n}"), Default::default());
            let raw = crate::codec::encode_event(&event).unwrap();
            store.lpush(&key, &raw).await.unwrap();
        }
        store.lpush(&key, "garbage").await.unwrap();

        let outcome = fetcher(&store, EntryPolicy::Skip)
            .fetch_events("alpha", 3)
            .await;
        let types: Vec<_> = outcome.value.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, vec!["step-4", "step-3"]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].label, "alpha[0]");
    }

    #[tokio::test]
    async fn test_merged_fetch_later_store_wins() {
        let first = Arc::new(MemoryStore::new());
        let second = Arc::new(MemoryStore::new());
        let down = Arc::new(MemoryStore::unavailable());
        seed(&first, &["a", "b"]).await;

        let mut newer = record("b", Utc::now());
        newer.status = "stalled".to_string();
        let snapshot: Snapshot = vec![newer, record("c", Utc::now())].into_iter().collect();
        second
            .set(AGENTS_KEY, &encode_snapshot(&snapshot).unwrap())
            .await
            .unwrap();

        let merged = fetch_all_merged(&[
            fetcher(&first, EntryPolicy::Skip),
            fetcher(&down, EntryPolicy::Skip),
            fetcher(&second, EntryPolicy::Skip),
        ])
        .await;
        assert_eq!(
            merged.snapshot.labels().collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert_eq!(merged.snapshot.get("b").unwrap().status, "stalled");
        assert_eq!(merged.failures.len(), 1);
    }
}
