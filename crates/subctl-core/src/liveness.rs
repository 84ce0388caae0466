//! Liveness filter: which agents reported recently enough to count as active.
//!
//! Age is `as_of - last_update`. A record from the future (clock skew) has
//! negative age and is active.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{AgentRecord, Snapshot};

/// Whether `record` reported within `max_age` of `as_of`.
pub fn is_active(record: &AgentRecord, as_of: DateTime<Utc>, max_age: Duration) -> bool {
    as_of.signed_duration_since(record.last_update) <= max_age
}

/// The active subset of `snapshot`, in snapshot order.
pub fn active(snapshot: &Snapshot, as_of: DateTime<Utc>, max_age: Duration) -> Snapshot {
    snapshot.filtered(|record| is_active(record, as_of, max_age))
}

/// [`active`] against the wall clock at call time.
pub fn active_now(snapshot: &Snapshot, max_age: Duration) -> Snapshot {
    active(snapshot, Utc::now(), max_age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::tests::record;

    #[test]
    fn test_boundary_is_inclusive() {
        let now = Utc::now();
        let max_age = Duration::minutes(10);
        assert!(is_active(&record("a", now - max_age), now, max_age));
        assert!(!is_active(
            &record("a", now - max_age - Duration::seconds(1)),
            now,
            max_age
        ));
    }

    #[test]
    fn test_future_timestamp_is_active() {
        let now = Utc::now();
        let skewed = record("a", now + Duration::hours(3));
        assert!(is_active(&skewed, now, Duration::minutes(10)));
    }

    #[test]
    fn test_zero_max_age_keeps_only_current_and_future() {
        let now = Utc::now();
        let snapshot: Snapshot = vec![
            record("past", now - Duration::seconds(1)),
            record("now", now),
            record("future", now + Duration::seconds(1)),
        ]
        .into_iter()
        .collect();
        let kept = active(&snapshot, now, Duration::zero());
        assert_eq!(kept.labels().collect::<Vec<_>>(), vec!["now", "future"]);
    }
}
