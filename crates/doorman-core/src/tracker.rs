use std::collections::HashSet;

use crate::types::{EventKind, Notification, PresenceDiff};

/// Tracks which identities are currently present and which have ever
/// been seen.
///
/// Each call to [`update`](Self::update) replaces the presence snapshot
/// wholesale and reports the differences against the previous one. The
/// tracker performs a read-modify-write on its own state, so callers
/// must serialize invocations (the engine actor does this by owning the
/// tracker on a single task).
#[derive(Debug, Default)]
pub struct PresenceTracker {
    /// Identities visible in the most recent snapshot.
    present: HashSet<String>,
    /// Every identity ever observed. Never shrinks; used to distinguish
    /// first-time from returning arrivals.
    known: HashSet<String>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the presence snapshot and report arrivals and departures.
    ///
    /// `departures = previous − new`, `arrivals = new − previous`. The
    /// first-time flag for each arrival is evaluated against the known
    /// set before it is updated. Both result lists are sorted by
    /// identity so downstream announcement order is deterministic.
    ///
    /// An empty input is valid and departs everyone currently present.
    pub fn update(&mut self, new_set: HashSet<String>) -> PresenceDiff {
        let mut departures: Vec<Notification> = self
            .present
            .difference(&new_set)
            .map(|id| Notification {
                identity: id.clone(),
                kind: EventKind::Departure,
                first_time: false,
            })
            .collect();

        let mut arrivals: Vec<Notification> = new_set
            .difference(&self.present)
            .map(|id| Notification {
                identity: id.clone(),
                kind: EventKind::Arrival,
                first_time: !self.known.contains(id),
            })
            .collect();

        departures.sort_by(|a, b| a.identity.cmp(&b.identity));
        arrivals.sort_by(|a, b| a.identity.cmp(&b.identity));

        tracing::debug!(
            present = self.present.len(),
            incoming = new_set.len(),
            arrivals = arrivals.len(),
            departures = departures.len(),
            "presence snapshot updated"
        );

        self.known.extend(new_set.iter().cloned());
        self.present = new_set;

        PresenceDiff {
            arrivals,
            departures,
        }
    }

    /// Identities in the current snapshot, sorted.
    pub fn present(&self) -> Vec<String> {
        let mut v: Vec<String> = self.present.iter().cloned().collect();
        v.sort();
        v
    }

    /// Number of identities ever observed.
    pub fn known_count(&self) -> usize {
        self.known.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn identities(notifications: &[Notification]) -> Vec<&str> {
        notifications.iter().map(|n| n.identity.as_str()).collect()
    }

    #[test]
    fn first_update_arrives_everyone_as_first_time() {
        let mut tracker = PresenceTracker::new();
        let diff = tracker.update(set(&["alice"]));
        assert_eq!(identities(&diff.arrivals), ["alice"]);
        assert!(diff.arrivals[0].first_time);
        assert!(diff.departures.is_empty());
    }

    #[test]
    fn arrivals_and_departures_are_disjoint() {
        let mut tracker = PresenceTracker::new();
        tracker.update(set(&["alice", "bob"]));
        let diff = tracker.update(set(&["bob", "carol"]));
        for a in &diff.arrivals {
            assert!(!diff.departures.iter().any(|d| d.identity == a.identity));
        }
        assert_eq!(identities(&diff.arrivals), ["carol"]);
        assert_eq!(identities(&diff.departures), ["alice"]);
    }

    #[test]
    fn identical_snapshot_yields_empty_diff() {
        let mut tracker = PresenceTracker::new();
        tracker.update(set(&["alice", "bob"]));
        let diff = tracker.update(set(&["alice", "bob"]));
        assert!(diff.is_empty());
    }

    #[test]
    fn empty_snapshot_departs_everyone() {
        let mut tracker = PresenceTracker::new();
        tracker.update(set(&["alice", "bob"]));
        let diff = tracker.update(HashSet::new());
        assert!(diff.arrivals.is_empty());
        assert_eq!(identities(&diff.departures), ["alice", "bob"]);
    }

    #[test]
    fn known_set_never_shrinks() {
        let mut tracker = PresenceTracker::new();
        tracker.update(set(&["alice"]));
        tracker.update(HashSet::new());
        assert_eq!(tracker.known_count(), 1);
        tracker.update(set(&["bob"]));
        assert_eq!(tracker.known_count(), 2);
    }

    #[test]
    fn returning_identity_is_not_first_time() {
        // The scenario from the design review: alice leaves and returns.
        let mut tracker = PresenceTracker::new();

        let diff = tracker.update(set(&["alice"]));
        assert_eq!(identities(&diff.arrivals), ["alice"]);
        assert!(diff.arrivals[0].first_time);
        assert!(diff.departures.is_empty());

        let diff = tracker.update(set(&["alice", "bob"]));
        assert_eq!(identities(&diff.arrivals), ["bob"]);
        assert!(diff.arrivals[0].first_time);
        assert!(diff.departures.is_empty());

        let diff = tracker.update(set(&["bob"]));
        assert!(diff.arrivals.is_empty());
        assert_eq!(identities(&diff.departures), ["alice"]);

        let diff = tracker.update(set(&["bob", "alice"]));
        assert_eq!(identities(&diff.arrivals), ["alice"]);
        assert!(!diff.arrivals[0].first_time);
        assert!(diff.departures.is_empty());
    }

    #[test]
    fn results_are_sorted_by_identity() {
        let mut tracker = PresenceTracker::new();
        let diff = tracker.update(set(&["carol", "alice", "bob"]));
        assert_eq!(identities(&diff.arrivals), ["alice", "bob", "carol"]);
        let diff = tracker.update(HashSet::new());
        assert_eq!(identities(&diff.departures), ["alice", "bob", "carol"]);
    }
}
