use serde::{Deserialize, Serialize};

/// Kind of presence change for an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Arrival,
    Departure,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Arrival => "arrival",
            EventKind::Departure => "departure",
        }
    }
}

/// A single pending notification for one identity.
///
/// `first_time` is only meaningful for arrivals: true when the identity
/// has never been observed before. Always false for departures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub identity: String,
    pub kind: EventKind,
    pub first_time: bool,
}

/// Result of one presence-set update: who entered and who left,
/// relative to the previous snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresenceDiff {
    pub arrivals: Vec<Notification>,
    pub departures: Vec<Notification>,
}

impl PresenceDiff {
    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty() && self.departures.is_empty()
    }
}
