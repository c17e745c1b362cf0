//! doorman-core — Presence tracking and notification cooldown logic.
//!
//! Converts per-frame sets of recognized identity labels into debounced
//! arrival/departure events and rate-limits repeat notifications with
//! per-identity, per-kind cooldown windows.

pub mod cooldown;
pub mod tracker;
pub mod types;

pub use cooldown::{Clock, CooldownGate, SystemClock};
pub use tracker::PresenceTracker;
pub use types::{EventKind, Notification, PresenceDiff};
