//! Tracking table for escalation messages seen in the polled window.
//!
//! State is held in-memory per message `ts`. Nothing survives a restart: the
//! table is rebuilt from whatever the channel window shows on the next poll.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeDelta, Utc};

/// Per-message tracking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedMessage {
    /// When the monitor first observed the message.
    pub first_seen_at: DateTime<Utc>,
    /// Whether managers have already been alerted about it.
    pub notified: bool,
}

/// In-memory table of tracked escalation messages, keyed by message `ts`.
#[derive(Debug, Default)]
pub struct TrackingTable {
    entries: HashMap<String, TrackedMessage>,
}

impl TrackingTable {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Record a sighting. Returns `true` when the message was not tracked yet.
    pub fn observe(&mut self, ts: &str, now: DateTime<Utc>) -> bool {
        if self.entries.contains_key(ts) {
            return false;
        }
        self.entries.insert(
            ts.to_string(),
            TrackedMessage {
                first_seen_at: now,
                notified: false,
            },
        );
        true
    }

    /// Whether the message is un-notified and at least `ack_window` old.
    pub fn is_due(&self, ts: &str, now: DateTime<Utc>, ack_window: TimeDelta) -> bool {
        self.entries
            .get(ts)
            .is_some_and(|entry| !entry.notified && now - entry.first_seen_at >= ack_window)
    }

    /// Flag a message as notified. Never reset while the entry lives.
    pub fn mark_notified(&mut self, ts: &str) {
        if let Some(entry) = self.entries.get_mut(ts) {
            entry.notified = true;
        }
    }

    pub fn remove(&mut self, ts: &str) -> Option<TrackedMessage> {
        self.entries.remove(ts)
    }

    /// Drop every entry whose `ts` is not in `visible`. Returns how many were dropped.
    pub fn retain_visible(&mut self, visible: &HashSet<&str>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|ts, _| visible.contains(ts.as_str()));
        before - self.entries.len()
    }

    pub fn get(&self, ts: &str) -> Option<&TrackedMessage> {
        self.entries.get(ts)
    }

    pub fn contains(&self, ts: &str) -> bool {
        self.entries.contains_key(ts)
    }

    /// Number of tracked messages (for monitoring).
    pub fn tracked_count(&self) -> usize {
        self.entries.len()
    }
}
