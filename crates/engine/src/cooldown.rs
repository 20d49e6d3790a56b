//! Global notification cooldown.
//!
//! After a batch of manager notifications goes out, no further batch is sent
//! until the cooldown elapses. Stale messages that pile up in the meantime are
//! bundled into the next batch instead of each paging managers on its own.

use chrono::{DateTime, TimeDelta, Utc};

/// Process-wide cooldown timer.
#[derive(Debug, Clone)]
pub struct NotifyCooldown {
    period: TimeDelta,
    last_notified_at: Option<DateTime<Utc>>,
}

impl NotifyCooldown {
    pub fn new(period: TimeDelta) -> Self {
        Self {
            period,
            last_notified_at: None,
        }
    }

    /// Returns `true` if a batch may be sent at `now`.
    ///
    /// Always `true` before the first batch.
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        match self.last_notified_at {
            None => true,
            Some(last) => now - last >= self.period,
        }
    }

    /// Record that a batch was sent at `now`.
    pub fn record(&mut self, now: DateTime<Utc>) {
        self.last_notified_at = Some(now);
    }

    pub fn last_notified_at(&self) -> Option<DateTime<Utc>> {
        self.last_notified_at
    }

    /// Earliest time the next batch may go out, if one was already sent.
    ///
    /// `None` also when that time is past the representable range.
    pub fn ready_at(&self) -> Option<DateTime<Utc>> {
        self.last_notified_at
            .and_then(|last| last.checked_add_signed(self.period))
    }
}
