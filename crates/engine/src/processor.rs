//! Poll-cycle processor.
//!
//! One call to `EscalationMonitor::run_cycle`:
//! 1. Fetches the recent channel window
//! 2. Starts tracking new messages that carry the escalation marker
//! 3. Checks acknowledgment for tracked messages older than the ack window
//! 4. Notifies managers about unacknowledged ones, subject to the global cooldown
//! 5. Prunes entries whose message left the fetched window
//!
//! The cycle owns no clock: the caller passes `now`, sampled once per cycle.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use escalation_common::client::MessagingClient;
use escalation_common::config::AppConfig;
use escalation_common::error::AppError;
use escalation_notifier::ManagerNotifier;

use crate::ack::AckChecker;
use crate::clock::to_delta;
use crate::cooldown::NotifyCooldown;
use crate::tracker::TrackingTable;

/// Length of the text preview logged for newly discovered escalations.
const PREVIEW_CHARS: usize = 100;

/// Static inputs of the monitor.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub channel_id: String,
    pub escalation_marker: String,
    pub history_limit: u32,
    pub ack_window: TimeDelta,
    pub notify_cooldown: TimeDelta,
    pub ack_emojis: Vec<String>,
    pub manager_user_ids: Vec<String>,
}

impl MonitorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            channel_id: config.escalation_channel_id.clone(),
            escalation_marker: config.escalation_marker.clone(),
            history_limit: config.history_limit,
            ack_window: to_delta(Duration::from_secs(config.ack_window_secs)),
            notify_cooldown: to_delta(Duration::from_secs(config.notify_cooldown_secs)),
            ack_emojis: config.ack_emojis.clone(),
            manager_user_ids: config.manager_user_ids.clone(),
        }
    }
}

/// Counters describing what a single cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub matched: usize,
    pub discovered: usize,
    pub acknowledged: usize,
    /// Messages found stale and unacknowledged this cycle.
    pub unacknowledged: Vec<String>,
    pub notifications_sent: u32,
    pub notifications_failed: u32,
    /// Unacknowledged messages were held back by the cooldown.
    pub deferred: bool,
    pub pruned: usize,
}

impl CycleReport {
    pub fn notified(&self) -> bool {
        !self.unacknowledged.is_empty() && !self.deferred
    }
}

/// Escalation monitor state: the tracking table plus the notification cooldown.
pub struct EscalationMonitor {
    settings: MonitorSettings,
    tracker: TrackingTable,
    cooldown: NotifyCooldown,
    ack: AckChecker,
    notifier: ManagerNotifier,
}

impl EscalationMonitor {
    pub fn new(settings: MonitorSettings) -> Self {
        let ack = AckChecker::new(settings.channel_id.clone(), settings.ack_emojis.clone());
        let notifier = ManagerNotifier::new(
            settings.channel_id.clone(),
            settings.manager_user_ids.clone(),
            ack.primary_emoji().unwrap_or("eyes"),
        );
        let cooldown = NotifyCooldown::new(settings.notify_cooldown);

        Self {
            settings,
            tracker: TrackingTable::new(),
            cooldown,
            ack,
            notifier,
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn tracker(&self) -> &TrackingTable {
        &self.tracker
    }

    pub fn cooldown(&self) -> &NotifyCooldown {
        &self.cooldown
    }

    /// Whether `text` carries the escalation marker phrase.
    pub fn is_escalation(&self, text: &str) -> bool {
        text.contains(&self.settings.escalation_marker)
    }

    /// Run one poll cycle at `now`.
    ///
    /// Only a failed channel fetch aborts the cycle; in that case the tracking
    /// table and cooldown are left untouched. Ack-check and delivery failures
    /// are absorbed (see `AckChecker` and `ManagerNotifier`).
    pub async fn run_cycle<C>(&mut self, client: &C, now: DateTime<Utc>) -> Result<CycleReport, AppError>
    where
        C: MessagingClient + ?Sized,
    {
        let messages = client
            .fetch_recent_messages(&self.settings.channel_id, self.settings.history_limit)
            .await?;

        let mut report = CycleReport {
            fetched: messages.len(),
            ..Default::default()
        };

        for message in &messages {
            if !self.is_escalation(&message.text) {
                continue;
            }
            report.matched += 1;

            if self.tracker.observe(&message.ts, now) {
                report.discovered += 1;
                tracing::info!(
                    message_ts = %message.ts,
                    author = message.user.as_deref().unwrap_or("unknown"),
                    preview = %message.preview(PREVIEW_CHARS),
                    "New escalation found"
                );
            }

            if !self.tracker.is_due(&message.ts, now, self.settings.ack_window) {
                continue;
            }

            if self.ack.is_acknowledged(client, &message.ts).await {
                tracing::info!(message_ts = %message.ts, "Escalation has been acknowledged");
                self.tracker.remove(&message.ts);
                report.acknowledged += 1;
            } else if !report.unacknowledged.contains(&message.ts) {
                tracing::info!(message_ts = %message.ts, "No acknowledgment found for escalation");
                report.unacknowledged.push(message.ts.clone());
            }
        }

        if !report.unacknowledged.is_empty() {
            if self.cooldown.is_ready(now) {
                let batch = self
                    .notifier
                    .notify_all(client, &report.unacknowledged)
                    .await;
                report.notifications_sent = batch.sent;
                report.notifications_failed = batch.failed;

                self.cooldown.record(now);
                for ts in &report.unacknowledged {
                    self.tracker.mark_notified(ts);
                }
            } else {
                report.deferred = true;
                tracing::debug!(
                    pending = report.unacknowledged.len(),
                    last_notified_at = ?self.cooldown.last_notified_at(),
                    ready_at = ?self.cooldown.ready_at(),
                    "Manager notification deferred by cooldown"
                );
            }
        }

        let visible: HashSet<&str> = messages.iter().map(|m| m.ts.as_str()).collect();
        report.pruned = self.tracker.retain_visible(&visible);
        if report.pruned > 0 {
            tracing::debug!(pruned = report.pruned, "Pruned escalations that left the window");
        }

        Ok(report)
    }
}
