use uuid::Uuid;

use escalation_common::client::MessagingClient;
use escalation_common::error::AppError;

use crate::template;

/// Outcome of one notification batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub sent: u32,
    pub failed: u32,
}

/// Sends unacknowledged-escalation warnings to a fixed roster of managers.
pub struct ManagerNotifier {
    channel_id: String,
    roster: Vec<String>,
    ack_emoji: String,
}

impl ManagerNotifier {
    pub fn new(channel_id: impl Into<String>, roster: Vec<String>, ack_emoji: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            roster,
            ack_emoji: ack_emoji.into(),
        }
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Notify one manager about one message: resolve its permalink, render the
    /// warning and DM it.
    pub async fn notify<C>(&self, client: &C, manager_id: &str, ts: &str) -> Result<(), AppError>
    where
        C: MessagingClient + ?Sized,
    {
        let permalink = client.fetch_permalink(&self.channel_id, ts).await?;
        let text = template::unacknowledged_alert(&permalink, &self.ack_emoji);
        client.send_direct_message(manager_id, &text).await
    }

    /// Notify every manager about every message in `message_ts`.
    ///
    /// Sends `roster.len() * message_ts.len()` messages, manager by manager.
    /// Failures are logged and counted; the batch always runs to the end.
    pub async fn notify_all<C>(&self, client: &C, message_ts: &[String]) -> BatchReport
    where
        C: MessagingClient + ?Sized,
    {
        let batch_id = Uuid::new_v4();
        let mut report = BatchReport::default();

        for manager_id in &self.roster {
            for ts in message_ts {
                match self.notify(client, manager_id, ts).await {
                    Ok(()) => {
                        report.sent += 1;
                        tracing::info!(
                            batch_id = %batch_id,
                            manager_id = %manager_id,
                            message_ts = %ts,
                            "Successfully sent manager notification"
                        );
                    }
                    Err(e) => {
                        report.failed += 1;
                        tracing::error!(
                            batch_id = %batch_id,
                            manager_id = %manager_id,
                            message_ts = %ts,
                            error = %e,
                            "Error sending manager notification"
                        );
                    }
                }
            }
        }

        tracing::info!(
            batch_id = %batch_id,
            managers = self.roster.len(),
            messages = message_ts.len(),
            sent = report.sent,
            failed = report.failed,
            "Manager notification batch complete"
        );

        report
    }
}
