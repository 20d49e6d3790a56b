//! Acknowledgment check.
//!
//! A message counts as acknowledged when any of its reactions is in the
//! configured emoji set.
//!
//! Policy: the check fails closed. If reactions cannot be fetched the message
//! is reported as NOT acknowledged, so an outage produces extra notifications
//! rather than silently hiding a stale escalation.

use escalation_common::client::MessagingClient;

pub struct AckChecker {
    channel_id: String,
    emojis: Vec<String>,
}

impl AckChecker {
    pub fn new(channel_id: impl Into<String>, emojis: Vec<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            emojis,
        }
    }

    /// The emoji responders are asked to use in notifications.
    pub fn primary_emoji(&self) -> Option<&str> {
        self.emojis.first().map(String::as_str)
    }

    pub async fn is_acknowledged<C>(&self, client: &C, ts: &str) -> bool
    where
        C: MessagingClient + ?Sized,
    {
        match client.fetch_reactions(&self.channel_id, ts).await {
            Ok(reactions) => reactions
                .iter()
                .any(|reaction| self.emojis.iter().any(|e| *e == reaction.name)),
            Err(e) => {
                tracing::warn!(
                    message_ts = %ts,
                    error = %e,
                    "Error checking reactions, treating message as unacknowledged"
                );
                false
            }
        }
    }
}
