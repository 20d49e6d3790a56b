//! Messaging platform seam.
//!
//! The monitor only talks to the chat platform through this trait. The Slack
//! implementation lives in `escalation-slack`; tests provide in-memory fakes.

use async_trait::async_trait;

use crate::error::AppError;
use crate::types::{ChannelMessage, Reaction};

#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Most recent `limit` messages of `channel`, newest first.
    async fn fetch_recent_messages(
        &self,
        channel: &str,
        limit: u32,
    ) -> Result<Vec<ChannelMessage>, AppError>;

    /// Reactions currently attached to the message `ts` in `channel`.
    async fn fetch_reactions(&self, channel: &str, ts: &str) -> Result<Vec<Reaction>, AppError>;

    /// Shareable link to the message `ts` in `channel`.
    async fn fetch_permalink(&self, channel: &str, ts: &str) -> Result<String, AppError>;

    /// Send `text` as a direct message to `recipient` (a user ID).
    async fn send_direct_message(&self, recipient: &str, text: &str) -> Result<(), AppError>;
}
