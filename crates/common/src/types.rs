use serde::{Deserialize, Serialize};

/// A message as returned by the channel history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Platform-assigned timestamp; unique within the channel and used as the message ID.
    pub ts: String,
    /// Message body. Slack omits it for some subtypes, so it defaults to empty.
    #[serde(default)]
    pub text: String,
    /// Author user ID, absent for bot and system messages.
    #[serde(default)]
    pub user: Option<String>,
}

impl ChannelMessage {
    pub fn new(ts: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            ts: ts.into(),
            text: text.into(),
            user: None,
        }
    }

    /// First `max_chars` characters of the text, for log lines.
    pub fn preview(&self, max_chars: usize) -> String {
        match self.text.char_indices().nth(max_chars) {
            Some((idx, _)) => format!("{}...", &self.text[..idx]),
            None => self.text.clone(),
        }
    }
}

/// An emoji reaction attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Emoji short name without colons (e.g., "eyes")
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

impl Reaction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 1,
        }
    }
}
