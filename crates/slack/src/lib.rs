//! Slack Web API client for the escalation monitor.
//!
//! Only the four methods the monitor needs are wrapped. Every call carries the
//! bot token as a bearer header and runs under the client-wide timeout, so a
//! hung request surfaces as an error instead of stalling the poll loop.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use escalation_common::client::MessagingClient;
use escalation_common::config::AppConfig;
use escalation_common::error::AppError;
use escalation_common::types::{ChannelMessage, Reaction};

/// Common `{ ok, error, ... }` wrapper every Web API response uses.
#[derive(Debug, Deserialize)]
struct SlackEnvelope<T> {
    ok: bool,
    error: Option<String>,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Deserialize)]
struct HistoryBody {
    #[serde(default)]
    messages: Vec<ChannelMessage>,
}

#[derive(Debug, Deserialize)]
struct ReactionsBody {
    message: Option<ReactedMessage>,
}

#[derive(Debug, Deserialize)]
struct ReactedMessage {
    #[serde(default)]
    reactions: Vec<Reaction>,
}

#[derive(Debug, Deserialize)]
struct PermalinkBody {
    permalink: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostMessageBody {
    ts: Option<String>,
}

/// Slack Web API client.
#[derive(Clone)]
pub struct SlackApiClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl SlackApiClient {
    pub fn new(api_base: &str, bot_token: &str, request_timeout_ms: u64) -> Result<Self, AppError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("escalation-monitor"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.trim().to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            &config.slack_api_base,
            &config.slack_bot_token,
            config.slack_request_timeout_ms,
        )
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    /// Send a request and unwrap the Slack envelope, turning `ok: false` into an error.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        request: RequestBuilder,
    ) -> Result<T, AppError> {
        tracing::debug!(method, "Calling Slack API");

        let body = request
            .bearer_auth(&self.bot_token)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let envelope: SlackEnvelope<T> = serde_json::from_str(&body)
            .map_err(|e| AppError::Decode(format!("{method}: {e}")))?;

        if !envelope.ok {
            return Err(AppError::slack(
                method,
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(envelope.body)
    }
}

#[async_trait]
impl MessagingClient for SlackApiClient {
    async fn fetch_recent_messages(
        &self,
        channel: &str,
        limit: u32,
    ) -> Result<Vec<ChannelMessage>, AppError> {
        let limit = limit.to_string();
        let request = self
            .http
            .get(self.url("conversations.history"))
            .query(&[("channel", channel), ("limit", limit.as_str())]);
        let body: HistoryBody = self.call("conversations.history", request).await?;
        Ok(body.messages)
    }

    async fn fetch_reactions(&self, channel: &str, ts: &str) -> Result<Vec<Reaction>, AppError> {
        let request = self
            .http
            .get(self.url("reactions.get"))
            .query(&[("channel", channel), ("timestamp", ts)]);
        let body: ReactionsBody = self.call("reactions.get", request).await?;
        Ok(body.message.map(|m| m.reactions).unwrap_or_default())
    }

    async fn fetch_permalink(&self, channel: &str, ts: &str) -> Result<String, AppError> {
        let request = self
            .http
            .get(self.url("chat.getPermalink"))
            .query(&[("channel", channel), ("message_ts", ts)]);
        let body: PermalinkBody = self.call("chat.getPermalink", request).await?;
        body.permalink
            .filter(|link| !link.trim().is_empty())
            .ok_or_else(|| AppError::slack("chat.getPermalink", "response missing permalink"))
    }

    async fn send_direct_message(&self, recipient: &str, text: &str) -> Result<(), AppError> {
        let payload = json!({
            "channel": recipient,
            "text": text,
            "parse": "full",
        });
        let request = self.http.post(self.url("chat.postMessage")).json(&payload);
        let body: PostMessageBody = self.call("chat.postMessage", request).await?;

        tracing::debug!(recipient, ts = ?body.ts, "Direct message delivered");
        Ok(())
    }
}
