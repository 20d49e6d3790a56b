/// Marker phrase that identifies an escalation request in the channel.
pub const DEFAULT_ESCALATION_MARKER: &str = "Digital Support Escalation Request";

/// Reactions that count as "someone has picked this up".
pub const DEFAULT_ACK_EMOJIS: &[&str] = &["eyes", "eyes-looking"];

/// Upper bound for every timer setting (one year).
pub const MAX_TIMER_SECS: u64 = 366 * 24 * 3600;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Slack bot token (`xoxb-...`)
    pub slack_bot_token: String,

    /// Slack Web API base URL (overridable for tests and proxies)
    pub slack_api_base: String,

    /// Per-request timeout for Slack calls in milliseconds
    pub slack_request_timeout_ms: u64,

    /// Channel polled for escalation messages
    pub escalation_channel_id: String,

    /// Slack user IDs that receive unacknowledged-escalation DMs, in order
    pub manager_user_ids: Vec<String>,

    /// Reaction names that acknowledge an escalation
    pub ack_emojis: Vec<String>,

    /// Substring a message must contain to be treated as an escalation
    pub escalation_marker: String,

    /// Age a message must reach before its acknowledgment is checked (default: 3600)
    pub ack_window_secs: u64,

    /// Minimum gap between two manager notification batches (default: 3600)
    pub notify_cooldown_secs: u64,

    /// Delay between poll cycles in seconds (default: 10)
    pub poll_interval_secs: u64,

    /// Delay after a failed cycle in seconds (default: 60)
    pub fault_backoff_secs: u64,

    /// Number of recent messages fetched per cycle (default: 10)
    pub history_limit: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// `from_env` is a thin wrapper over this; tests feed a map instead of
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow::anyhow!("{key} environment variable is required"))
        };

        let manager_user_ids = split_list(&required("MANAGER_USER_IDS")?);
        if manager_user_ids.is_empty() {
            anyhow::bail!("MANAGER_USER_IDS must list at least one user ID");
        }

        let ack_emojis: Vec<String> = match lookup("ACK_EMOJIS") {
            Some(raw) => split_list(&raw)
                .iter()
                .map(|name| name.trim_matches(':').to_string())
                .filter(|name| !name.is_empty())
                .collect(),
            None => DEFAULT_ACK_EMOJIS.iter().map(|s| s.to_string()).collect(),
        };
        if ack_emojis.is_empty() {
            anyhow::bail!("ACK_EMOJIS must list at least one emoji name");
        }

        let escalation_marker = lookup("ESCALATION_MARKER")
            .unwrap_or_else(|| DEFAULT_ESCALATION_MARKER.to_string());
        if escalation_marker.trim().is_empty() {
            anyhow::bail!("ESCALATION_MARKER must not be empty");
        }

        let history_limit: u32 = parse_or(&lookup, "HISTORY_LIMIT", 10)?;
        if history_limit == 0 {
            anyhow::bail!("HISTORY_LIMIT must be greater than zero");
        }

        Ok(Self {
            slack_bot_token: required("SLACK_BOT_TOKEN")?,
            slack_api_base: lookup("SLACK_API_BASE")
                .unwrap_or_else(|| "https://slack.com/api".to_string()),
            slack_request_timeout_ms: parse_or(&lookup, "SLACK_REQUEST_TIMEOUT_MS", 10_000)?,
            escalation_channel_id: required("ESCALATION_CHANNEL_ID")?,
            manager_user_ids,
            ack_emojis,
            escalation_marker,
            ack_window_secs: parse_timer(&lookup, "ACK_WINDOW_SECS", 3600)?,
            notify_cooldown_secs: parse_timer(&lookup, "NOTIFY_COOLDOWN_SECS", 3600)?,
            poll_interval_secs: parse_timer(&lookup, "POLL_INTERVAL_SECS", 10)?,
            fault_backoff_secs: parse_timer(&lookup, "FAULT_BACKOFF_SECS", 60)?,
            history_limit,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} must be a valid {}", std::any::type_name::<T>())),
        None => Ok(default),
    }
}

/// Parse a duration in seconds, capped at `MAX_TIMER_SECS`.
fn parse_timer<F>(lookup: &F, key: &str, default: u64) -> anyhow::Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse_or(lookup, key, default)?;
    if secs > MAX_TIMER_SECS {
        anyhow::bail!("{key} must be at most {MAX_TIMER_SECS} seconds");
    }
    Ok(secs)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SLACK_BOT_TOKEN", "xoxb-test"),
            ("ESCALATION_CHANNEL_ID", "C05BCN82N5A"),
            ("MANAGER_USER_IDS", "U1, U2 ,U3"),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&minimal())).unwrap();
        assert_eq!(config.manager_user_ids, vec!["U1", "U2", "U3"]);
        assert_eq!(config.ack_emojis, vec!["eyes", "eyes-looking"]);
        assert_eq!(config.escalation_marker, DEFAULT_ESCALATION_MARKER);
        assert_eq!(config.ack_window_secs, 3600);
        assert_eq!(config.notify_cooldown_secs, 3600);
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.fault_backoff_secs, 60);
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.slack_api_base, "https://slack.com/api");
        assert_eq!(config.slack_request_timeout_ms, 10_000);
    }

    #[test]
    fn test_independent_timers() {
        let mut pairs = minimal();
        pairs.push(("ACK_WINDOW_SECS", "900"));
        pairs.push(("NOTIFY_COOLDOWN_SECS", "7200"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.ack_window_secs, 900);
        assert_eq!(config.notify_cooldown_secs, 7200);
    }

    #[test]
    fn test_ack_emojis_strip_colons() {
        let mut pairs = minimal();
        pairs.push(("ACK_EMOJIS", ":eyes:, white_check_mark"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.ack_emojis, vec!["eyes", "white_check_mark"]);
    }

    #[test]
    fn test_missing_token_rejected() {
        let pairs: Vec<_> = minimal()
            .into_iter()
            .filter(|(k, _)| *k != "SLACK_BOT_TOKEN")
            .collect();
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("SLACK_BOT_TOKEN"));
    }

    #[test]
    fn test_empty_roster_rejected() {
        let mut pairs = minimal();
        pairs.retain(|(k, _)| *k != "MANAGER_USER_IDS");
        pairs.push(("MANAGER_USER_IDS", " , ,"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("MANAGER_USER_IDS"));
    }

    #[test]
    fn test_invalid_number_rejected() {
        let mut pairs = minimal();
        pairs.push(("POLL_INTERVAL_SECS", "ten"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("POLL_INTERVAL_SECS"));
    }

    #[test]
    fn test_zero_history_limit_rejected() {
        let mut pairs = minimal();
        pairs.push(("HISTORY_LIMIT", "0"));
        assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_oversized_timers_rejected() {
        for key in ["ACK_WINDOW_SECS", "NOTIFY_COOLDOWN_SECS"] {
            let mut pairs = minimal();
            pairs.push((key, "10000000000000"));
            let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert!(err.to_string().contains(key));
        }
    }

    #[test]
    fn test_timer_at_ceiling_accepted() {
        let ceiling = MAX_TIMER_SECS.to_string();
        let mut pairs = minimal();
        pairs.push(("NOTIFY_COOLDOWN_SECS", ceiling.as_str()));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.notify_cooldown_secs, MAX_TIMER_SECS);
    }
}
