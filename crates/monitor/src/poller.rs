use std::time::Duration;

use escalation_common::client::MessagingClient;
use escalation_engine::clock::Clock;
use escalation_engine::{CycleReport, EscalationMonitor};

/// What a single loop iteration ended with.
#[derive(Debug)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// The cycle failed; the loop backed off before returning.
    Faulted,
}

/// Fixed-interval poll loop around an `EscalationMonitor`.
///
/// Sequential by construction: one cycle, then a sleep, then the next cycle.
pub struct MonitorLoop<C, K> {
    client: C,
    clock: K,
    monitor: EscalationMonitor,
    poll_interval: Duration,
    fault_backoff: Duration,
}

impl<C, K> MonitorLoop<C, K>
where
    C: MessagingClient,
    K: Clock,
{
    pub fn new(
        client: C,
        clock: K,
        monitor: EscalationMonitor,
        poll_interval: Duration,
        fault_backoff: Duration,
    ) -> Self {
        Self {
            client,
            clock,
            monitor,
            poll_interval,
            fault_backoff,
        }
    }

    pub fn monitor(&self) -> &EscalationMonitor {
        &self.monitor
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Start the polling loop. Runs indefinitely until the task is cancelled.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        tracing::info!(
            channel = %self.monitor.settings().channel_id,
            managers = self.monitor.settings().manager_user_ids.len(),
            poll_interval_secs = self.poll_interval.as_secs(),
            "Starting escalation monitoring"
        );

        loop {
            self.tick().await;
        }
    }

    /// Run one cycle, then sleep the poll interval (or the fault backoff if
    /// the cycle failed).
    pub async fn tick(&mut self) -> CycleOutcome {
        let now = self.clock.now();

        match self.monitor.run_cycle(&self.client, now).await {
            Ok(report) => {
                tracing::debug!(
                    fetched = report.fetched,
                    matched = report.matched,
                    tracked = self.monitor.tracker().tracked_count(),
                    unacknowledged = report.unacknowledged.len(),
                    notified = report.notified(),
                    "Poll cycle complete"
                );
                self.clock.sleep(self.poll_interval).await;
                CycleOutcome::Completed(report)
            }
            Err(e) => {
                if e.is_platform_fault() {
                    tracing::error!(error = %e, backoff_secs = self.fault_backoff.as_secs(), "Slack API error");
                } else {
                    tracing::error!(error = %e, backoff_secs = self.fault_backoff.as_secs(), "Unexpected error");
                }
                self.clock.sleep(self.fault_backoff).await;
                CycleOutcome::Faulted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, TimeDelta, Utc};
    use escalation_common::error::AppError;
    use escalation_common::types::{ChannelMessage, Reaction};
    use escalation_engine::MonitorSettings;
    use escalation_engine::clock::ManualClock;

    use super::*;

    /// One escalation in the channel; history fetches fail while `outage` is set.
    struct OneEscalation {
        outage: Mutex<Option<AppError>>,
        sent: Mutex<u32>,
    }

    impl OneEscalation {
        fn new() -> Self {
            Self {
                outage: Mutex::new(None),
                sent: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl MessagingClient for OneEscalation {
        async fn fetch_recent_messages(
            &self,
            _channel: &str,
            _limit: u32,
        ) -> Result<Vec<ChannelMessage>, AppError> {
            if let Some(err) = self.outage.lock().unwrap().take() {
                return Err(err);
            }
            Ok(vec![ChannelMessage::new(
                "1712.0001",
                "Digital Support Escalation Request: printer on fire",
            )])
        }

        async fn fetch_reactions(&self, _channel: &str, _ts: &str) -> Result<Vec<Reaction>, AppError> {
            Ok(vec![])
        }

        async fn fetch_permalink(&self, _channel: &str, ts: &str) -> Result<String, AppError> {
            Ok(format!("https://example.slack.com/p{ts}"))
        }

        async fn send_direct_message(&self, _recipient: &str, _text: &str) -> Result<(), AppError> {
            *self.sent.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn make_loop() -> MonitorLoop<OneEscalation, ManualClock> {
        let monitor = EscalationMonitor::new(MonitorSettings {
            channel_id: "C1".to_string(),
            escalation_marker: "Digital Support Escalation Request".to_string(),
            history_limit: 10,
            ack_window: TimeDelta::seconds(3600),
            notify_cooldown: TimeDelta::seconds(3600),
            ack_emojis: vec!["eyes".to_string()],
            manager_user_ids: vec!["U1".to_string(), "U2".to_string()],
        });
        MonitorLoop::new(
            OneEscalation::new(),
            ManualClock::new(start()),
            monitor,
            Duration::from_secs(10),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn test_successful_cycle_sleeps_poll_interval() {
        let mut poller = make_loop();
        let outcome = poller.tick().await;

        assert!(matches!(outcome, CycleOutcome::Completed(ref r) if r.discovered == 1));
        assert_eq!(poller.clock.sleeps(), vec![Duration::from_secs(10)]);
        assert_eq!(poller.clock.now(), start() + TimeDelta::seconds(10));
    }

    #[tokio::test]
    async fn test_platform_fault_backs_off_and_keeps_state() {
        let mut poller = make_loop();
        poller.tick().await;

        *poller.client.outage.lock().unwrap() =
            Some(AppError::slack("conversations.history", "ratelimited"));
        let outcome = poller.tick().await;

        assert!(matches!(outcome, CycleOutcome::Faulted));
        assert_eq!(
            poller.clock.sleeps(),
            vec![Duration::from_secs(10), Duration::from_secs(60)]
        );
        let entry = poller.monitor().tracker().get("1712.0001").unwrap();
        assert_eq!(entry.first_seen_at, start());

        // Back to normal cadence once the fetch succeeds again
        assert!(matches!(poller.tick().await, CycleOutcome::Completed(_)));
        assert_eq!(poller.clock.sleeps().last(), Some(&Duration::from_secs(10)));
    }

    #[tokio::test]
    async fn test_unexpected_fault_also_backs_off() {
        let mut poller = make_loop();
        *poller.client.outage.lock().unwrap() = Some(AppError::Decode(
            "conversations.history: expected value".into(),
        ));

        assert!(matches!(poller.tick().await, CycleOutcome::Faulted));
        assert_eq!(poller.clock.sleeps(), vec![Duration::from_secs(60)]);
    }

    #[tokio::test]
    async fn test_hours_of_cycles_notify_once() {
        let mut poller = make_loop();

        // 3 hours at 10s per cycle
        for _ in 0..1080 {
            poller.tick().await;
        }

        // Two managers, one message, one batch
        assert_eq!(*poller.client().sent.lock().unwrap(), 2);
        let entry = poller.monitor().tracker().get("1712.0001").unwrap();
        assert!(entry.notified);
    }
}
