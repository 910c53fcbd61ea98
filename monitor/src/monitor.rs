use std::sync::Arc;

use chrono::{DateTime, Local};
use common::MonitorConfig;
use extractor::{LiquidityReading, PageExtractor};
use notifier::{Notifier, templates};
use tracing::{Span, debug, error, info, warn};

use crate::state::{MonitorState, ThresholdState, should_notify};

/// Owns the extractor, the notifier and all mutable state for one process.
pub struct Monitor {
    config: Arc<MonitorConfig>,
    extractor: PageExtractor,
    notifier: Notifier,
    state: MonitorState,
}

impl Monitor {
    pub fn new(config: Arc<MonitorConfig>, extractor: PageExtractor, notifier: Notifier) -> Self {
        Self {
            config,
            extractor,
            notifier,
            state: MonitorState::default(),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn extractor(&self) -> &PageExtractor {
        &self.extractor
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// One extraction plus threshold evaluation.
    ///
    /// Returns whether a reading was obtained. Notification outcomes do not
    /// affect the result.
    pub async fn poll(&mut self) -> bool {
        info!(asset = %self.config.asset_name, "checking liquidity");

        match self
            .extractor
            .extract(&self.config, PageExtractor::DEFAULT_ATTEMPTS)
            .await
        {
            Ok(reading) => {
                self.state.register_success(reading.captured_at);
                Span::current().record("value", reading.value);
                self.evaluate(&reading).await;
                Span::current().record("outcome", "ok");
                true
            }
            Err(e) => {
                error!(error = %e, "could not read liquidity");
                self.record_failure().await;
                Span::current().record("outcome", "failed");
                false
            }
        }
    }

    /// Counts a failed poll and sends the streak alert on every
    /// `max_failures_before_alert`-th consecutive failure.
    pub async fn record_failure(&mut self) {
        let failures = self.state.register_failure();
        warn!(consecutive_failures = failures, "poll failed");

        if !self.state.failure_alert_due(self.config.max_failures_before_alert) {
            return;
        }

        let now = common::time::now();
        let message = templates::failure_alert(
            &self.config,
            failures,
            self.state.last_success_time.as_ref(),
            &now,
        );
        if !self.notifier.send(&message).await {
            error!(consecutive_failures = failures, "failure alert was not delivered");
        }
    }

    async fn evaluate(&mut self, reading: &LiquidityReading) {
        let threshold = self.config.liquidity_threshold;
        let current = ThresholdState::classify(reading.value, threshold);
        let previous = std::mem::replace(&mut self.state.last_state, current);

        info!(
            value = reading.value,
            threshold,
            state = ?current,
            previous = ?previous,
            "liquidity evaluated"
        );

        if !should_notify(previous, current, self.config.notify_on_change_only) {
            debug!("no alert for this reading");
            return;
        }

        let message = templates::threshold_alert(&self.config, reading.value, &reading.captured_at);
        if self.notifier.send(&message).await {
            info!(value = reading.value, "threshold alert sent");
        } else {
            error!(value = reading.value, "threshold alert was not delivered");
        }
    }

    /// Sends a heartbeat once `heartbeat_interval` has passed since the last
    /// one. The first call only records `now` as the baseline. The baseline
    /// moves only when the heartbeat is actually delivered.
    pub async fn check_heartbeat(&mut self, now: DateTime<Local>) -> bool {
        let Some(last) = self.state.last_heartbeat_time else {
            debug!("heartbeat baseline recorded");
            self.state.last_heartbeat_time = Some(now);
            return false;
        };

        if now - last < self.config.heartbeat_interval() {
            return false;
        }

        let message = templates::heartbeat(&self.config, self.state.last_success_time.as_ref(), &now);
        if self.notifier.send(&message).await {
            info!("heartbeat sent");
            self.state.last_heartbeat_time = Some(now);
            true
        } else {
            warn!("heartbeat not delivered, will retry next cycle");
            false
        }
    }
}
