use chrono::{DateTime, Local};

/// Where the last successful reading stood relative to the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdState {
    /// No successful reading yet in this process.
    #[default]
    Unknown,
    /// At or below the threshold.
    Below,
    /// Strictly above the threshold.
    Above,
}

impl ThresholdState {
    pub fn classify(value: f64, threshold: f64) -> Self {
        if value > threshold {
            ThresholdState::Above
        } else {
            ThresholdState::Below
        }
    }

    pub fn is_above(&self) -> bool {
        matches!(self, ThresholdState::Above)
    }
}

/// Notification gate.
///
/// Below the threshold nothing is sent. Above it, every reading notifies
/// unless `change_only` is set, in which case only the rising edge
/// (`Unknown`/`Below` -> `Above`) does.
pub fn should_notify(previous: ThresholdState, current: ThresholdState, change_only: bool) -> bool {
    match (current, change_only) {
        (ThresholdState::Above, false) => true,
        (ThresholdState::Above, true) => !previous.is_above(),
        _ => false,
    }
}

/// Mutable monitor state. Lives for the process; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorState {
    pub last_state: ThresholdState,

    /// +1 per failed poll, back to 0 on a successful one. Nothing else
    /// touches it.
    pub consecutive_failures: u32,

    pub last_success_time: Option<DateTime<Local>>,
    pub last_heartbeat_time: Option<DateTime<Local>>,
}

impl MonitorState {
    pub fn register_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }

    pub fn register_success(&mut self, at: DateTime<Local>) {
        self.consecutive_failures = 0;
        self.last_success_time = Some(at);
    }

    /// True when the current streak is a positive multiple of `every`.
    pub fn failure_alert_due(&self, every: u32) -> bool {
        every > 0 && self.consecutive_failures > 0 && self.consecutive_failures % every == 0
    }
}
