//! Threshold monitoring over a single scraped liquidity figure.
//!
//! Runner -> Monitor::poll -> PageExtractor -> Monitor (decide) -> Notifier

pub mod monitor;
pub mod runner;
pub mod state;

pub use monitor::Monitor;
pub use runner::{ConnectionReport, run_connection_test, run_continuous, run_once};
pub use state::{MonitorState, ThresholdState, should_notify};
