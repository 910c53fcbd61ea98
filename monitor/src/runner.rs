//! Single-shot, continuous and connection-test modes.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use common::logger::{TraceId, child_span, cycle_span};
use futures::FutureExt;
use notifier::templates;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{Instrument, error, info, warn};

use crate::monitor::Monitor;

const CONNECTION_TEST_ATTEMPTS: u32 = 2;

/// Runs one poll. Nothing carries over to a later invocation.
pub async fn run_once(monitor: &mut Monitor) -> bool {
    let trace_id = TraceId::new();
    monitor.poll().instrument(cycle_span("once", &trace_id)).await
}

/// Polls every `check_interval` until `shutdown` flips to `true`.
///
/// Shutdown is observed before each cycle and while sleeping; an in-flight
/// poll always runs to completion. A panicking cycle counts as a failed
/// poll and the loop carries on.
pub async fn run_continuous(monitor: &mut Monitor, mut shutdown: watch::Receiver<bool>) {
    let interval = monitor.config().check_interval();
    info!(
        asset = %monitor.config().asset_name,
        url = %monitor.config().url,
        threshold = monitor.config().liquidity_threshold,
        interval_secs = interval.as_secs(),
        change_only = monitor.config().notify_on_change_only,
        "starting continuous monitoring"
    );

    let notice = templates::startup_notice(monitor.config(), &common::time::now());
    if !monitor.notifier().send(&notice).await {
        warn!("startup notice was not delivered");
    }

    let mut cycle: u64 = 0;
    loop {
        if *shutdown.borrow() {
            info!(cycles = cycle, "shutdown requested, stopping");
            break;
        }

        cycle += 1;
        let trace_id = TraceId::new();
        let span = cycle_span("run", &trace_id);
        info!(cycle, at = %common::time::display(&common::time::now()), "==== check ====");

        let work = AssertUnwindSafe(async {
            monitor.poll().await;
            monitor
                .check_heartbeat(common::time::now())
                .instrument(child_span("heartbeat"))
                .await;
        })
        .catch_unwind()
        .instrument(span.clone())
        .await;

        if let Err(panic) = work {
            error!(cycle, panic = %panic_message(panic.as_ref()), "poll cycle panicked");
            monitor.record_failure().instrument(span).await;
        }

        let next = common::time::now()
            + chrono::Duration::from_std(interval).unwrap_or_else(|_| chrono::Duration::zero());
        info!(next_check = %common::time::display(&next), "sleeping until next check");

        if sleep_or_shutdown(interval, &mut shutdown).await {
            info!(cycles = cycle, "shutdown requested, stopping");
            break;
        }
    }
}

/// Returns `true` when shutdown was signalled before `duration` elapsed.
async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let deadline = sleep(duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => return false,
            changed = shutdown.changed() => match changed {
                Ok(()) if *shutdown.borrow() => return true,
                Ok(()) => continue,
                // Sender gone: no further signal can arrive.
                Err(_) => {
                    deadline.await;
                    return false;
                }
            },
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Outcome of `test` mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionReport {
    /// The reading, or why there is none.
    pub extraction: Result<f64, String>,
    pub message_sent: bool,
}

impl ConnectionReport {
    pub fn passed(&self) -> bool {
        self.extraction.is_ok() && self.message_sent
    }
}

/// One short extraction plus one test message. Leaves monitor state alone.
pub async fn run_connection_test(monitor: &Monitor) -> ConnectionReport {
    let trace_id = TraceId::new();
    let span = cycle_span("test", &trace_id);

    async {
        let extraction = monitor
            .extractor()
            .extract(monitor.config(), CONNECTION_TEST_ATTEMPTS)
            .await
            .map(|r| r.value)
            .map_err(|e| e.to_string());

        let message_sent = monitor.notifier().send(&templates::connection_test()).await;

        info!(extraction_ok = extraction.is_ok(), message_sent, "connection test finished");
        ConnectionReport {
            extraction,
            message_sent,
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_are_readable() {
        let s: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(s.as_ref()), "boom");

        let s: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(s.as_ref()), "bang");

        let s: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(s.as_ref()), "unknown panic");
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_is_cut_short_by_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        let started = tokio::time::Instant::now();

        let stop = async {
            sleep(Duration::from_secs(10)).await;
            tx.send(true).ok();
        };
        let (stopped, ()) = tokio::join!(sleep_or_shutdown(Duration::from_secs(60), &mut rx), stop);

        assert!(stopped);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_sender_falls_back_to_plain_sleep() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);

        assert!(!sleep_or_shutdown(Duration::from_secs(5), &mut rx).await);
    }
}
