//! Retrying page extraction.
//!
//! Each attempt runs NAVIGATE -> WAIT_FOR_TARGET -> SCAN_ROWS inside its own
//! browser session and closes the session before returning, whatever the
//! outcome. Failures are retried with a fixed backoff; only the last reason
//! is surfaced.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use common::MonitorConfig;
use tokio::time::{sleep, timeout};
use tracing::{Instrument, debug, error, info, warn};

use crate::browser::{PageBrowser, PageSession};
use crate::errors::ExtractError;
use crate::strategy::{RowMatcher, Strategy};

#[derive(Debug, Clone)]
pub struct ExtractorSettings {
    /// Upper bound for the asset marker to appear after navigation.
    pub target_wait: Duration,

    /// Pause after the marker shows up, for late-bound figures to render.
    pub settle_delay: Duration,

    /// Pause between failed attempts.
    pub retry_backoff: Duration,

    /// Where the rendered markup goes when extraction fails. Overwritten.
    pub debug_dump_path: PathBuf,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            target_wait: Duration::from_secs(30),
            settle_delay: Duration::from_secs(3),
            retry_backoff: Duration::from_secs(5),
            debug_dump_path: PathBuf::from("debug_page.html"),
        }
    }
}

/// One successful extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidityReading {
    pub value: f64,
    pub strategy: Strategy,
    pub captured_at: DateTime<Local>,
}

pub struct PageExtractor {
    browser: Arc<dyn PageBrowser>,
    settings: ExtractorSettings,
}

impl PageExtractor {
    pub const DEFAULT_ATTEMPTS: u32 = 3;

    pub fn new(browser: Arc<dyn PageBrowser>, settings: ExtractorSettings) -> Self {
        Self { browser, settings }
    }

    pub fn settings(&self) -> &ExtractorSettings {
        &self.settings
    }

    /// Tries up to `max_attempts` times; the error is the last attempt's.
    pub async fn extract(
        &self,
        config: &MonitorConfig,
        max_attempts: u32,
    ) -> Result<LiquidityReading, ExtractError> {
        let matcher = RowMatcher::new(&config.asset_name)?;
        let mut last_err = ExtractError::NotAttempted;

        for attempt in 1..=max_attempts {
            let span = tracing::info_span!("extract_attempt", attempt, max_attempts);

            match self.attempt(config, &matcher).instrument(span).await {
                Ok(reading) => return Ok(reading),
                Err(e) => {
                    warn!(attempt, max_attempts, error = %e, "extraction attempt failed");
                    last_err = e;
                }
            }

            if attempt < max_attempts {
                debug!(backoff_ms = self.settings.retry_backoff.as_millis() as u64, "retrying");
                sleep(self.settings.retry_backoff).await;
            }
        }

        error!(attempts = max_attempts, error = %last_err, "extraction failed");
        Err(last_err)
    }

    async fn attempt(
        &self,
        config: &MonitorConfig,
        matcher: &RowMatcher,
    ) -> Result<LiquidityReading, ExtractError> {
        info!("launching browser");
        let mut session = self.browser.open().await?;

        let outcome = self.scan(session.as_mut(), config, matcher).await;

        if let Err(e) = session.close().await {
            warn!(error = %e, "browser session did not close cleanly");
        }

        outcome
    }

    async fn scan(
        &self,
        session: &mut dyn PageSession,
        config: &MonitorConfig,
        matcher: &RowMatcher,
    ) -> Result<LiquidityReading, ExtractError> {
        let asset = config.asset_name.as_str();

        info!(url = %config.url, "navigating");
        let page_timeout = config.page_timeout();
        timeout(page_timeout, session.navigate(&config.url))
            .await
            .map_err(|_| ExtractError::Timeout {
                stage: "navigating",
                timeout: page_timeout,
            })??;

        debug!(marker = asset, "waiting for asset marker");
        timeout(self.settings.target_wait, session.wait_for_text(asset))
            .await
            .map_err(|_| ExtractError::Timeout {
                stage: "waiting for asset marker",
                timeout: self.settings.target_wait,
            })??;

        sleep(self.settings.settle_delay).await;

        let rows = session.rows().await?;
        debug!(row_count = rows.len(), "scanning rows");

        let mut candidates = 0u32;
        for row in rows.iter().filter(|r| r.text.contains(asset)) {
            candidates += 1;
            info!(candidate = candidates, row = %preview(&row.text), "found asset row");
            for (i, cell) in row.cells.iter().enumerate() {
                debug!(cell = i, text = %cell, "row cell");
            }

            if let Some((value, strategy)) = matcher.extract(&row.text) {
                info!(value, strategy = %strategy, candidate = candidates, "liquidity extracted");
                return Ok(LiquidityReading {
                    value,
                    strategy,
                    captured_at: common::time::now(),
                });
            }
            debug!(candidate = candidates, "no strategy matched, trying next row");
        }

        self.dump_page(session).await;
        if candidates == 0 {
            Err(ExtractError::RowNotFound(asset.to_string()))
        } else {
            warn!(candidates, "no strategy matched any asset row");
            Err(ExtractError::NoMatch(asset.to_string()))
        }
    }

    async fn dump_page(&self, session: &mut dyn PageSession) {
        let path = &self.settings.debug_dump_path;
        let result = async {
            let html = session.content().await?;
            tokio::fs::write(path, html).await?;
            Ok::<_, ExtractError>(())
        }
        .await;

        match result {
            Ok(()) => info!(path = %path.display(), "page markup saved for debugging"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to save page markup"),
        }
    }
}

fn preview(text: &str) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    flat.chars().take(100).collect()
}
