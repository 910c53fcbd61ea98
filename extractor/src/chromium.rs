//! Headless Chromium driven over the DevTools protocol.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::browser::{PageBrowser, PageSession, RowSnapshot};
use crate::errors::ExtractError;

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const ROW_SELECTOR: &str = r#"tr, [role="row"], .MuiTableRow-root"#;
const CELL_SELECTOR: &str = r#"td, [role="cell"], .MuiTableCell-root"#;

const TEXT_POLL_EVERY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct ChromiumBrowser {
    width: u32,
    height: u32,
    user_agent: String,
}

impl ChromiumBrowser {
    pub fn new(width: u32, height: u32, user_agent: impl Into<String>) -> Self {
        Self {
            width,
            height,
            user_agent: user_agent.into(),
        }
    }
}

impl Default for ChromiumBrowser {
    fn default() -> Self {
        Self::new(1920, 1080, USER_AGENT)
    }
}

#[async_trait]
impl PageBrowser for ChromiumBrowser {
    #[instrument(skip(self), level = "debug")]
    async fn open(&self) -> Result<Box<dyn PageSession>, ExtractError> {
        let config = BrowserConfig::builder()
            .window_size(self.width, self.height)
            .viewport(Viewport {
                width: self.width,
                height: self.height,
                ..Default::default()
            })
            .arg(format!("--user-agent={}", self.user_agent))
            .build()
            .map_err(ExtractError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ExtractError::Launch(e.to_string()))?;

        // The handler stream must be polled for any CDP command to complete.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "cdp handler event error");
                }
            }
        });

        let mut session = ChromiumSession {
            browser,
            handler_task,
            page: None,
            closed: false,
        };
        session.page = Some(session.browser.new_page("about:blank").await?);

        debug!("browser session opened");
        Ok(Box::new(session))
    }
}

pub struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Option<Page>,
    closed: bool,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page, ExtractError> {
        self.page
            .as_ref()
            .ok_or_else(|| ExtractError::Browser("page not open".to_string()))
    }
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ExtractError> {
        let page = self.page()?;
        page.goto(url).await?;
        page.wait_for_navigation().await?;
        Ok(())
    }

    async fn wait_for_text(&mut self, text: &str) -> Result<(), ExtractError> {
        let needle = serde_json::to_string(text).map_err(|e| ExtractError::Browser(e.to_string()))?;
        let script = format!("document.body !== null && document.body.innerText.includes({needle})");

        let page = self.page()?;
        wait_until(TEXT_POLL_EVERY, || async {
            page.evaluate(script.as_str())
                .await?
                .into_value::<bool>()
                .map_err(|e| ExtractError::Browser(e.to_string()))
        })
        .await;
        Ok(())
    }

    async fn rows(&mut self) -> Result<Vec<RowSnapshot>, ExtractError> {
        // One round trip for every row and cell instead of one per element.
        let script = format!(
            "Array.from(document.querySelectorAll('{ROW_SELECTOR}')).map(function (r) {{ \
               return {{ text: r.innerText || '', \
                         cells: Array.from(r.querySelectorAll('{CELL_SELECTOR}')) \
                                  .map(function (c) {{ return c.innerText || ''; }}) }}; \
             }})"
        );

        let rows: Vec<RowSnapshot> = self
            .page()?
            .evaluate(script.as_str())
            .await?
            .into_value()
            .map_err(|e| ExtractError::Browser(e.to_string()))?;
        Ok(rows)
    }

    async fn content(&mut self) -> Result<String, ExtractError> {
        Ok(self.page()?.content().await?)
    }

    async fn close(&mut self) -> Result<(), ExtractError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "browser process did not exit cleanly");
        }
        self.handler_task.abort();

        closed.map(|_| ()).map_err(ExtractError::from)
    }
}

/// Polls `check` until it reports `true`. Errors count as "not yet": the
/// SPA swaps its execution context while routing, and the caller's timeout
/// bounds the wait.
async fn wait_until<F, Fut>(every: Duration, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, ExtractError>>,
{
    loop {
        match check().await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => debug!(error = %e, "marker check failed, polling again"),
        }
        tokio::time::sleep(every).await;
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        // `Browser`'s own drop kills the child process if still running.
        self.handler_task.abort();
        if !self.closed {
            warn!("browser session dropped without close");
        }
    }
}
