use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::ExtractError;

/// Text of one table row as rendered, plus its individual cells.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RowSnapshot {
    pub text: String,
    pub cells: Vec<String>,
}

impl RowSnapshot {
    pub fn new(text: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            text: text.into(),
            cells,
        }
    }
}

/// Launches browser sessions.
///
/// One session is opened per extraction attempt and closed before the
/// attempt returns.
#[async_trait]
pub trait PageBrowser: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PageSession>, ExtractError>;
}

/// A live page inside a launched browser.
///
/// Implementations must also release the underlying browser when dropped,
/// so a session abandoned mid-attempt (cancelled future, panic) cannot leak
/// a process. `close` is the orderly path.
#[async_trait]
pub trait PageSession: Send {
    /// Navigates and waits until the page has settled.
    async fn navigate(&mut self, url: &str) -> Result<(), ExtractError>;

    /// Resolves once any element's text contains `text`. Never times out
    /// on its own; the caller bounds it.
    async fn wait_for_text(&mut self, text: &str) -> Result<(), ExtractError>;

    /// All row-like elements currently in the document.
    async fn rows(&mut self) -> Result<Vec<RowSnapshot>, ExtractError>;

    /// Full rendered markup.
    async fn content(&mut self) -> Result<String, ExtractError>;

    async fn close(&mut self) -> Result<(), ExtractError>;
}
