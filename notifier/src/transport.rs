use async_trait::async_trait;

use crate::errors::NotifyError;

/// Delivers one rich-text (HTML) message to the configured recipient.
///
/// One call is one attempt; retrying is the caller's job.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<(), NotifyError>;
}
