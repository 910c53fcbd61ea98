use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::transport::MessageTransport;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Fixed pause between failed attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

/// Sends messages with bounded retries. Delivery failures are logged and
/// reported as `false`; they are never escalated further.
pub struct Notifier {
    transport: Arc<dyn MessageTransport>,
    policy: RetryPolicy,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MessageTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub async fn send(&self, message: &str) -> bool {
        self.send_with_attempts(message, self.policy.max_attempts).await
    }

    pub async fn send_with_attempts(&self, message: &str, max_attempts: u32) -> bool {
        for attempt in 1..=max_attempts {
            match self.transport.send_text(message).await {
                Ok(()) => {
                    info!(attempt, "message sent");
                    return true;
                }
                Err(e) => {
                    warn!(attempt, max_attempts, error = %e, "message delivery failed");
                }
            }

            if attempt < max_attempts {
                sleep(self.policy.backoff).await;
            }
        }

        error!(attempts = max_attempts, "giving up on message delivery");
        false
    }
}
