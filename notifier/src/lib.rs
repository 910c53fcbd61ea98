pub mod errors;
pub mod notifier;
pub mod telegram;
pub mod templates;
pub mod transport;

pub use errors::NotifyError;
pub use notifier::{Notifier, RetryPolicy};
pub use telegram::TelegramClient;
pub use transport::MessageTransport;
