use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram rejected the message: {0}")]
    Rejected(String),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}
