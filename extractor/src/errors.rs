use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("timed out after {timeout:?} while {stage}")]
    Timeout {
        stage: &'static str,
        timeout: Duration,
    },

    #[error("no row containing {0:?} on the page")]
    RowNotFound(String),

    #[error("row for {0:?} found but no liquidity figure matched")]
    NoMatch(String),

    #[error("could not write debug dump: {0}")]
    Dump(#[from] std::io::Error),

    #[error("invalid asset pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("extraction was not attempted")]
    NotAttempted,
}

impl From<chromiumoxide::error::CdpError> for ExtractError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        ExtractError::Browser(e.to_string())
    }
}
