use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("Artifact error: {0}")]
    Artifact(#[from] harvest_core::HarvestError),

    #[error("Browser error: {0}")]
    Browser(#[from] harvest_browser::BrowserError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Listing {ordinal} has no link matching '{selector}'")]
    MissingLink { ordinal: usize, selector: String },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Sentinel '{selector}' not found after {attempts} scrolls ({elapsed:?})")]
    SentinelNotFound {
        selector: String,
        attempts: u32,
        elapsed: Duration,
    },
}

pub type Result<T> = std::result::Result<T, StageError>;
