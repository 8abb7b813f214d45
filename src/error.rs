//! Error taxonomy for the alert engine.
//!
//! Only [`AlertError`] ever reaches a caller; the others are recovered from
//! inside the scheduler and end up in logs, metrics, or delivery records.

use thiserror::Error;

/// Failure talking to an upstream quote source.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("market data request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("market data source returned status {0}")]
    Status(u16),
    #[error("market data response is missing {0}")]
    MissingField(&'static str),
    #[error("market data field {field} is not a number: {value}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid market data url: {0}")]
    Url(#[from] url::ParseError),
}

/// Failure delivering on a single notification channel.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("channel rejected delivery with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("missing provider credential {0}")]
    MissingCredential(&'static str),
    #[error("invalid delivery url: {0}")]
    Url(#[from] url::ParseError),
}

impl NotifyError {
    /// Transport errors and server-side rejections are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            NotifyError::Http(e) => !e.is_builder(),
            NotifyError::Rejected { status, .. } => *status == 429 || *status >= 500,
            NotifyError::MissingCredential(_) | NotifyError::Url(_) => false,
        }
    }
}

/// Errors surfaced to REST callers.
#[derive(Debug, Error, PartialEq)]
pub enum AlertError {
    #[error("alert not found at index {0}")]
    NotFound(usize),
    #[error("invalid alert: {0}")]
    Invalid(String),
}
