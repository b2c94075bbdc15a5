//! Error types for capture loading and request replay.
//!
//! Two families, split by how they propagate:
//! [`ReplayError`] aborts the run before anything is sent, while
//! [`ExchangeError`] is stored in the result slot of a single request.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the capture and building requests.
///
/// Any of these stops the run before the first request is dispatched.
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed capture markup: {0}")]
    Parse(String),
    #[error("item #{index}: request payload is not valid base64: {source}")]
    Decode {
        index: usize,
        #[source]
        source: base64::DecodeError,
    },
    #[error("item #{index}: malformed HTTP request: {reason}")]
    RequestSyntax { index: usize, reason: String },
    #[error("invalid target URL '{url}': {source}")]
    UrlParse {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ReplayError {
    pub(crate) fn syntax(index: usize, reason: impl Into<String>) -> Self {
        ReplayError::RequestSyntax {
            index,
            reason: reason.into(),
        }
    }
}

/// Failure of one replayed exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("network error: {0}")]
    Network(String),
    #[error("replay task failed: {0}")]
    Task(String),
}

impl ExchangeError {
    /// Classify a client error, keeping timeouts distinct from other transport failures.
    pub fn from_reqwest(error: &reqwest::Error, timeout_ms: u64) -> Self {
        if error.is_timeout() {
            return ExchangeError::Timeout { timeout_ms };
        }

        // The top-level message is often just "error sending request"; the
        // useful part (refused, reset, dns) lives further down the chain.
        let mut message = error.to_string();
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ExchangeError::Network(message)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExchangeError::Timeout { .. })
    }
}

pub type Result<T, E = ReplayError> = std::result::Result<T, E>;
