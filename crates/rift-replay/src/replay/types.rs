//! Result types for replayed exchanges.

use crate::error::ExchangeError;
use crate::request::ReplayRequest;
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Version};
use std::time::Duration;

/// What came back for a replayed request. Only the head is kept; the body is
/// drained up to a small limit and dropped.
#[derive(Debug, Clone)]
pub struct ReplayResponse {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    /// Time until the response head arrived.
    pub elapsed: Duration,
}

impl ReplayResponse {
    /// Status line without the protocol, e.g. `200 OK`.
    pub fn status_line(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {}", self.status.as_u16(), reason),
            None => self.status.as_u16().to_string(),
        }
    }
}

/// A request paired with its response or failure.
#[derive(Debug)]
pub struct ReplayResult {
    pub request: ReplayRequest,
    pub outcome: Result<ReplayResponse, ExchangeError>,
}

impl ReplayResult {
    pub fn response(&self) -> Option<&ReplayResponse> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ExchangeError> {
        self.outcome.as_ref().err()
    }

    pub fn is_response(&self) -> bool {
        self.outcome.is_ok()
    }
}
