//! Turns captured request messages into replayable requests.

use super::header_override::HeaderOverride;
use super::message::RawHttpRequest;
use crate::capture::CapturedRequest;
use crate::error::{ReplayError, Result};
use bytes::Bytes;
use reqwest::header::{
    HeaderMap, HeaderName, CONNECTION, CONTENT_LENGTH, TE, TRAILER, TRANSFER_ENCODING, UPGRADE,
};
use reqwest::{Method, Url};
use tracing::debug;

/// Connection-scoped headers without a constant in `http`.
const HOP_BY_HOP: [&str; 2] = ["keep-alive", "proxy-connection"];

/// A request ready for dispatch.
#[derive(Debug, Clone)]
pub struct ReplayRequest {
    /// Position of the source item in the capture document.
    pub index: usize,
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ReplayRequest {
    /// Build from a recorded message, targeting the recorded absolute URL
    /// rather than whatever the request line carried.
    pub fn from_message(index: usize, url: &str, message: RawHttpRequest) -> Result<Self> {
        let url = parse_target(url)?;

        let mut headers = message.headers;
        strip_hop_by_hop(&mut headers);

        let recorded_target = &url[url::Position::BeforePath..];
        if message.target != recorded_target && message.target != url.as_str() {
            debug!(
                index,
                recorded = %message.target,
                target = %url,
                "request line target differs from recorded URL; using recorded URL"
            );
        }

        Ok(Self {
            index,
            method: message.method,
            url,
            headers,
            body: message.body,
        })
    }

    pub fn apply_override(&mut self, header: &HeaderOverride) {
        header.apply(&mut self.headers);
    }

    /// Client request for dispatch. The builder's copy is kept for reporting.
    pub fn to_http(&self) -> reqwest::Request {
        let mut request = reqwest::Request::new(self.method.clone(), self.url.clone());
        *request.headers_mut() = self.headers.clone();
        if !self.body.is_empty() {
            *request.body_mut() = Some(reqwest::Body::from(self.body.clone()));
        }
        request
    }
}

/// Build every captured request, applying the override uniformly.
pub fn build_requests(
    captured: Vec<CapturedRequest>,
    header: Option<&HeaderOverride>,
) -> Result<Vec<ReplayRequest>> {
    captured
        .into_iter()
        .map(|item| {
            let mut request = ReplayRequest::from_message(item.index, &item.url, item.message)?;
            if let Some(header) = header {
                request.apply_override(header);
            }
            Ok(request)
        })
        .collect()
}

fn parse_target(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|source| ReplayError::UrlParse {
        url: raw.to_string(),
        source,
    })?;
    if !url.has_host() {
        return Err(ReplayError::UrlParse {
            url: raw.to_string(),
            source: url::ParseError::EmptyHost,
        });
    }
    Ok(url)
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in [CONNECTION, CONTENT_LENGTH, TE, TRAILER, TRANSFER_ENCODING, UPGRADE] {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(HeaderName::from_static(name));
    }
}
