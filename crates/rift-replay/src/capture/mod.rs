//! Capture file loading.
//!
//! A capture is a proxy history export: an XML document listing recorded
//! exchanges, with each request stored as (usually base64-encoded) raw bytes.
//! Loading is all-or-nothing: the first malformed item fails the whole file.
//!
//! # Module Structure
//!
//! - `types` - Serde model of the export document
//! - `parser` - Reading, decoding and request extraction

mod parser;
mod types;

pub use parser::{load_capture, parse_document, requests_from_document};
pub use types::{CaptureDocument, CaptureItem, HostField, Payload};

use crate::request::RawHttpRequest;

/// A decoded request from the capture, positioned by its source item.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Index of the item in the document, counting items without requests.
    pub index: usize,
    /// The recorded absolute URL.
    pub url: String,
    pub message: RawHttpRequest,
}
