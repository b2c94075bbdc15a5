//! Reads a capture file and extracts its requests.

use super::types::CaptureDocument;
use super::CapturedRequest;
use crate::error::{ReplayError, Result};
use crate::request::RawHttpRequest;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;
use tracing::{debug, info};

/// Read and fully decode a capture file.
pub fn load_capture<P: AsRef<Path>>(path: P) -> Result<Vec<CapturedRequest>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let document = parse_document(&bytes)?;
    info!(
        path = %path.display(),
        items = document.items.len(),
        burp_version = %document.burp_version,
        "capture loaded"
    );
    requests_from_document(&document)
}

const ROOT_ELEMENT: &str = "items";

/// Parse capture markup without decoding any payloads.
///
/// The document element must be `<items>`; any other well-formed XML is
/// rejected rather than read as an empty capture.
pub fn parse_document(bytes: &[u8]) -> Result<CaptureDocument> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ReplayError::Parse(format!("capture is not valid UTF-8: {e}")))?;

    if let Some(root) = root_element(text)? {
        if root != ROOT_ELEMENT {
            return Err(ReplayError::Parse(format!(
                "expected <{ROOT_ELEMENT}> root, found <{root}>"
            )));
        }
    }
    quick_xml::de::from_str(text).map_err(|e| ReplayError::Parse(e.to_string()))
}

/// Name of the first element, skipping the prolog (declaration, DOCTYPE, comments).
fn root_element(text: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) | Ok(Event::Empty(tag)) => {
                return Ok(Some(
                    String::from_utf8_lossy(tag.name().as_ref()).into_owned(),
                ))
            }
            Ok(Event::Eof) => return Ok(None),
            Ok(_) => {}
            Err(e) => return Err(ReplayError::Parse(e.to_string())),
        }
    }
}

/// Decode every item that carries a request, in document order.
///
/// Items without request content are skipped.
pub fn requests_from_document(document: &CaptureDocument) -> Result<Vec<CapturedRequest>> {
    let mut requests = Vec::with_capacity(document.items.len());

    for (index, item) in document.items.iter().enumerate() {
        if !item.has_request() {
            debug!(index, url = %item.url, "item has no request, skipping");
            continue;
        }

        let raw = item
            .request
            .decode()
            .map_err(|source| ReplayError::Decode { index, source })?;
        let message = RawHttpRequest::parse(&raw)
            .map_err(|e| ReplayError::syntax(index, e.to_string()))?;

        debug!(index, method = %message.method, url = %item.url, "parsed captured request");
        requests.push(CapturedRequest {
            index,
            url: item.url.trim().to_string(),
            message,
        });
    }

    Ok(requests)
}
