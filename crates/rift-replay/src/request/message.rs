//! Parsing of raw HTTP/1.x request messages embedded in a capture.

use bytes::Bytes;
use httparse::Status;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, TRANSFER_ENCODING};
use reqwest::Method;
use std::borrow::Cow;
use thiserror::Error;

const MAX_HEADERS: usize = 128;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MessageError {
    #[error("incomplete request head")]
    Incomplete,
    #[error("bad request head: {0}")]
    Head(#[from] httparse::Error),
    #[error("invalid method '{0}'")]
    Method(String),
    #[error("invalid header '{0}'")]
    Header(String),
    #[error("invalid content-length '{0}'")]
    ContentLength(String),
    #[error("body is {actual} bytes but content-length declares {declared}")]
    ShortBody { declared: usize, actual: usize },
    #[error("malformed chunked body")]
    Chunked,
}

/// A request message as it was recorded on the wire.
#[derive(Debug, Clone)]
pub struct RawHttpRequest {
    pub method: Method,
    /// Request target from the request line, often just a path.
    pub target: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawHttpRequest {
    pub fn parse(data: &[u8]) -> Result<Self, MessageError> {
        let (data, downgraded) = normalize_version(data);

        let mut slots = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut head = httparse::Request::new(&mut slots);
        let head_len = match head.parse(&data)? {
            Status::Complete(len) => len,
            Status::Partial => return Err(MessageError::Incomplete),
        };

        let method_str = head.method.ok_or(MessageError::Incomplete)?;
        let method = Method::from_bytes(method_str.as_bytes())
            .map_err(|_| MessageError::Method(method_str.to_string()))?;
        let target = head.path.ok_or(MessageError::Incomplete)?.to_string();

        let mut headers = HeaderMap::with_capacity(head.headers.len());
        for header in head.headers.iter() {
            let name = HeaderName::from_bytes(header.name.as_bytes())
                .map_err(|_| MessageError::Header(header.name.to_string()))?;
            let value = HeaderValue::from_bytes(header.value)
                .map_err(|_| MessageError::Header(header.name.to_string()))?;
            headers.append(name, value);
        }

        let rest = &data[head_len..];
        let body = if is_chunked(&headers) {
            dechunk(rest)?
        } else if let Some(declared) = content_length(&headers)? {
            if rest.len() < declared {
                return Err(MessageError::ShortBody {
                    declared,
                    actual: rest.len(),
                });
            }
            Bytes::copy_from_slice(&rest[..declared])
        } else if downgraded {
            // HTTP/2 exports carry no framing headers; whatever follows the head is the body
            Bytes::copy_from_slice(rest)
        } else {
            Bytes::new()
        };

        Ok(Self {
            method,
            target,
            headers,
            body,
        })
    }
}

/// Rewrite an `HTTP/2` request line to HTTP/1.1 so the head parser accepts it.
fn normalize_version(data: &[u8]) -> (Cow<'_, [u8]>, bool) {
    let line_end = data
        .iter()
        .position(|b| *b == b'\n')
        .unwrap_or(data.len());
    let line = data[..line_end].strip_suffix(b"\r").unwrap_or(&data[..line_end]);

    for version in [&b" HTTP/2"[..], &b" HTTP/2.0"[..]] {
        if let Some(prefix) = line.strip_suffix(version) {
            let mut rewritten = Vec::with_capacity(data.len() + 4);
            rewritten.extend_from_slice(prefix);
            rewritten.extend_from_slice(b" HTTP/1.1");
            rewritten.extend_from_slice(&data[line.len()..]);
            return (Cow::Owned(rewritten), true);
        }
    }
    (Cow::Borrowed(data), false)
}

fn is_chunked(headers: &HeaderMap) -> bool {
    headers.get_all(TRANSFER_ENCODING).iter().any(|value| {
        value
            .to_str()
            .ok()
            .and_then(|v| v.rsplit(',').next())
            .is_some_and(|last| last.trim().eq_ignore_ascii_case("chunked"))
    })
}

fn content_length(headers: &HeaderMap) -> Result<Option<usize>, MessageError> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Ok(None);
    };
    let text = String::from_utf8_lossy(value.as_bytes()).trim().to_string();
    text.parse::<usize>()
        .map(Some)
        .map_err(|_| MessageError::ContentLength(text))
}

fn dechunk(mut input: &[u8]) -> Result<Bytes, MessageError> {
    let mut body = Vec::new();
    loop {
        let (offset, size) = match httparse::parse_chunk_size(input) {
            Ok(Status::Complete(parsed)) => parsed,
            _ => return Err(MessageError::Chunked),
        };
        input = &input[offset..];
        // Trailers after the last chunk are ignored
        if size == 0 {
            return Ok(Bytes::from(body));
        }
        let size = usize::try_from(size).map_err(|_| MessageError::Chunked)?;
        if input.len() < size {
            return Err(MessageError::Chunked);
        }
        body.extend_from_slice(&input[..size]);
        input = &input[size..];
        input = if let Some(next) = input.strip_prefix(b"\r\n") {
            next
        } else if let Some(next) = input.strip_prefix(b"\n") {
            next
        } else {
            return Err(MessageError::Chunked);
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let raw = b"GET /a?x=1 HTTP/1.1\r\nHost: example.test\r\nAccept: */*\r\n\r\n";
        let request = RawHttpRequest::parse(raw).unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.target, "/a?x=1");
        assert_eq!(request.headers.get("host").unwrap(), "example.test");
        assert_eq!(request.headers.len(), 2);
        assert!(request.body.is_empty());
    }

    #[test]
    fn test_parse_keeps_repeated_headers() {
        let raw = b"GET / HTTP/1.1\r\nCookie: a=1\r\nCookie: b=2\r\n\r\n";
        let request = RawHttpRequest::parse(raw).unwrap();
        let cookies: Vec<_> = request.headers.get_all("cookie").iter().collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_parse_body_by_content_length() {
        let raw = b"POST /login HTTP/1.1\r\nContent-Length: 7\r\n\r\nuser=abEXTRA";
        let request = RawHttpRequest::parse(raw).unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(&request.body[..], b"user=ab");
    }

    #[test]
    fn test_parse_short_body() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc";
        assert_eq!(
            RawHttpRequest::parse(raw).unwrap_err(),
            MessageError::ShortBody {
                declared: 10,
                actual: 3
            }
        );
    }

    #[test]
    fn test_parse_bad_content_length() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n";
        assert!(matches!(
            RawHttpRequest::parse(raw),
            Err(MessageError::ContentLength(_))
        ));
    }

    #[test]
    fn test_body_without_framing_is_ignored() {
        let raw = b"GET / HTTP/1.1\r\nHost: a\r\n\r\nleftover";
        let request = RawHttpRequest::parse(raw).unwrap();
        assert!(request.body.is_empty());
    }

    #[test]
    fn test_parse_chunked_body() {
        let raw = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n";
        let request = RawHttpRequest::parse(raw).unwrap();
        assert_eq!(&request.body[..], b"Wikipedia");
    }

    #[test]
    fn test_parse_truncated_chunk() {
        let raw = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\nA\r\nshort";
        assert_eq!(
            RawHttpRequest::parse(raw).unwrap_err(),
            MessageError::Chunked
        );
    }

    #[test]
    fn test_parse_http2_request_line() {
        let raw = b"POST /api HTTP/2\r\nHost: example.test\r\n\r\n{\"a\":1}";
        let request = RawHttpRequest::parse(raw).unwrap();
        assert_eq!(request.target, "/api");
        assert_eq!(&request.body[..], b"{\"a\":1}");
    }

    #[test]
    fn test_parse_incomplete_head() {
        let raw = b"GET / HTTP/1.1\r\nHost: example.test\r\n";
        assert_eq!(
            RawHttpRequest::parse(raw).unwrap_err(),
            MessageError::Incomplete
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            RawHttpRequest::parse(b"\x00\x01 not http\r\n\r\n"),
            Err(MessageError::Head(_))
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::capture::Payload;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn method() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("GET"),
            Just("POST"),
            Just("PUT"),
            Just("DELETE"),
            Just("PATCH"),
            Just("HEAD"),
            Just("OPTIONS"),
        ]
    }

    fn target() -> impl Strategy<Value = String> {
        "/[a-z0-9_.~/-]{0,30}(\\?[a-z0-9]{1,8}=[a-z0-9]{0,8})?"
    }

    fn headers() -> impl Strategy<Value = BTreeMap<String, String>> {
        prop::collection::btree_map(
            "x-[a-z0-9-]{1,12}",
            "[A-Za-z0-9=;._-]([A-Za-z0-9 =;:,._/-]{0,30}[A-Za-z0-9=;._-])?",
            0..8,
        )
    }

    /// Base64 the way exports store it, wrapped at 76 columns.
    fn export_payload(raw: &[u8]) -> Payload {
        let encoded = STANDARD.encode(raw);
        let lines: Vec<&str> = encoded
            .as_bytes()
            .chunks(76)
            .map(|line| std::str::from_utf8(line).unwrap())
            .collect();
        Payload {
            base64: "true".to_string(),
            text: lines.join("\r\n"),
        }
    }

    proptest! {
        #[test]
        fn test_encoded_request_round_trips(
            method in method(),
            target in target(),
            headers in headers(),
        ) {
            let mut raw = format!("{method} {target} HTTP/1.1\r\n");
            for (name, value) in &headers {
                raw.push_str(&format!("{name}: {value}\r\n"));
            }
            raw.push_str("\r\n");

            let decoded = export_payload(raw.as_bytes()).decode().unwrap();
            let request = RawHttpRequest::parse(&decoded).unwrap();

            prop_assert_eq!(request.method.as_str(), method);
            prop_assert_eq!(&request.target, &target);
            let parsed: BTreeMap<String, String> = request
                .headers
                .iter()
                .map(|(name, value)| {
                    (name.as_str().to_string(), value.to_str().unwrap().to_string())
                })
                .collect();
            prop_assert_eq!(parsed, headers);
            prop_assert!(request.body.is_empty());
        }
    }
}
