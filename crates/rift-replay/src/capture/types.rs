//! Serde model of the proxy history export.
//!
//! Mirrors the "save items" XML layout: an `<items>` root holding one
//! `<item>` per recorded exchange. Only `url` and `request` drive the replay;
//! the remaining fields are kept so a malformed export is still rejected.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename = "items")]
pub struct CaptureDocument {
    #[serde(rename = "@burpVersion", default)]
    pub burp_version: String,
    #[serde(rename = "@exportTime", default)]
    pub export_time: String,
    #[serde(rename = "item", default)]
    pub items: Vec<CaptureItem>,
}

/// One recorded exchange.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CaptureItem {
    pub time: String,
    pub url: String,
    pub host: HostField,
    pub port: String,
    pub protocol: String,
    pub method: String,
    pub path: String,
    pub extension: String,
    pub request: Payload,
    pub status: String,
    #[serde(rename = "responselength")]
    pub response_length: String,
    #[serde(rename = "mimetype")]
    pub mime_type: String,
    pub response: Payload,
    pub comment: String,
}

impl CaptureItem {
    pub fn has_request(&self) -> bool {
        !self.request.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostField {
    #[serde(rename = "@ip", default)]
    pub ip: String,
    #[serde(rename = "$text", default)]
    pub name: String,
}

/// Request or response content, base64 encoded unless the attribute says otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Payload {
    #[serde(rename = "@base64", default)]
    pub base64: String,
    #[serde(rename = "$text", default)]
    pub text: String,
}

impl Payload {
    pub fn is_base64(&self) -> bool {
        self.base64.trim().eq_ignore_ascii_case("true")
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Raw message bytes. Line breaks inside base64 text are ignored.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        if !self.is_base64() {
            return Ok(self.text.as_bytes().to_vec());
        }
        let compact: Vec<u8> = self
            .text
            .trim()
            .bytes()
            .filter(|b| *b != b'\r' && *b != b'\n')
            .collect();
        STANDARD.decode(compact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(base64: &str, text: &str) -> Payload {
        Payload {
            base64: base64.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_decode_base64_payload() {
        let p = payload("true", "R0VUIC8gSFRUUC8xLjENCg0K");
        assert_eq!(p.decode().unwrap(), b"GET / HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn test_decode_ignores_line_breaks() {
        let p = payload("true", "R0VUIC8gSFRU\r\nUC8xLjENCg0K\n");
        assert_eq!(p.decode().unwrap(), b"GET / HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn test_decode_plain_payload() {
        let p = payload("false", "GET / HTTP/1.1\r\n\r\n");
        assert!(!p.is_base64());
        assert_eq!(p.decode().unwrap(), b"GET / HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn test_decode_invalid_base64() {
        let p = payload("true", "not*base64!");
        assert!(p.decode().is_err());
    }

    #[test]
    fn test_empty_payload() {
        assert!(payload("true", "  \n").is_empty());
        assert!(!payload("true", "AA==").is_empty());
    }
}
