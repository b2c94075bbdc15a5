//! The single header forced onto every replayed request.

use crate::error::{ReplayError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;

/// A `Name: value` header that replaces whatever the capture recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOverride {
    name: HeaderName,
    value: HeaderValue,
}

impl HeaderOverride {
    /// Parse `Name: value`. Everything after the first colon is the value,
    /// so values like `Bearer a:b` survive intact.
    pub fn parse(spec: &str) -> Result<Self> {
        let (name, value) = spec.split_once(':').ok_or_else(|| {
            ReplayError::Config(format!(
                "header override '{spec}' must look like 'Name: value'"
            ))
        })?;

        let name = name.trim();
        let value = value.trim();
        if name.is_empty() {
            return Err(ReplayError::Config(format!(
                "header override '{spec}' has an empty name"
            )));
        }

        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ReplayError::Config(format!("invalid header name '{name}'")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ReplayError::Config(format!("invalid value for header '{name}'")))?;

        Ok(Self { name, value })
    }

    pub fn name(&self) -> &HeaderName {
        &self.name
    }

    pub fn value(&self) -> &HeaderValue {
        &self.value
    }

    /// Replace every existing value of the header (matched case-insensitively)
    /// with the override, or add it when absent.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(self.name.clone(), self.value.clone());
    }
}

impl fmt::Display for HeaderOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.name,
            String::from_utf8_lossy(self.value.as_bytes())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_both_sides() {
        let header = HeaderOverride::parse("  Cookie :  session=abc  ").unwrap();
        assert_eq!(header.name().as_str(), "cookie");
        assert_eq!(header.value(), "session=abc");
    }

    #[test]
    fn test_parse_keeps_colons_in_value() {
        let header = HeaderOverride::parse("Authorization: Bearer a:b:c").unwrap();
        assert_eq!(header.value(), "Bearer a:b:c");
    }

    #[test]
    fn test_parse_without_colon_is_config_error() {
        let err = HeaderOverride::parse("Cookie session=abc").unwrap_err();
        assert!(matches!(err, ReplayError::Config(_)));
    }

    #[test]
    fn test_parse_rejects_empty_and_invalid_names() {
        assert!(matches!(
            HeaderOverride::parse(": value"),
            Err(ReplayError::Config(_))
        ));
        assert!(matches!(
            HeaderOverride::parse("Bad Name: value"),
            Err(ReplayError::Config(_))
        ));
        assert!(matches!(
            HeaderOverride::parse("X-Token: a\u{7f}b"),
            Err(ReplayError::Config(_))
        ));
    }

    #[test]
    fn test_apply_replaces_all_existing_values() {
        let mut headers = HeaderMap::new();
        headers.append("cookie", HeaderValue::from_static("a=1"));
        headers.append("cookie", HeaderValue::from_static("b=2"));

        HeaderOverride::parse("COOKIE: session=abc")
            .unwrap()
            .apply(&mut headers);

        let values: Vec<_> = headers.get_all("cookie").iter().collect();
        assert_eq!(values, vec!["session=abc"]);
    }

    #[test]
    fn test_apply_adds_missing_header() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("example.test"));

        HeaderOverride::parse("X-Api-Key: k1")
            .unwrap()
            .apply(&mut headers);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("x-api-key").unwrap(), "k1");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let header = HeaderOverride::parse("Cookie: session=abc").unwrap();
        let mut once = HeaderMap::new();
        once.insert("cookie", HeaderValue::from_static("old"));
        let mut twice = once.clone();

        header.apply(&mut once);
        header.apply(&mut twice);
        header.apply(&mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_display() {
        let header = HeaderOverride::parse("Cookie: session=abc").unwrap();
        assert_eq!(header.to_string(), "cookie: session=abc");
    }
}
