//! Query-string codec: `a=1&b=two` ⇄ ordered key/value pairs.
//!
//! Decode and encode are inverses: `decode(encode(pairs)) == pairs` for any
//! pair list, with percent-escaping applied to everything outside the
//! unreserved set. Pair order is preserved in both directions.

use crate::error::CoreError;

/// Bidirectional query-string codec.
///
/// `keep_blank_values` controls whether `a=&b=1` yields an entry for `a`.
#[derive(Debug, Clone)]
pub struct QueryStringCodec {
    pub separator: char,
    pub keep_blank_values: bool,
}

impl Default for QueryStringCodec {
    fn default() -> Self {
        Self {
            separator: '&',
            keep_blank_values: true,
        }
    }
}

impl QueryStringCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a query string into ordered key/value pairs.
    ///
    /// Fails with `ParseError` on malformed percent escapes or non-UTF-8
    /// decoded bytes. An empty input decodes to an empty list.
    pub fn decode(&self, query: &str) -> Result<Vec<(String, String)>, CoreError> {
        let mut pairs = Vec::new();
        if query.is_empty() {
            return Ok(pairs);
        }

        for field in query.split(self.separator) {
            if field.is_empty() {
                continue;
            }
            let (raw_key, raw_value) = match field.split_once('=') {
                Some((k, v)) => (k, v),
                None => (field, ""),
            };
            let key = percent_decode(raw_key)
                .map_err(|reason| CoreError::parse(query, reason))?;
            let value = percent_decode(raw_value)
                .map_err(|reason| CoreError::parse(query, reason))?;
            if value.is_empty() && !self.keep_blank_values {
                continue;
            }
            pairs.push((key, value));
        }

        Ok(pairs)
    }

    /// Encode ordered key/value pairs into a query string.
    pub fn encode(&self, pairs: &[(String, String)]) -> String {
        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(&self.separator.to_string())
    }
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~')
}

fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if is_unreserved(byte) {
            out.push(byte as char);
        } else if byte == b' ' {
            out.push('+');
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn percent_decode(input: &str) -> Result<String, String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .ok_or_else(|| format!("truncated percent escape at byte {i}"))?;
                let hex = std::str::from_utf8(hex)
                    .map_err(|_| format!("invalid percent escape at byte {i}"))?;
                let value = u8::from_str_radix(hex, 16)
                    .map_err(|_| format!("invalid percent escape %{hex} at byte {i}"))?;
                out.push(value);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| "percent-decoded bytes are not valid UTF-8".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_decode_basic() {
        let codec = QueryStringCodec::new();
        let decoded = codec.decode("sslmode=require&connect_timeout=10").unwrap();
        assert_eq!(
            decoded,
            pairs(&[("sslmode", "require"), ("connect_timeout", "10")])
        );
    }

    #[test]
    fn test_roundtrip_with_escapes() {
        let codec = QueryStringCodec::new();
        let original = pairs(&[("application name", "age kit"), ("opts", "a=b&c")]);
        let encoded = codec.encode(&original);
        assert_eq!(codec.decode(&encoded).unwrap(), original);
    }

    #[test]
    fn test_blank_values() {
        let strict = QueryStringCodec {
            keep_blank_values: false,
            ..QueryStringCodec::new()
        };
        assert_eq!(strict.decode("a=&b=1").unwrap(), pairs(&[("b", "1")]));

        let lenient = QueryStringCodec::new();
        assert_eq!(
            lenient.decode("a=&b=1").unwrap(),
            pairs(&[("a", ""), ("b", "1")])
        );
    }

    #[test]
    fn test_malformed_escape_is_parse_error() {
        let codec = QueryStringCodec::new();
        assert!(codec.decode("a=%G1").is_err());
        assert!(codec.decode("a=%2").is_err());
    }

    #[test]
    fn test_empty_query() {
        let codec = QueryStringCodec::new();
        assert!(codec.decode("").unwrap().is_empty());
        assert_eq!(codec.encode(&[]), "");
    }
}
