//! URL percent-encoding primitives.
//!
//! Listing pages encode every generated href with [`encode`], and the parser
//! decodes paths and query parameters with [`decode`]; keeping both ends on
//! the same escape set makes the round trip lossless.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Escape everything except the RFC 3986 unreserved characters.
const ESCAPED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a path or query component.
pub fn encode(text: &str) -> String {
    utf8_percent_encode(text, ESCAPED).to_string()
}

/// Percent-decode a path or query component.
///
/// Invalid escape sequences are passed through unchanged and invalid UTF-8 is
/// replaced, never rejected; a garbled parameter should not kill a request.
pub fn decode(text: &str) -> String {
    percent_decode_str(text).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_reserved_characters() {
        assert_eq!(encode("/tmp/some dir"), "%2Ftmp%2Fsome%20dir");
        assert_eq!(encode("a?b&c=d"), "a%3Fb%26c%3Dd");
        assert_eq!(encode("plain-name_1.txt"), "plain-name_1.txt");
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("%2Ftmp%2Fsome%20dir"), "/tmp/some dir");
        assert_eq!(decode("no-escapes"), "no-escapes");
    }

    #[test]
    fn test_round_trip() {
        for original in [
            "/tmp/with space",
            "/q?a&b=c",
            "/música/日本語.txt",
            "100% sure",
        ] {
            assert_eq!(decode(&encode(original)), original);
        }
    }

    #[test]
    fn test_decode_tolerates_garbage() {
        // A stray percent sign is kept as-is rather than rejected.
        assert_eq!(decode("50%"), "50%");
    }
}
