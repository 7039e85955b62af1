//! Scraped image payload decoding.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;

use crate::error::{IdentifyError, IdentifyResult};

static DATA_URI: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn data_uri() -> IdentifyResult<&'static Regex> {
    DATA_URI
        .get_or_init(|| Regex::new(r"(?s)^data:.+/(.+);base64,(.*)$"))
        .as_ref()
        .map_err(|e| IdentifyError::ImageDecode(e.to_string()))
}

/// Decode a scraped image into raw bytes.
///
/// Accepts `data:<mime>;base64,<data>` URIs and bare base64. Remote URLs are
/// rejected.
pub fn process_image_input(input: &str) -> IdentifyResult<Vec<u8>> {
    let input = input.trim();
    if input.starts_with("http://") || input.starts_with("https://") {
        return Err(IdentifyError::ImageDecode(format!(
            "remote image URLs are not supported: {input}"
        )));
    }

    let payload = data_uri()?
        .captures(input)
        .and_then(|caps| caps.get(2))
        .map_or(input, |m| m.as_str());

    // Wrapped payloads carry line breaks the decoder does not accept.
    let payload: String = payload.split_whitespace().collect();
    STANDARD
        .decode(payload)
        .map_err(|e| IdentifyError::ImageDecode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri() {
        let bytes = process_image_input("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_bare_base64() {
        assert_eq!(process_image_input("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_line_wrapped_data_uri() {
        let bytes = process_image_input("data:image/png;base64,aGVs\nbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_malformed_payload() {
        let err = process_image_input("data:image/png;base64,!!!").unwrap_err();
        assert!(matches!(err, IdentifyError::ImageDecode(_)));
    }

    #[test]
    fn test_remote_url_rejected() {
        let err = process_image_input("https://example.com/cover.jpg").unwrap_err();
        assert!(matches!(err, IdentifyError::ImageDecode(_)));
    }
}
