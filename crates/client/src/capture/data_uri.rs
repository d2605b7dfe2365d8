//! Data URI parsing for screenshots handed over by the capture source.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Errors from data URI parsing.
#[derive(Debug, thiserror::Error)]
pub enum DataUriError {
    /// Input does not look like `data:<mime>;base64,<payload>`.
    #[error("not a data URI")]
    MissingPrefix,

    /// Only base64-encoded payloads are supported.
    #[error("unsupported encoding: expected base64")]
    NotBase64,

    /// Payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// A decoded data URI: mime type plus raw payload bytes.
#[derive(Debug, Clone)]
pub struct DataUri {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    /// Parse and decode a `data:<mime>;base64,<payload>` string.
    pub fn parse(input: &str) -> Result<Self, DataUriError> {
        let rest = input.strip_prefix("data:").ok_or(DataUriError::MissingPrefix)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingPrefix)?;
        let mime = header.strip_suffix(";base64").ok_or(DataUriError::NotBase64)?;

        let bytes = STANDARD.decode(payload)?;
        let mime_type = if mime.is_empty() { "application/octet-stream".to_string() } else { mime.to_string() };

        Ok(Self { mime_type, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jpeg_uri() {
        let uri = format!("data:image/jpeg;base64,{}", STANDARD.encode(b"hello"));
        let parsed = DataUri::parse(&uri).unwrap();
        assert_eq!(parsed.mime_type, "image/jpeg");
        assert_eq!(parsed.bytes, b"hello");
    }

    #[test]
    fn test_parse_empty_mime_defaults() {
        let uri = format!("data:;base64,{}", STANDARD.encode(b"x"));
        let parsed = DataUri::parse(&uri).unwrap();
        assert_eq!(parsed.mime_type, "application/octet-stream");
    }

    #[test]
    fn test_reject_missing_prefix() {
        let result = DataUri::parse("image/jpeg;base64,aGVsbG8=");
        assert!(matches!(result, Err(DataUriError::MissingPrefix)));
    }

    #[test]
    fn test_reject_missing_comma() {
        let result = DataUri::parse("data:image/jpeg;base64");
        assert!(matches!(result, Err(DataUriError::MissingPrefix)));
    }

    #[test]
    fn test_reject_non_base64_encoding() {
        let result = DataUri::parse("data:text/plain,hello");
        assert!(matches!(result, Err(DataUriError::NotBase64)));
    }

    #[test]
    fn test_reject_bad_payload() {
        let result = DataUri::parse("data:image/jpeg;base64,!!!not-base64!!!");
        assert!(matches!(result, Err(DataUriError::Decode(_))));
    }
}
