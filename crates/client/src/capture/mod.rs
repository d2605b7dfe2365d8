//! Page capture model and local validation.
//!
//! A capture is what the browser-side collaborator hands over: page
//! metadata plus a screenshot encoded as a data URI. Validation happens
//! here, before any network call is made.

mod data_uri;

pub use data_uri::{DataUri, DataUriError};

use clipbase_core::Error;
use serde::{Deserialize, Serialize};

/// A captured web page, the input to the save pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageCapture {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Screenshot as a `data:<mime>;base64,…` URI.
    pub screenshot_data_uri: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub favicon: Option<String>,
}

/// A decoded screenshot ready for upload.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl PageCapture {
    /// Validate the capture without touching the network.
    ///
    /// Requires a non-empty url and title and a screenshot whose decoded
    /// payload is at least `min_screenshot_bytes` long.
    pub fn validate(&self, min_screenshot_bytes: usize) -> Result<(), Error> {
        if self.url.trim().is_empty() {
            return Err(Error::Validation("url cannot be empty".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(Error::Validation("title cannot be empty".to_string()));
        }
        self.screenshot(min_screenshot_bytes)?;
        Ok(())
    }

    /// Decode the screenshot payload, enforcing the minimum size.
    pub fn screenshot(&self, min_screenshot_bytes: usize) -> Result<Screenshot, Error> {
        let decoded = DataUri::parse(&self.screenshot_data_uri)
            .map_err(|e| Error::Validation(format!("screenshot: {e}")))?;

        if decoded.bytes.len() < min_screenshot_bytes {
            return Err(Error::Validation(format!(
                "screenshot too small: {} bytes (minimum {})",
                decoded.bytes.len(),
                min_screenshot_bytes
            )));
        }

        Ok(Screenshot { bytes: decoded.bytes, mime_type: decoded.mime_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    fn capture_with_screenshot(payload: &[u8]) -> PageCapture {
        PageCapture {
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            description: "d".to_string(),
            screenshot_data_uri: format!("data:image/jpeg;base64,{}", STANDARD.encode(payload)),
            content: "body".to_string(),
            favicon: None,
        }
    }

    #[test]
    fn test_valid_capture() {
        let capture = capture_with_screenshot(&[0u8; 150]);
        assert!(capture.validate(100).is_ok());
    }

    #[test]
    fn test_empty_url_rejected() {
        let capture = PageCapture { url: "  ".to_string(), ..capture_with_screenshot(&[0u8; 150]) };
        let result = capture.validate(100);
        assert!(matches!(result, Err(Error::Validation(msg)) if msg.contains("url")));
    }

    #[test]
    fn test_empty_title_rejected() {
        let capture = PageCapture { title: String::new(), ..capture_with_screenshot(&[0u8; 150]) };
        let result = capture.validate(100);
        assert!(matches!(result, Err(Error::Validation(msg)) if msg.contains("title")));
    }

    #[test]
    fn test_short_screenshot_rejected() {
        let capture = capture_with_screenshot(&[0u8; 10]);
        let result = capture.validate(100);
        assert!(matches!(result, Err(Error::Validation(msg)) if msg.contains("too small")));
    }

    #[test]
    fn test_malformed_data_uri_rejected() {
        let capture = PageCapture {
            screenshot_data_uri: "nonsense".to_string(),
            ..capture_with_screenshot(&[0u8; 150])
        };
        let result = capture.validate(100);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_screenshot_mime_passthrough() {
        let capture = capture_with_screenshot(&[1u8; 120]);
        let shot = capture.screenshot(100).unwrap();
        assert_eq!(shot.mime_type, "image/jpeg");
        assert_eq!(shot.bytes.len(), 120);
    }
}
