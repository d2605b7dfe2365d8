//! Inbox item id generation.

use sha2::{Digest, Sha256};

/// Compute a stable id for an inbox item from its URL and save time.
pub fn compute_item_id(url: &str, saved_at: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(b"\n");
    hasher.update(saved_at.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_stability() {
        let id1 = compute_item_id("https://example.com", "2026-08-25T10:00:00+00:00");
        let id2 = compute_item_id("https://example.com", "2026-08-25T10:00:00+00:00");
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_id_different_saved_at() {
        let id1 = compute_item_id("https://example.com", "2026-08-25T10:00:00+00:00");
        let id2 = compute_item_id("https://example.com", "2026-08-25T10:00:01+00:00");
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_id_format() {
        let id = compute_item_id("https://example.com", "2026-08-25T10:00:00+00:00");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
