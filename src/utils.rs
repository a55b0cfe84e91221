//! Utility functions for handling secrets in diagnostics
//!
//! Bearer values end up in `Debug` output and status reports; these helpers
//! keep them recognisable without leaking them. Truncation respects UTF-8
//! boundaries so odd input cannot cause a panic.

/// Number of leading bytes [`mask_secret`] keeps visible
const VISIBLE_PREFIX: usize = 8;

/// Safely truncate a string at a UTF-8 character boundary.
///
/// Returns a slice of at most `max_bytes` bytes, ensuring the result
/// is valid UTF-8 by finding the last valid character boundary.
///
/// # Example
/// ```
/// use linear_agent_auth::utils::safe_truncate;
///
/// // Emoji is 4 bytes - truncating at byte 10 would cut it in half
/// let text = "Status: 🔍 Active";
/// let result = safe_truncate(text, 10);
/// assert_eq!(result, "Status: "); // Stops before the emoji
/// ```
#[inline]
#[must_use]
pub fn safe_truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    // Find the last valid UTF-8 boundary at or before max_bytes
    let mut boundary = max_bytes;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    &s[..boundary]
}

/// Mask a secret for display.
///
/// Short secrets are fully hidden. Longer ones keep their first eight bytes,
/// which for Linear keys is just the `lin_api_` prefix.
///
/// # Example
/// ```
/// use linear_agent_auth::utils::mask_secret;
///
/// assert_eq!(mask_secret("lin_api_0123456789abcdef"), "lin_api_****");
/// assert_eq!(mask_secret("short"), "****");
/// ```
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    if secret.len() <= VISIBLE_PREFIX * 2 {
        return "****".to_string();
    }
    format!("{}****", safe_truncate(secret, VISIBLE_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_truncate_ascii() {
        let text = "Hello, World!";
        assert_eq!(safe_truncate(text, 7), "Hello, ");
        assert_eq!(safe_truncate(text, 100), text);
        assert_eq!(safe_truncate(text, 0), "");
    }

    #[test]
    fn test_safe_truncate_multibyte() {
        // 'é' is 2 bytes in UTF-8
        let text = "Café";

        // Byte 4 is in the middle of 'é' - should truncate to "Caf"
        assert_eq!(safe_truncate(text, 4), "Caf");
        assert_eq!(safe_truncate(text, 5), "Café");
    }

    #[test]
    fn test_mask_secret_keeps_prefix_only() {
        let masked = mask_secret("lin_api_abcdefghijklmnopqrstuvwxyz");
        assert_eq!(masked, "lin_api_****");
        assert!(!masked.contains("abc"));
    }

    #[test]
    fn test_mask_secret_short_values() {
        assert_eq!(mask_secret(""), "****");
        assert_eq!(mask_secret("0123456789abcdef"), "****");
    }

    #[test]
    fn test_mask_secret_multibyte() {
        // 7 ASCII bytes then a 4-byte emoji straddling the cut
        let masked = mask_secret("abcdefg🔍hijklmnopqrstu");
        assert_eq!(masked, "abcdefg****");
    }
}
