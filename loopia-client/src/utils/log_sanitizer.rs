//! Log sanitization utilities
//!
//! Keeps credentials and oversized XML bodies out of debug/error logs.

/// Maximum number of bytes of a response body included in log output.
const TRUNCATE_LIMIT: usize = 256;

/// Number of leading characters of an account name left visible.
const VISIBLE_PREFIX: usize = 3;

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
///
/// Strings within the limit are returned unchanged; longer ones are cut on a
/// char boundary and suffixed with the total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Mask an account identifier, keeping a short prefix for correlation.
///
/// `"user@loopiaapi"` becomes `"use***"`.
pub fn mask_identifier(s: &str) -> String {
    let prefix: String = s.chars().take(VISIBLE_PREFIX).collect();
    format!("{prefix}***")
}
