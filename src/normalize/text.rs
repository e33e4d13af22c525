//! Canonical message text.
//!
//! ```text
//! normalize_text(text) = trim(collapse_whitespace(normalize_newlines(text)))
//! ```
//!
//! - `normalize_newlines`: CRLF → LF, CR → LF
//! - `collapse_whitespace`: any run of whitespace becomes a single space
//! - `trim`: remove leading and trailing whitespace
//!
//! Applied to the text handed to feature extraction, never to the text
//! content lengths are measured on.

use std::sync::OnceLock;
use regex_lite::Regex;

fn whitespace_run() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex is valid"))
}

/// Normalize message text to canonical form.
///
/// # Example
///
/// ```rust
/// use chat_proof_kernel::normalize::normalize_text;
///
/// assert_eq!(normalize_text("  Hello\r\n\r\n  World  "), "Hello World");
/// ```
pub fn normalize_text(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    whitespace_run()
        .replace_all(&normalized, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize_text("a \t b\n\nc"), "a b c");
    }

    #[test]
    fn test_trims() {
        assert_eq!(normalize_text("   hi   "), "hi");
        assert_eq!(normalize_text(" \r\n "), "");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_text("  x\r\ny  ");
        assert_eq!(normalize_text(&once), once);
    }
}
