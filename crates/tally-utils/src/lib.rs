//! Utility functions and helpers

use rand::Rng;
use std::fmt::Write;

/// Escape text for inclusion in HTML content or single/double quoted attributes
pub fn escape_html(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Format a non-negative amount string with a dollar sign, prefixing an en dash when negative
pub fn format_money(amount: &str, negative: bool) -> String {
    format!("{}${}", if negative { "–" } else { "" }, amount)
}

/// Title-case a single name part: "mcKAY" -> "Mckay"
pub fn title_case(word: &str) -> String {
    let lower = word.trim().to_lowercase();
    let mut result = String::with_capacity(lower.len());
    let mut at_word_start = true;
    for c in lower.chars() {
        if at_word_start && c.is_alphabetic() {
            result.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            result.push(c);
            if !c.is_alphabetic() {
                at_word_start = true;
            }
        }
    }
    result
}

/// Build a full display name from first and last name inputs
pub fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", title_case(first), title_case(last))
}

/// Capitalize the first character: "debt" -> "Debt"
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Hex-encode bytes
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a random 32-byte hex token
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>Tom & 'Jerry'</b>"),
            "&lt;b&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money("12.50", false), "$12.50");
        assert_eq!(format_money("3.00", true), "–$3.00");
    }

    #[test]
    fn test_full_name() {
        assert_eq!(full_name("  jANE ", "doe"), "Jane Doe");
        assert_eq!(full_name("mary-ann", "o'neil"), "Mary-Ann O'Neil");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("repayment"), "Repayment");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_tokens_are_random_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
