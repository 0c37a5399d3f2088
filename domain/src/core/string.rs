//! String utilities for the domain layer.

/// Truncate a string to a maximum byte length with ellipsis (UTF-8 safe)
///
/// Used for log previews. Uses byte length for `max_len` but ensures
/// truncation occurs at valid UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Keep the first `max_chars` characters and append `...` when anything
/// was cut off.
///
/// Unlike [`truncate`], the limit counts characters, and the ellipsis is
/// added on top of the kept prefix.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &s[..end]),
        None => s.to_string(),
    }
}

/// Collapse every run of whitespace (including newlines) into a single
/// space and trim both ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // "é" is 2 bytes: target 4 falls inside the third "é", back off to 4
        assert_eq!(truncate("éééééé", 7), "éé...");
        assert_eq!(truncate("ééé", 6), "ééé");
    }

    #[test]
    fn test_truncate_chars_keeps_short_strings() {
        assert_eq!(truncate_chars("What is ATP?", 30), "What is ATP?");
        assert_eq!(truncate_chars("", 30), "");
    }

    #[test]
    fn test_truncate_chars_exact_length_is_not_cut() {
        let exactly_30 = "a".repeat(30);
        assert_eq!(truncate_chars(&exactly_30, 30), exactly_30);
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        let long = "ü".repeat(35);
        let cut = truncate_chars(&long, 30);
        assert_eq!(cut, format!("{}...", "ü".repeat(30)));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace("  explain\n\n the   Krebs\tcycle "),
            "explain the Krebs cycle"
        );
        assert_eq!(collapse_whitespace("   "), "");
    }
}
