//! String utilities for the domain layer.

/// Return at most `max_chars` characters of `s` (UTF-8 safe).
pub fn take_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Truncate a string to `max_chars` characters, appending `...` when cut.
///
/// Used for prompt listings where each proposal is capped (200 chars for
/// voting, 300 for debate rounds and moderator selection).
pub fn truncate(s: &str, max_chars: usize) -> String {
    let head = take_chars(s, max_chars);
    if head.len() == s.len() {
        s.to_string()
    } else {
        format!("{}...", head)
    }
}

/// Truncate a string to `max_chars` characters, appending `marker` when cut.
pub fn truncate_with_marker(s: &str, max_chars: usize, marker: &str) -> String {
    let head = take_chars(s, max_chars);
    if head.len() == s.len() {
        s.to_string()
    } else {
        format!("{}{}", head, marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_chars_ascii() {
        assert_eq!(take_chars("hello world", 5), "hello");
        assert_eq!(take_chars("hi", 10), "hi");
        assert_eq!(take_chars("", 3), "");
    }

    #[test]
    fn test_take_chars_multibyte() {
        let s = "あのね"; // 3 chars, 9 bytes
        assert_eq!(take_chars(s, 1), "あ");
        assert_eq!(take_chars(s, 2), "あの");
        assert_eq!(take_chars(s, 3), "あのね");
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hello...");
    }

    #[test]
    fn test_truncate_exact_length_is_untouched() {
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_emoji() {
        assert_eq!(truncate("👋🌍🎉", 2), "👋🌍...");
    }

    #[test]
    fn test_truncate_with_marker() {
        assert_eq!(
            truncate_with_marker("abcdef", 3, "[cut]"),
            "abc[cut]"
        );
        assert_eq!(truncate_with_marker("abc", 3, "[cut]"), "abc");
    }
}
