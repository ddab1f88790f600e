const SNIPPET_MAX_LEN: usize = 120;

/// Shorten a payload for inclusion in error messages and logs.
///
/// Truncates at a char boundary so multi-byte text never splits.
#[must_use]
pub(crate) fn snippet(text: &str) -> &str {
    if text.len() <= SNIPPET_MAX_LEN {
        return text;
    }
    let mut end = SNIPPET_MAX_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::snippet;

    #[test]
    fn snippet_returns_short_text_unchanged() {
        assert_eq!(snippet("hello"), "hello");
    }

    #[test]
    fn snippet_truncates_long_text() {
        let long = "x".repeat(500);
        assert_eq!(snippet(&long).len(), 120);
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let long = "é".repeat(200);
        let cut = snippet(&long);
        assert!(cut.len() <= 120);
        assert!(long.starts_with(cut));
    }
}
