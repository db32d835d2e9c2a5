//! Session title derivation

/// Maximum number of characters kept from the first user message
pub const TITLE_MAX_CHARS: usize = 20;

const ELLIPSIS: &str = "...";

/// Derive a session title from the first user message.
///
/// Keeps the first [`TITLE_MAX_CHARS`] characters and appends `...` only
/// when the content is longer than that. Counts characters, not bytes.
pub fn derive_title(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}{ELLIPSIS}")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_kept_verbatim() {
        assert_eq!(derive_title("hello"), "hello");
    }

    #[test]
    fn exactly_twenty_chars_has_no_ellipsis() {
        let s = "abcdefghijklmnopqrst";
        assert_eq!(s.chars().count(), 20);
        assert_eq!(derive_title(s), s);
    }

    #[test]
    fn long_content_is_truncated_with_ellipsis() {
        let s = "abcdefghijklmnopqrstu";
        assert_eq!(derive_title(s), "abcdefghijklmnopqrst...");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let s = "你好你好你好你好你好你好你好你好你好你好你"; // 21 chars
        let title = derive_title(s);
        assert_eq!(title.chars().count(), 23);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn empty_content_gives_empty_title() {
        assert_eq!(derive_title(""), "");
    }
}
