//! Tokenization and prefix keys.
//!
//! Both sides of the system - the index build and the query engine - must
//! split text the same way, so this is the only place that splits text.
//! The index build drops empty-after-strip words before keying; the scorer
//! keeps them so body word positions line up with the whitespace-split body.

/// Number of leading characters of a word used as its index key.
pub const PREFIX_LEN: usize = 4;

/// Word characters survive normalization; everything else is stripped.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split text into normalized words.
///
/// One entry per whitespace-delimited token: stripped of non-word characters
/// and lowercased. A token with no word characters yields an empty string,
/// which is KEPT - callers that need nonempty words filter themselves.
pub fn to_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| is_word_char(*c))
                .flat_map(char::to_lowercase)
                .collect()
        })
        .collect()
}

/// The index key for a word: its first `PREFIX_LEN` characters.
///
/// Shorter words key under their full length. Character-based, so multi-byte
/// words truncate on character boundaries.
pub fn prefix_key(word: &str) -> String {
    word.chars().take(PREFIX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_whitespace_runs() {
        assert_eq!(to_words("hello   world"), vec!["hello", "world"]);
        assert_eq!(to_words("\thello\n world "), vec!["hello", "world"]);
    }

    #[test]
    fn test_strips_and_lowercases() {
        assert_eq!(to_words("Hello, World!"), vec!["hello", "world"]);
        assert_eq!(to_words("don't"), vec!["dont"]);
        assert_eq!(to_words("snake_case"), vec!["snake_case"]);
    }

    #[test]
    fn test_keeps_empty_after_strip() {
        // "--" strips to nothing but still occupies a position
        assert_eq!(to_words("a -- b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(to_words("").is_empty());
        assert!(to_words("   ").is_empty());
    }

    #[test]
    fn test_prefix_key_truncates_to_four() {
        assert_eq!(prefix_key("trying"), "tryi");
        assert_eq!(prefix_key("uploads"), "uplo");
    }

    #[test]
    fn test_prefix_key_short_words() {
        assert_eq!(prefix_key("ok"), "ok");
        assert_eq!(prefix_key(""), "");
    }

    #[test]
    fn test_prefix_key_is_char_based() {
        assert_eq!(prefix_key("héllo"), "héll");
    }
}
