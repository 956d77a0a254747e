//! Text normalization shared by the scanner and the matching engine.
//!
//! Labels, placeholders, and dictionary phrases all pass through the same
//! fold before comparison:
//! - Unicode NFKC normalization
//! - Lowercase conversion
//! - Punctuation replaced with spaces (digits kept)
//! - Whitespace collapsing

use unicode_normalization::UnicodeNormalization;

/// Normalize text for matching.
///
/// # Examples
///
/// ```
/// use formfill::text::normalize;
///
/// assert_eq!(normalize("  E-Mail  Address: "), "e mail address");
/// assert_eq!(normalize("Teléfono"), "teléfono");
/// ```
pub fn normalize(s: &str) -> String {
    let folded: String = s.nfkc().collect::<String>().to_lowercase();

    let mut out = String::with_capacity(folded.len());
    let mut last_was_space = true;
    for c in folded.chars() {
        if c.is_alphanumeric() {
            out.push(c);
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }

    out.trim_end().to_string()
}

/// Split normalized text into tokens.
pub fn tokenize(s: &str) -> Vec<String> {
    normalize(s)
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// Collapse raw element text into a single cleaned line, preserving case.
///
/// Used by the scanner for label capture, where the original casing is worth
/// keeping for display while matching normalizes separately.
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize("First Name:"), "first name");
        assert_eq!(normalize("e-mail"), "e mail");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  Date   of\tBirth "), "date of birth");
    }

    #[test]
    fn test_normalize_keeps_digits() {
        assert_eq!(normalize("Address Line 2"), "address line 2");
    }

    #[test]
    fn test_normalize_nfkc_fold() {
        // fullwidth forms fold to ASCII under NFKC
        assert_eq!(normalize("Ｅｍａｉｌ"), "email");
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Fecha de Nacimiento"), vec!["fecha", "de", "nacimiento"]);
        assert!(tokenize("  ").is_empty());
    }

    #[test]
    fn test_clean_text_preserves_case() {
        assert_eq!(clean_text("  First\n  Name "), "First Name");
    }
}
