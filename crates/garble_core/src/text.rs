//! Word affix and casing helpers shared by the operations.
//!
//! A word segment such as `"(Hello,"` is treated as three parts: a prefix of
//! non-word characters, a core, and a suffix of non-word characters.
//! Operations edit the core and carry the affixes through untouched.

/// Returns `true` for characters that count as part of a word core.
///
/// Word characters are alphanumerics and the underscore.
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte offsets `(core_start, core_end)` of the core within `word`.
///
/// A word made only of non-word characters has an empty core located at the
/// end of the word, so its whole text is the prefix.
pub fn affix_bounds(word: &str) -> (usize, usize) {
    let Some(start) = word.find(is_word_char) else {
        return (word.len(), word.len());
    };
    let end = word
        .char_indices()
        .rev()
        .find(|&(_, c)| is_word_char(c))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(word.len());
    (start, end)
}

/// Splits `word` into `(prefix, core, suffix)`.
///
/// # Examples
///
/// ```rust
/// use garble_core::text::split_affixes;
///
/// assert_eq!(split_affixes("(Hello,"), ("(", "Hello", ","));
/// assert_eq!(split_affixes("don't!"), ("", "don't", "!"));
/// assert_eq!(split_affixes("--"), ("--", "", ""));
/// ```
pub fn split_affixes(word: &str) -> (&str, &str, &str) {
    let (start, end) = affix_bounds(word);
    (&word[..start], &word[start..end], &word[end..])
}

/// Number of characters in the core of `word`.
pub fn core_char_count(word: &str) -> usize {
    split_affixes(word).1.chars().count()
}

/// Casing pattern of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStyle {
    /// Every cased character is upper case
    Upper,
    /// Every cased character is lower case
    Lower,
    /// Upper-case first letter followed by lower case
    Capitalised,
    /// Anything else, including words without cased characters
    Other,
}

impl CaseStyle {
    /// Classifies the casing of `word`.
    pub fn of(word: &str) -> Self {
        let has_upper = word.chars().any(char::is_uppercase);
        let has_lower = word.chars().any(char::is_lowercase);
        if has_upper && !has_lower {
            return CaseStyle::Upper;
        }
        if has_lower && !has_upper {
            return CaseStyle::Lower;
        }
        let mut chars = word.chars();
        match chars.next() {
            Some(first) if first.is_uppercase() && !chars.any(char::is_uppercase) => {
                CaseStyle::Capitalised
            }
            _ => CaseStyle::Other,
        }
    }
}

/// Upper-cases the first character of `word` and lower-cases the rest.
pub fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Re-cases `target` to follow the casing pattern of `source`.
///
/// # Examples
///
/// ```rust
/// use garble_core::text::transfer_casing;
///
/// assert_eq!(transfer_casing("Their", "there"), "There");
/// assert_eq!(transfer_casing("WHO", "whom"), "WHOM");
/// assert_eq!(transfer_casing("who", "Whom"), "whom");
/// ```
pub fn transfer_casing(source: &str, target: &str) -> String {
    match CaseStyle::of(source) {
        CaseStyle::Upper => target.to_uppercase(),
        CaseStyle::Lower => target.to_lowercase(),
        CaseStyle::Capitalised => capitalise(target),
        CaseStyle::Other => target.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_affixes_plain_word() {
        assert_eq!(split_affixes("word"), ("", "word", ""));
    }

    #[test]
    fn test_split_affixes_keeps_inner_punctuation() {
        assert_eq!(split_affixes("\"re-enter\"."), ("\"", "re-enter", "\"."));
    }

    #[test]
    fn test_split_affixes_unicode() {
        assert_eq!(split_affixes("«café»"), ("«", "café", "»"));
    }

    #[test]
    fn test_split_affixes_empty() {
        assert_eq!(split_affixes(""), ("", "", ""));
    }

    #[test]
    fn test_core_char_count() {
        assert_eq!(core_char_count("(naïve)"), 5);
        assert_eq!(core_char_count("!!"), 0);
    }

    #[test]
    fn test_case_style() {
        assert_eq!(CaseStyle::of("HELLO"), CaseStyle::Upper);
        assert_eq!(CaseStyle::of("hello"), CaseStyle::Lower);
        assert_eq!(CaseStyle::of("Hello"), CaseStyle::Capitalised);
        assert_eq!(CaseStyle::of("hEllo"), CaseStyle::Other);
        assert_eq!(CaseStyle::of("42"), CaseStyle::Other);
    }

    #[test]
    fn test_transfer_casing_other_keeps_target() {
        assert_eq!(transfer_casing("iPhone", "phone"), "phone");
    }
}
