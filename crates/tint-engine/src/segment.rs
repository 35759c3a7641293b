//! Sub-token segmentation: splitting identifiers into words.
//!
//! [`segment`] cuts an identifier at four kinds of boundary:
//!
//! | Boundary | Example | Pieces |
//! |----------|---------|--------|
//! | delimiter run (`_ - — . / \ :`) | `a__b` | `a`, `__`, `b` |
//! | lowercase → uppercase | `fooBar` | `foo`, `Bar` |
//! | acronym → capitalized word | `HTTPServer` | `HTTP`, `Server` |
//! | letter ↔ digit | `item2Count` | `item`, `2`, `Count` |
//!
//! The split is lossless: concatenating the pieces in order gives back the
//! input exactly. Delimiter runs are kept as their own pieces (flagged with
//! [`SubToken::is_delimiter`]) so callers can skip them while still advancing
//! their column counter. A run is a repetition of one delimiter character;
//! `_-` is two runs.
//!
//! Offsets and lengths count `char`s, matching how spans address columns.

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

/// Characters that separate words and are never colored.
pub const DELIMITERS: [char; 7] = ['_', '-', '—', '.', '/', '\\', ':'];

/// Whether `ch` is one of the [`DELIMITERS`].
#[inline]
#[must_use]
pub fn is_delimiter(ch: char) -> bool {
    DELIMITERS.contains(&ch)
}

/// Character class for boundary detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    /// One of the delimiter characters; runs only join the same character.
    Delimiter(char),
    Lower,
    Upper,
    Digit,
    /// Anything else: uncased letters, symbols, whitespace.
    Other,
}

fn classify(ch: char) -> CharClass {
    if is_delimiter(ch) {
        CharClass::Delimiter(ch)
    } else if ch.is_ascii_digit() {
        CharClass::Digit
    } else if ch.is_lowercase() {
        CharClass::Lower
    } else if ch.is_uppercase() {
        CharClass::Upper
    } else {
        CharClass::Other
    }
}

// ---------------------------------------------------------------------------
// SubToken
// ---------------------------------------------------------------------------

/// One piece of a segmented identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubToken<'a> {
    /// The piece itself, borrowed from the input.
    pub text: &'a str,
    /// Char offset of the piece within the input.
    pub offset: usize,
    /// Length in chars.
    pub len: usize,
    /// True for delimiter runs (`__`, `::`, `-`).
    pub is_delimiter: bool,
}

// ---------------------------------------------------------------------------
// Segmentation
// ---------------------------------------------------------------------------

/// Split `text` into ordered sub-tokens.
///
/// Returns an empty list for an empty string; otherwise every char of
/// `text` belongs to exactly one sub-token.
#[must_use]
pub fn segment(text: &str) -> Vec<SubToken<'_>> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut pieces = Vec::new();
    if chars.is_empty() {
        return pieces;
    }

    let mut start = 0;
    for i in 1..chars.len() {
        if is_boundary(&chars, i) {
            pieces.push(piece(text, &chars, start, i));
            start = i;
        }
    }
    pieces.push(piece(text, &chars, start, chars.len()));
    pieces
}

/// Whether a new sub-token starts at char index `i` (`i >= 1`).
fn is_boundary(chars: &[(usize, char)], i: usize) -> bool {
    use CharClass::{Delimiter, Digit, Lower, Upper};

    let prev = classify(chars[i - 1].1);
    let cur = classify(chars[i].1);
    match (prev, cur) {
        (Delimiter(a), Delimiter(b)) => a != b,
        (Delimiter(_), _) | (_, Delimiter(_)) => true,
        (Lower, Upper) => true,
        // `HTTPServer`: cut before the `S` because an `e` follows it.
        (Upper, Upper) => chars
            .get(i + 1)
            .is_some_and(|&(_, next)| classify(next) == Lower),
        (Lower | Upper, Digit) | (Digit, Lower | Upper) => true,
        _ => false,
    }
}

fn piece<'a>(text: &'a str, chars: &[(usize, char)], from: usize, to: usize) -> SubToken<'a> {
    let start_byte = chars[from].0;
    let end_byte = chars.get(to).map_or(text.len(), |&(b, _)| b);
    let slice = &text[start_byte..end_byte];
    SubToken {
        text: slice,
        offset: from,
        len: to - from,
        is_delimiter: is_delimiter(chars[from].1),
    }
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

/// Which leading sub-token, if any, is left undecorated.
///
/// Identifiers often share a prefix (`userName`, `userId`, `userRole`);
/// skipping it lets the distinguishing part carry the color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FirstSubTokenPolicy {
    /// Decorate every word.
    Keep,
    /// Skip the piece at index 0, even when it is a delimiter run.
    #[default]
    SkipFirst,
    /// Skip the first piece that is not a delimiter run.
    SkipFirstWord,
}

impl FirstSubTokenPolicy {
    /// Parse a settings value: `keep`, `first` or `firstWord`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "keep" => Some(Self::Keep),
            "first" => Some(Self::SkipFirst),
            "firstWord" => Some(Self::SkipFirstWord),
            _ => None,
        }
    }

    /// The policy implied by the boolean `ignoreFirstSubToken` setting.
    #[must_use]
    pub const fn from_ignore_flag(ignore: bool) -> Self {
        if ignore { Self::SkipFirst } else { Self::Keep }
    }
}

/// The sub-tokens of `text` that receive decoration.
///
/// Delimiter runs never qualify. Offsets stay relative to `text`, so
/// skipped pieces still advance the column.
#[must_use]
pub fn eligible(text: &str, policy: FirstSubTokenPolicy) -> Vec<SubToken<'_>> {
    let pieces = segment(text);
    let skip = match policy {
        FirstSubTokenPolicy::Keep => None,
        FirstSubTokenPolicy::SkipFirst => Some(0),
        FirstSubTokenPolicy::SkipFirstWord => pieces.iter().position(|p| !p.is_delimiter),
    };
    pieces
        .into_iter()
        .enumerate()
        .filter(|&(i, p)| !p.is_delimiter && Some(i) != skip)
        .map(|(_, p)| p)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn words(text: &str) -> Vec<&str> {
        segment(text).iter().map(|t| t.text).collect()
    }

    // ── Boundaries ──────────────────────────────────────────────────

    #[test]
    fn camel_case() {
        assert_eq!(words("fooBar"), ["foo", "Bar"]);
    }

    #[test]
    fn acronym_then_word() {
        assert_eq!(words("HTTPServer"), ["HTTP", "Server"]);
    }

    #[test]
    fn digit_boundaries() {
        assert_eq!(words("item2Count"), ["item", "2", "Count"]);
        assert_eq!(words("utf8"), ["utf", "8"]);
        assert_eq!(words("x86_64"), ["x", "86", "_", "64"]);
    }

    #[test]
    fn delimiter_run_kept() {
        assert_eq!(words("a__b"), ["a", "__", "b"]);
    }

    #[test]
    fn mixed_delimiters_are_separate_runs() {
        assert_eq!(words("a_-b"), ["a", "_", "-", "b"]);
        assert_eq!(words("std::io"), ["std", "::", "io"]);
        assert_eq!(words("path/to\\file.rs"), ["path", "/", "to", "\\", "file", ".", "rs"]);
        assert_eq!(words("em—dash"), ["em", "—", "dash"]);
    }

    #[test]
    fn dunder() {
        assert_eq!(words("__init__"), ["__", "init", "__"]);
    }

    #[test]
    fn all_caps_stays_whole() {
        assert_eq!(words("MAX_VALUE"), ["MAX", "_", "VALUE"]);
        assert_eq!(words("ABC"), ["ABC"]);
    }

    #[test]
    fn acronym_digit_word() {
        assert_eq!(words("getHTTP2Response"), ["get", "HTTP", "2", "Response"]);
    }

    #[test]
    fn pascal_case() {
        assert_eq!(words("UserAccountId"), ["User", "Account", "Id"]);
    }

    #[test]
    fn unicode_letters_follow_case() {
        assert_eq!(words("naïveCafé"), ["naïve", "Café"]);
    }

    #[test]
    fn uncased_letters_do_not_split() {
        assert_eq!(words("名前2"), ["名前2"]);
    }

    #[test]
    fn empty_input() {
        assert!(segment("").is_empty());
    }

    // ── Offsets ─────────────────────────────────────────────────────

    #[test]
    fn offsets_and_lengths_count_chars() {
        let pieces = segment("élan_Vital");
        assert_eq!(
            pieces,
            vec![
                SubToken { text: "élan", offset: 0, len: 4, is_delimiter: false },
                SubToken { text: "_", offset: 4, len: 1, is_delimiter: true },
                SubToken { text: "Vital", offset: 5, len: 5, is_delimiter: false },
            ]
        );
    }

    #[test]
    fn round_trip_is_lossless() {
        for text in [
            "fooBar",
            "HTTPServer",
            "item2Count",
            "a__b",
            "__private__field",
            "self.inner::Value",
            "ALLCAPS",
            "x",
            "données_Météo42",
            "a-—-b",
            "  spaced  ",
        ] {
            let pieces = segment(text);
            let joined: String = pieces.iter().map(|t| t.text).collect();
            assert_eq!(joined, text);

            let mut expected_offset = 0;
            for p in &pieces {
                assert_eq!(p.offset, expected_offset, "{text}: gap before {:?}", p.text);
                assert_eq!(p.len, p.text.chars().count());
                expected_offset += p.len;
            }
        }
    }

    #[test]
    fn delimiter_classification() {
        for ch in DELIMITERS {
            assert!(is_delimiter(ch), "{ch:?}");
        }
        assert!(!is_delimiter('a'));
        assert!(!is_delimiter(' '));
    }

    // ── Eligibility ─────────────────────────────────────────────────

    fn eligible_words(text: &str, policy: FirstSubTokenPolicy) -> Vec<(&str, usize)> {
        eligible(text, policy).iter().map(|t| (t.text, t.offset)).collect()
    }

    #[test]
    fn keep_drops_only_delimiters() {
        assert_eq!(
            eligible_words("max_retry_count", FirstSubTokenPolicy::Keep),
            [("max", 0), ("retry", 4), ("count", 10)]
        );
    }

    #[test]
    fn skip_first_drops_index_zero() {
        assert_eq!(eligible_words("userName", FirstSubTokenPolicy::SkipFirst), [("Name", 4)]);
        // Index 0 is the delimiter here, so nothing extra is lost.
        assert_eq!(eligible_words("_private", FirstSubTokenPolicy::SkipFirst), [("private", 1)]);
    }

    #[test]
    fn skip_first_word_passes_leading_delimiters() {
        assert_eq!(
            eligible_words("__initFlag", FirstSubTokenPolicy::SkipFirstWord),
            [("Flag", 6)]
        );
    }

    #[test]
    fn single_word_with_skip_is_empty() {
        assert!(eligible("count", FirstSubTokenPolicy::SkipFirst).is_empty());
        assert!(eligible("", FirstSubTokenPolicy::Keep).is_empty());
    }

    #[test]
    fn policy_names() {
        assert_eq!(FirstSubTokenPolicy::from_name("firstWord"), Some(FirstSubTokenPolicy::SkipFirstWord));
        assert_eq!(FirstSubTokenPolicy::from_name("First"), None);
        assert_eq!(FirstSubTokenPolicy::from_ignore_flag(false), FirstSubTokenPolicy::Keep);
    }
}
