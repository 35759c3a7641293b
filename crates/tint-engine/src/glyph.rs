//! Built-in prefix glyphs for the badge pattern.
//!
//! Used when the configuration supplies no glyph list. Every entry is a
//! single emoji code point with a display width of 2, so badges line up.

/// Default glyph set, 64 entries.
pub const DEFAULT_GLYPHS: [&str; 64] = [
    "😃", "🥰", "🤢", "🥵", "🥶", "😎", "😱", "😡",
    "💀", "🤡", "👻", "👽", "🤖", "💖", "💥", "💫",
    "👀", "🐵", "🐶", "🦊", "🐱", "🦁", "🐯", "🐴",
    "🦄", "🐮", "🐷", "🐭", "🐹", "🐰", "🐻", "🐨",
    "🐼", "🐔", "🐤", "🐸", "🐳", "🐬", "🐙", "🦋",
    "🌸", "🌹", "🌻", "🌷", "🌱", "🌵", "🍀", "🍄",
    "🍉", "🍋", "🍌", "🍎", "🍒", "🥝", "🥑", "🌽",
    "🍕", "🍩", "🍪", "🔥", "🌊", "🎈", "🎲", "🧩",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use unicode_segmentation::UnicodeSegmentation;
    use unicode_width::UnicodeWidthStr;

    #[test]
    fn glyphs_are_unique() {
        let set: HashSet<_> = DEFAULT_GLYPHS.iter().collect();
        assert_eq!(set.len(), DEFAULT_GLYPHS.len());
    }

    #[test]
    fn glyphs_are_single_wide_graphemes() {
        for g in DEFAULT_GLYPHS {
            assert_eq!(g.graphemes(true).count(), 1, "{g} is not one grapheme");
            assert_eq!(g.width(), 2, "{g} is not double width");
        }
    }
}
