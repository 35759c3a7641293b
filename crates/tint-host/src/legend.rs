// SPDX-License-Identifier: MIT
//
// Semantic token stream decoding.
//
// Language servers ship semantic tokens as a flat `u32` array, five values
// per token, with positions delta-encoded against the previous token:
//
//   [deltaLine, deltaStart, length, typeIndex, modifierBits] ...
//
//   deltaLine  == 0  ->  same line, start = previous start + deltaStart
//   deltaLine  >  0  ->  line += deltaLine, start = deltaStart
//
// Type and modifier names come from the legend: `typeIndex` indexes
// `tokenTypes`, and bit `i` of `modifierBits` selects `tokenModifiers[i]`.
// `deltaStart` and `length` count UTF-16 code units, as the protocol
// specifies. Spans leave here with char columns; the conversion goes through
// the rope's UTF-16 index, so astral characters earlier on a line (emoji,
// for one) do not shift the spans after them.

use ropey::{Rope, RopeSlice};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tint_engine::ClassifiedSpan;

/// Values per encoded token.
const STRIDE: usize = 5;

/// Names for the indices and bits of a token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Legend {
    pub token_types: Vec<String>,
    pub token_modifiers: Vec<String>,
}

/// Why a token stream could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("token data has {0} values, not a multiple of 5")]
    Truncated(usize),

    #[error("token {index}: type index {type_index} is outside the legend ({len} types)")]
    UnknownType {
        index: usize,
        type_index: u32,
        len: usize,
    },

    #[error("token {index}: line {line} is past the end of the document ({lines} lines)")]
    LineOutOfRange {
        index: usize,
        line: usize,
        lines: usize,
    },

    #[error(
        "token {index}: UTF-16 columns {start}..{end} run past the end of line {line} ({len} code units)"
    )]
    ColumnOutOfRange {
        index: usize,
        line: usize,
        start: usize,
        end: usize,
        len: usize,
    },
}

/// Modifier names whose bits are set in `bits`, in legend order.
///
/// Bits past the end of the legend are ignored.
#[must_use]
pub fn decode_modifiers(bits: u32, legend: &Legend) -> Vec<String> {
    legend
        .token_modifiers
        .iter()
        .take(32)
        .enumerate()
        .filter(|&(i, _)| bits & (1 << i) != 0)
        .map(|(_, name)| name.clone())
        .collect()
}

/// Decode a full token stream against `text`.
///
/// # Errors
///
/// Any malformed token fails the whole stream; partial results are never
/// returned.
pub fn decode_tokens(
    legend: &Legend,
    data: &[u32],
    text: &Rope,
) -> Result<Vec<ClassifiedSpan>, DecodeError> {
    if data.len() % STRIDE != 0 {
        return Err(DecodeError::Truncated(data.len()));
    }

    let mut spans = Vec::with_capacity(data.len() / STRIDE);
    let mut line = 0usize;
    let mut start = 0usize;

    for (index, token) in data.chunks_exact(STRIDE).enumerate() {
        let &[delta_line, delta_start, length, type_index, bits] = token else {
            continue;
        };
        if delta_line == 0 {
            start += delta_start as usize;
        } else {
            line += delta_line as usize;
            start = delta_start as usize;
        }
        let end = start + length as usize;

        let semantic_type = legend
            .token_types
            .get(type_index as usize)
            .ok_or_else(|| DecodeError::UnknownType {
                index,
                type_index,
                len: legend.token_types.len(),
            })?;

        if line >= text.len_lines() {
            return Err(DecodeError::LineOutOfRange {
                index,
                line,
                lines: text.len_lines(),
            });
        }
        let line_text = text.line(line);
        let content = line_text.slice(..content_len(line_text));
        let len = content.len_utf16_cu();
        if end > len {
            return Err(DecodeError::ColumnOutOfRange {
                index,
                line,
                start,
                end,
                len,
            });
        }

        let char_start = content.utf16_cu_to_char(start);
        let char_end = content.utf16_cu_to_char(end);
        let span_text = content.slice(char_start..char_end).to_string();
        spans.push(
            ClassifiedSpan::new(line, char_start, span_text, semantic_type.as_str())
                .with_modifiers(decode_modifiers(bits, legend)),
        );
    }

    log::debug!("decoded {} semantic token(s)", spans.len());
    Ok(spans)
}

/// Chars on a line, not counting its line break.
fn content_len(line: RopeSlice<'_>) -> usize {
    let mut len = line.len_chars();
    while len > 0 && matches!(line.char(len - 1), '\n' | '\r') {
        len -= 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn legend() -> Legend {
        Legend {
            token_types: vec!["variable".into(), "parameter".into(), "function".into()],
            token_modifiers: vec!["declaration".into(), "readonly".into(), "static".into()],
        }
    }

    #[test]
    fn legend_from_json() {
        let l: Legend = serde_json::from_str(
            r#"{ "tokenTypes": ["variable"], "tokenModifiers": ["readonly"] }"#,
        )
        .unwrap();
        assert_eq!(l.token_types, ["variable"]);
        assert_eq!(l.token_modifiers, ["readonly"]);
    }

    #[test]
    fn modifiers_follow_legend_order() {
        assert_eq!(decode_modifiers(0b101, &legend()), ["declaration", "static"]);
        assert!(decode_modifiers(0, &legend()).is_empty());
        // Bit 7 has no name.
        assert_eq!(decode_modifiers(0b1000_0010, &legend()), ["readonly"]);
    }

    #[test]
    fn delta_positions() {
        let text = Rope::from_str("let userName = 1;\nfoo(userName, maxCount);\n");
        #[rustfmt::skip]
        let data = [
            0, 4, 8, 0, 0b01,   // userName   line 0 col 4
            1, 0, 3, 2, 0,      // foo        line 1 col 0
            0, 4, 8, 0, 0,      // userName   line 1 col 4
            0, 10, 8, 1, 0b10,  // maxCount   line 1 col 14
        ];
        let spans = decode_tokens(&legend(), &data, &text).unwrap();
        let summary: Vec<_> = spans
            .iter()
            .map(|s| (s.line, s.start, s.text.as_str(), s.semantic_type.as_str()))
            .collect();
        assert_eq!(
            summary,
            [
                (0, 4, "userName", "variable"),
                (1, 0, "foo", "function"),
                (1, 4, "userName", "variable"),
                (1, 14, "maxCount", "parameter"),
            ]
        );
        assert_eq!(spans[0].modifiers, ["declaration"]);
        assert_eq!(spans[3].modifiers, ["readonly"]);
        assert_eq!(spans[3].length, 8);
    }

    #[test]
    fn bmp_text_columns_match_chars() {
        let text = Rope::from_str("// é\nlet café = 1;\n");
        let data = [1, 4, 4, 0, 0];
        let spans = decode_tokens(&legend(), &data, &text).unwrap();
        assert_eq!(spans[0].text, "café");
        assert_eq!(spans[0].start, 4);
    }

    #[test]
    fn astral_chars_take_two_code_units() {
        // 🦊 is one char but two UTF-16 code units.
        let text = Rope::from_str("f(\"🦊\", userName)\n");
        #[rustfmt::skip]
        let data = [
            0, 0, 1, 2, 0,   // f          utf16 0
            0, 8, 8, 1, 0,   // userName   utf16 8, char 7
        ];
        let spans = decode_tokens(&legend(), &data, &text).unwrap();
        assert_eq!(spans[1].text, "userName");
        assert_eq!((spans[1].start, spans[1].length), (7, 8));
    }

    #[test]
    fn astral_token_itself_is_one_char() {
        let text = Rope::from_str("a🦊b\n");
        let spans = decode_tokens(&legend(), &[0, 1, 2, 0, 0, 0, 2, 1, 0, 0], &text).unwrap();
        assert_eq!(spans[0].text, "🦊");
        assert_eq!((spans[0].start, spans[0].length), (1, 1));
        assert_eq!((spans[1].text.as_str(), spans[1].start), ("b", 2));
    }

    #[test]
    fn empty_stream() {
        let text = Rope::from_str("");
        assert_eq!(decode_tokens(&legend(), &[], &text), Ok(vec![]));
    }

    #[test]
    fn truncated_stream() {
        let text = Rope::from_str("x");
        assert_eq!(
            decode_tokens(&legend(), &[0, 0, 1, 0], &text),
            Err(DecodeError::Truncated(4))
        );
    }

    #[test]
    fn unknown_type_index() {
        let text = Rope::from_str("x");
        assert!(matches!(
            decode_tokens(&legend(), &[0, 0, 1, 9, 0], &text),
            Err(DecodeError::UnknownType { type_index: 9, .. })
        ));
    }

    #[test]
    fn line_length_is_checked_in_code_units() {
        let text = Rope::from_str("🦊x\n");
        assert!(decode_tokens(&legend(), &[0, 2, 1, 0, 0], &text).is_ok());
        assert_eq!(
            decode_tokens(&legend(), &[0, 2, 2, 0, 0], &text),
            Err(DecodeError::ColumnOutOfRange { index: 0, line: 0, start: 2, end: 4, len: 3 })
        );
    }

    #[test]
    fn out_of_bounds_positions() {
        let text = Rope::from_str("abc\r\n");
        assert!(matches!(
            decode_tokens(&legend(), &[0, 1, 3, 0, 0], &text),
            Err(DecodeError::ColumnOutOfRange { end: 4, len: 3, .. })
        ));
        assert!(matches!(
            decode_tokens(&legend(), &[5, 0, 1, 0, 0], &text),
            Err(DecodeError::LineOutOfRange { line: 5, .. })
        ));
    }
}
