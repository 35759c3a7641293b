// SPDX-License-Identifier: MIT
//
// sRGB color values: the only color representation the engine hands out.
//
// Colors arrive as hex literals in user settings (`#RGB` or `#RRGGBB`, the
// leading `#` optional) and leave as hex literals on decoration handles.
// Mixing is a straight per-channel linear interpolation in sRGB space:
//
//   out = round(a * alpha + b * (1 - alpha))      clamped to 0..=255
//
// No gamma correction. It is the same arithmetic editors use
// for "color with opacity over a foreground", so a blend step of 0.3 looks
// like the base color at 30% over the token's normal foreground.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ─── Rgb ─────────────────────────────────────────────────────────────────────

/// An opaque 8-bit sRGB color.
///
/// # Examples
///
/// ```
/// use tint_color::Rgb;
///
/// let red: Rgb = "#FF0000".parse().unwrap();
/// let short: Rgb = "f00".parse().unwrap();
/// assert_eq!(red, short);
///
/// let mixed = red.blend(Rgb::new(0, 0, 255), 0.5);
/// assert_eq!(mixed.to_string(), "#800080");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create a color from 8-bit channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mix `self` over `other` with weight `alpha` on `self`.
    ///
    /// `alpha` is clamped to `[0, 1]`: `blend(a, b, 1.0) == a` and
    /// `blend(a, b, 0.0) == b`. Every output channel saturates to `0..=255`.
    #[must_use]
    pub fn blend(self, other: Self, alpha: f64) -> Self {
        let alpha = alpha.clamp(0.0, 1.0);
        Self {
            r: mix_channel(self.r, other.r, alpha),
            g: mix_channel(self.g, other.g, alpha),
            b: mix_channel(self.b, other.b, alpha),
        }
    }
}

impl fmt::Debug for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rgb({self})")
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Parses a 3- or 6-digit hex literal, with or without a leading `#`.
impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Why a string is not a color literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    #[error("empty color literal")]
    Empty,
    #[error("color literal must have 3 or 6 hex digits, found {0}")]
    Length(usize),
    #[error("invalid hex digit {0:?} in color literal")]
    Digit(char),
}

// ─── Hex parsing ─────────────────────────────────────────────────────────────

fn parse_hex(s: &str) -> Result<Rgb, ParseColorError> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.is_empty() {
        return Err(ParseColorError::Empty);
    }
    if let Some(bad) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ParseColorError::Digit(bad));
    }

    // All ASCII from here on, so byte indexing is char indexing.
    let bytes = s.as_bytes();
    match bytes.len() {
        // #RGB
        3 => {
            let r = parse_hex_digit(bytes[0])?;
            let g = parse_hex_digit(bytes[1])?;
            let b = parse_hex_digit(bytes[2])?;
            Ok(Rgb::new(r << 4 | r, g << 4 | g, b << 4 | b))
        }
        // #RRGGBB
        6 => {
            let r = parse_hex_byte(&bytes[0..2])?;
            let g = parse_hex_byte(&bytes[2..4])?;
            let b = parse_hex_byte(&bytes[4..6])?;
            Ok(Rgb::new(r, g, b))
        }
        n => Err(ParseColorError::Length(n)),
    }
}

#[inline]
const fn parse_hex_digit(c: u8) -> Result<u8, ParseColorError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(ParseColorError::Digit(c as char)),
    }
}

#[inline]
fn parse_hex_byte(bytes: &[u8]) -> Result<u8, ParseColorError> {
    let hi = parse_hex_digit(bytes[0])?;
    let lo = parse_hex_digit(bytes[1])?;
    Ok(hi << 4 | lo)
}

/// Linear mix of one channel, rounded half away from zero and saturated.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn mix_channel(a: u8, b: u8, alpha: f64) -> u8 {
    let v = f64::from(a).mul_add(alpha, f64::from(b) * (1.0 - alpha));
    // Safe: clamp guarantees 0.0 <= value <= 255.0 before truncation.
    v.round().clamp(0.0, 255.0) as u8
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Parsing ─────────────────────────────────────────────────────

    #[test]
    fn parses_six_digit_with_hash() {
        assert_eq!("#FF8000".parse(), Ok(Rgb::new(255, 128, 0)));
    }

    #[test]
    fn parses_six_digit_without_hash() {
        assert_eq!("9cdcfe".parse(), Ok(Rgb::new(0x9c, 0xdc, 0xfe)));
    }

    #[test]
    fn parses_three_digit_shorthand() {
        assert_eq!(" #0f8 ".parse(), Ok(Rgb::new(0x00, 0xff, 0x88)));
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!("#12345".parse::<Rgb>(), Err(ParseColorError::Length(5)));
        assert_eq!("#ff000000".parse::<Rgb>(), Err(ParseColorError::Length(8)));
    }

    #[test]
    fn rejects_non_hex_digit() {
        assert_eq!("#ggg".parse::<Rgb>(), Err(ParseColorError::Digit('g')));
        assert_eq!("red".parse::<Rgb>(), Err(ParseColorError::Digit('r')));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!("#".parse::<Rgb>(), Err(ParseColorError::Empty));
        assert_eq!("".parse::<Rgb>(), Err(ParseColorError::Empty));
    }

    #[test]
    fn rejects_multibyte_without_panicking() {
        assert_eq!("#ééé".parse::<Rgb>(), Err(ParseColorError::Digit('é')));
    }

    #[test]
    fn display_is_lowercase_hex() {
        assert_eq!(Rgb::new(0xAB, 0x01, 0xFF).to_string(), "#ab01ff");
        assert_eq!(format!("{:?}", Rgb::new(1, 2, 3)), "Rgb(#010203)");
    }

    // ── Blending ────────────────────────────────────────────────────

    #[test]
    fn blend_zero_is_other() {
        let a = Rgb::new(10, 200, 30);
        let b = Rgb::new(250, 5, 128);
        assert_eq!(a.blend(b, 0.0), b);
    }

    #[test]
    fn blend_one_is_self() {
        let a = Rgb::new(10, 200, 30);
        let b = Rgb::new(250, 5, 128);
        assert_eq!(a.blend(b, 1.0), a);
    }

    #[test]
    fn blend_half_rounds() {
        // 255 * 0.5 + 0 * 0.5 = 127.5 -> 128
        let mixed = Rgb::new(255, 0, 0).blend(Rgb::BLACK, 0.5);
        assert_eq!(mixed, Rgb::new(128, 0, 0));
    }

    #[test]
    fn blend_clamps_alpha() {
        let a = Rgb::new(100, 100, 100);
        let b = Rgb::new(200, 200, 200);
        assert_eq!(a.blend(b, 1.7), a);
        assert_eq!(a.blend(b, -0.2), b);
    }

    #[test]
    fn blend_channels_stay_in_range() {
        let a = Rgb::WHITE;
        let b = Rgb::BLACK;
        for step in 0..=100 {
            let alpha = f64::from(step) / 100.0;
            let c = a.blend(b, alpha);
            // u8 is in range by construction; check the channels move together.
            assert_eq!(c.r, c.g);
            assert_eq!(c.g, c.b);
        }
        assert!(a.blend(b, 0.25).r < a.blend(b, 0.75).r);
    }
}
