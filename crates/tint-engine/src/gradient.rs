//! Gradient quantization: character positions to a bounded set of levels.
//!
//! A gradient row has exactly [`GRADIENT_LEVELS`] precomputed colors, no
//! matter how long identifiers get. A sub-token's character index is mapped
//! onto those levels through a small "pointer array" picked by the
//! sub-token's length bucket, so short words still sweep across the whole
//! fade and long words hold the final level after the first 16 characters.
//!
//! Level 0 is the most saturated color of a row (see `config`'s step lists).
//! [`LevelOrder::Ascending`] starts saturated and fades out;
//! [`LevelOrder::Descending`] mirrors it and fades in.

/// Number of gradient levels in every gradient row.
pub const GRADIENT_LEVELS: usize = 16;

const LAST_LEVEL: usize = GRADIENT_LEVELS - 1;

/// Pointer arrays per length bucket. Hand-tuned; kept literal.
const POINTERS_LEN_2: [usize; 2] = [0, 15];
const POINTERS_LEN_4: [usize; 4] = [0, 5, 10, 15];
const POINTERS_LEN_8: [usize; 8] = [0, 2, 4, 6, 9, 11, 13, 15];
const POINTERS_LEN_16: [usize; 12] = [0, 1, 3, 4, 5, 7, 8, 10, 11, 12, 14, 15];
const POINTERS_LONG: [usize; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

/// Direction a gradient runs across a sub-token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelOrder {
    /// Saturated at the first character, fading toward the end (fade-out).
    Ascending,
    /// Faded at the first character, saturating toward the end (fade-in).
    Descending,
}

/// The pointer array for a sub-token of `len` characters.
#[must_use]
pub const fn pointer_array(len: usize) -> &'static [usize] {
    match len {
        0..=2 => &POINTERS_LEN_2,
        3..=4 => &POINTERS_LEN_4,
        5..=8 => &POINTERS_LEN_8,
        9..=16 => &POINTERS_LEN_16,
        _ => &POINTERS_LONG,
    }
}

/// Gradient level for character `index` of a sub-token of `len` characters.
///
/// Indices past the pointer array hold the final level of the fade.
#[must_use]
pub fn level_for(index: usize, len: usize, order: LevelOrder) -> usize {
    let ascending = pointer_array(len).get(index).copied().unwrap_or(LAST_LEVEL);
    match order {
        LevelOrder::Ascending => ascending,
        LevelOrder::Descending => LAST_LEVEL - ascending,
    }
}

/// Resample a step list onto exactly [`GRADIENT_LEVELS`] entries.
///
/// Level `k` takes `steps[round(k * (n - 1) / 15)]`. An empty list yields an
/// empty result; callers validate that case before building colors.
#[must_use]
pub fn resample_steps(steps: &[f64]) -> Vec<f64> {
    if steps.is_empty() {
        return Vec::new();
    }
    let last = steps.len() - 1;
    (0..GRADIENT_LEVELS)
        .map(|k| {
            let index = (2 * k * last + LAST_LEVEL) / (2 * LAST_LEVEL);
            steps[index]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
