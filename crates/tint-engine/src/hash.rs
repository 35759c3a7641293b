//! Pearson hashing: text to a stable byte, byte to a bucket.
//!
//! Every "which color does this identifier get" decision in the engine goes
//! through two steps:
//!
//! 1. [`pearson_hash`] folds the text into one byte through a 256-entry
//!    permutation table: `acc = table[(acc ^ code_point) & 255]`, seeded at 0.
//!    A single-character edit changes the result unpredictably, while the
//!    same text always lands on the same byte.
//! 2. [`scale`] maps that byte linearly onto `0..=max_inclusive`, i.e. onto
//!    the index range of whatever color list is being picked from.
//!
//! The permutation table is configuration. [`PermutationTable::default`] is a
//! fixed shuffle of `0..=255` computed at compile time, so hashes are stable
//! across runs and machines.
//!
//! [`HashCache`] memoizes raw bytes per input string for the lifetime of one
//! configuration generation, up to [`MEMO_LIMIT`] entries.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Permutation table
// ---------------------------------------------------------------------------

/// Seed for the built-in shuffle. Changing it recolors every identifier.
const DEFAULT_SEED: u32 = 0x7a3c_51e9;

/// A permutation of `0..=255` used as the Pearson substitution table.
#[derive(Clone, PartialEq, Eq)]
pub struct PermutationTable([u8; 256]);

/// Why a candidate table was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The table does not have exactly 256 entries.
    Length(usize),
    /// An entry is outside `0..=255`.
    OutOfRange { index: usize, value: i64 },
    /// A value appears more than once, so some byte is unreachable.
    Duplicate { value: u8 },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(n) => write!(f, "expected 256 entries, found {n}"),
            Self::OutOfRange { index, value } => {
                write!(f, "entry {index} is {value}, outside 0..=255")
            }
            Self::Duplicate { value } => write!(f, "value {value} appears more than once"),
        }
    }
}

impl PermutationTable {
    /// Build a table from user-supplied values.
    ///
    /// # Errors
    ///
    /// Rejects anything that is not exactly a permutation of `0..=255`.
    pub fn from_values(values: &[i64]) -> Result<Self, TableError> {
        if values.len() != 256 {
            return Err(TableError::Length(values.len()));
        }
        let mut table = [0u8; 256];
        let mut seen = [false; 256];
        for (index, &value) in values.iter().enumerate() {
            let Ok(byte) = u8::try_from(value) else {
                return Err(TableError::OutOfRange { index, value });
            };
            if seen[usize::from(byte)] {
                return Err(TableError::Duplicate { value: byte });
            }
            seen[usize::from(byte)] = true;
            table[index] = byte;
        }
        Ok(Self(table))
    }

    #[inline]
    const fn lookup(&self, index: u8) -> u8 {
        self.0[index as usize]
    }
}

impl Default for PermutationTable {
    fn default() -> Self {
        Self(DEFAULT_TABLE)
    }
}

impl fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PermutationTable[{}, {}, {}, ..]", self.0[0], self.0[1], self.0[2])
    }
}

/// The built-in table: identity shuffled by Fisher–Yates over xorshift32.
const DEFAULT_TABLE: [u8; 256] = shuffled_identity(DEFAULT_SEED);

#[allow(clippy::cast_possible_truncation)]
const fn shuffled_identity(seed: u32) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = i as u8;
        i += 1;
    }

    let mut state = seed;
    let mut i = 255;
    while i > 0 {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let j = (state % (i as u32 + 1)) as usize;
        let tmp = table[i];
        table[i] = table[j];
        table[j] = tmp;
        i -= 1;
    }
    table
}

// ---------------------------------------------------------------------------
// Hash + scale
// ---------------------------------------------------------------------------

/// Pearson hash of `text` under `table`.
///
/// Each `char` contributes its Unicode scalar value; only the low byte of
/// `acc ^ code_point` selects the table entry.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn pearson_hash(text: &str, table: &PermutationTable) -> u8 {
    text.chars().fold(0u8, |acc, ch| {
        // Masked to one byte, so the cast is lossless.
        let index = (u32::from(acc) ^ u32::from(ch)) & 0xFF;
        table.lookup(index as u8)
    })
}

/// Map a hash byte onto `0..=max_inclusive` as `round(hash * max / 255)`.
///
/// Integer arithmetic, rounding half up, so the result never leaves the range.
#[must_use]
pub const fn scale(hash: u8, max_inclusive: usize) -> usize {
    (2 * hash as usize * max_inclusive + 255) / 510
}

// ---------------------------------------------------------------------------
// HashCache
// ---------------------------------------------------------------------------

/// Most strings a [`HashCache`] remembers before starting over.
pub const MEMO_LIMIT: usize = 8192;

/// Memoized Pearson hashing for one configuration generation.
///
/// Render passes only hold `&self`, so the memo sits behind a `RefCell`.
/// The cache is not `Sync`; one engine serves one thread. A full memo is
/// dropped wholesale, so a long session with many distinct identifiers
/// stays bounded.
#[derive(Debug)]
pub struct HashCache {
    table: PermutationTable,
    memo: RefCell<HashMap<String, u8>>,
    limit: usize,
}

impl Default for HashCache {
    fn default() -> Self {
        Self::new(PermutationTable::default())
    }
}

impl HashCache {
    /// Create an empty cache hashing through `table`.
    #[must_use]
    pub fn new(table: PermutationTable) -> Self {
        Self {
            table,
            memo: RefCell::new(HashMap::new()),
            limit: MEMO_LIMIT,
        }
    }

    /// Raw hash byte of `text`, computed at most once per generation.
    #[must_use]
    pub fn hash(&self, text: &str) -> u8 {
        if let Some(&byte) = self.memo.borrow().get(text) {
            return byte;
        }
        let byte = pearson_hash(text, &self.table);
        let mut memo = self.memo.borrow_mut();
        if memo.len() >= self.limit {
            log::trace!("hash memo reached {} entries; clearing", memo.len());
            memo.clear();
        }
        memo.insert(text.to_owned(), byte);
        byte
    }

    /// Bucket index of `text` in `0..=max_inclusive`.
    #[must_use]
    pub fn bucket(&self, text: &str, max_inclusive: usize) -> usize {
        scale(self.hash(text), max_inclusive)
    }

    /// Number of memoized strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.memo.borrow().len()
    }

    /// Whether nothing has been hashed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memo.borrow().is_empty()
    }

    /// Drop every memoized entry.
    pub fn clear(&self) {
        self.memo.borrow_mut().clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> PermutationTable {
        let values: Vec<i64> = (0..=255).collect();
        PermutationTable::from_values(&values).unwrap()
    }

    // ── Table ───────────────────────────────────────────────────────

    #[test]
    fn default_table_is_a_permutation() {
        let table = PermutationTable::default();
        let mut seen = [false; 256];
        for &b in &table.0 {
            assert!(!seen[usize::from(b)], "duplicate {b}");
            seen[usize::from(b)] = true;
        }
    }

    #[test]
    fn default_table_is_not_identity() {
        assert_ne!(PermutationTable::default(), identity());
    }

    #[test]
    fn rejects_short_table() {
        let values: Vec<i64> = (0..255).collect();
        assert_eq!(PermutationTable::from_values(&values), Err(TableError::Length(255)));
    }

    #[test]
    fn rejects_out_of_range_entry() {
        let mut values: Vec<i64> = (0..=255).collect();
        values[7] = 300;
        assert_eq!(
            PermutationTable::from_values(&values),
            Err(TableError::OutOfRange { index: 7, value: 300 })
        );
    }

    #[test]
    fn rejects_duplicate_entry() {
        let mut values: Vec<i64> = (0..=255).collect();
        values[1] = 0;
        assert_eq!(
            PermutationTable::from_values(&values),
            Err(TableError::Duplicate { value: 0 })
        );
    }

    // ── Hash ────────────────────────────────────────────────────────

    #[test]
    fn empty_string_hashes_to_zero_seed() {
        assert_eq!(pearson_hash("", &PermutationTable::default()), 0);
    }

    #[test]
    fn identity_table_is_xor_fold() {
        // With the identity table the hash degenerates to XOR of the low bytes.
        let t = identity();
        assert_eq!(pearson_hash("a", &t), b'a');
        assert_eq!(pearson_hash("ab", &t), b'a' ^ b'b');
    }

    #[test]
    fn hash_is_deterministic() {
        let t = PermutationTable::default();
        for s in ["userName", "HTTPServer", "x", "item2Count", "日本語"] {
            assert_eq!(pearson_hash(s, &t), pearson_hash(s, &t));
        }
    }

    #[test]
    fn hash_depends_on_table() {
        let words = ["alpha", "beta", "gamma", "delta", "epsilon"];
        let a = PermutationTable::default();
        let b = identity();
        assert!(words.iter().any(|w| pearson_hash(w, &a) != pearson_hash(w, &b)));
    }

    #[test]
    fn hash_spreads_over_byte_range() {
        let t = PermutationTable::default();
        let mut seen = std::collections::HashSet::new();
        for i in 0..2000 {
            seen.insert(pearson_hash(&format!("ident{i}"), &t));
        }
        assert!(seen.len() > 128, "only {} distinct bytes", seen.len());
    }

    // ── Scale ───────────────────────────────────────────────────────

    #[test]
    fn scale_endpoints() {
        assert_eq!(scale(0, 7), 0);
        assert_eq!(scale(255, 7), 7);
        assert_eq!(scale(255, 0), 0);
    }

    #[test]
    fn scale_rounds_half_up() {
        // 51 * 5 / 255 = 1.0 exactly; 25.5 boundary: 26 * 5 / 255 = 0.509 -> 1
        assert_eq!(scale(51, 5), 1);
        assert_eq!(scale(25, 5), 0);
        assert_eq!(scale(26, 5), 1);
    }

    #[test]
    fn scale_stays_in_range() {
        for max in [0usize, 1, 2, 9, 15, 255, 1000] {
            for h in 0..=255u8 {
                assert!(scale(h, max) <= max, "scale({h}, {max}) out of range");
            }
        }
    }

    #[test]
    fn scale_is_monotonic() {
        for max in [3usize, 10, 160] {
            for h in 0..255u8 {
                assert!(scale(h, max) <= scale(h + 1, max));
            }
        }
    }

    // ── Cache ───────────────────────────────────────────────────────

    #[test]
    fn cache_matches_direct_hash() {
        let cache = HashCache::new(PermutationTable::default());
        let direct = pearson_hash("userName", &PermutationTable::default());
        assert_eq!(cache.hash("userName"), direct);
        assert_eq!(cache.hash("userName"), direct);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_clear_empties_memo() {
        let cache = HashCache::default();
        let _ = cache.bucket("a", 3);
        let _ = cache.bucket("b", 3);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn memo_stays_within_its_limit() {
        let cache = HashCache {
            limit: 4,
            ..HashCache::default()
        };
        let table = PermutationTable::default();
        for i in 0..50 {
            let name = format!("ident{i}");
            assert_eq!(cache.hash(&name), pearson_hash(&name, &table));
            assert!(cache.len() <= 4, "memo grew to {}", cache.len());
        }
        assert_eq!(cache.hash("ident49"), pearson_hash("ident49", &table));
    }

    #[test]
    fn default_memo_limit() {
        assert_eq!(HashCache::default().limit, MEMO_LIMIT);
    }
}
