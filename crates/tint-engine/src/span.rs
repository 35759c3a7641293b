//! Classified spans in, character ranges out.
//!
//! All coordinates are **0-indexed** and count Unicode scalar values
//! (chars), not bytes. A span never crosses a line.

use std::fmt;

use crate::handle::ColorHandle;

// ---------------------------------------------------------------------------
// ClassifiedSpan
// ---------------------------------------------------------------------------

/// One identifier-like range of a document with its semantic tags.
///
/// Produced by the host per document version and consumed by one render
/// pass. `modifiers` keeps the order the host decoded them in, which is the
/// order wildcard rules are tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedSpan {
    pub line: usize,
    pub start: usize,
    pub length: usize,
    pub text: String,
    pub semantic_type: String,
    pub modifiers: Vec<String>,
}

impl ClassifiedSpan {
    /// A span whose length is taken from `text`.
    #[must_use]
    pub fn new(line: usize, start: usize, text: impl Into<String>, semantic_type: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            line,
            start,
            length: text.chars().count(),
            text,
            semantic_type: semantic_type.into(),
            modifiers: Vec::new(),
        }
    }

    /// Builder-style modifier list.
    #[must_use]
    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers = modifiers.into_iter().map(Into::into).collect();
        self
    }
}

// ---------------------------------------------------------------------------
// CharRange
// ---------------------------------------------------------------------------

/// A half-open column range `[start, end)` on one line.
///
/// Ordered by line, then start, then end.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharRange {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl CharRange {
    /// Create a range. Panics in debug if `start > end`.
    #[inline]
    #[must_use]
    pub const fn new(line: usize, start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "CharRange::new requires start <= end");
        Self { line, start, end }
    }

    /// A single-character range at `col`.
    #[inline]
    #[must_use]
    pub const fn single(line: usize, col: usize) -> Self {
        Self::new(line, col, col + 1)
    }

    /// Number of columns covered.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    /// True when `start == end`.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }
}

impl fmt::Debug for CharRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}..{}", self.line, self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// RenderAssignment
// ---------------------------------------------------------------------------

/// A handle and every range it styles in one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderAssignment {
    pub handle: ColorHandle,
    pub ranges: Vec<CharRange>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
