// SPDX-License-Identifier: MIT
//
// The two collaborators a session talks to.
//
//   SpanSource      -> where semantic tokens come from (a language server,
//                      a dump file, a test fixture)
//   DisplaySurface  -> where decorations go (an editor view, stdout)
//
// Both are traits so the session never knows which host it runs in.

use std::path::{Path, PathBuf};

use ropey::Rope;
use tint_engine::{CharRange, ColorHandle, RenderAssignment};

use crate::legend::Legend;

/// Identity of an open document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId {
    path: PathBuf,
}

impl DocumentId {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File extension without the dot, if any.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }
}

/// Everything needed to decode one document's spans.
#[derive(Debug, Clone)]
pub struct DocumentTokens {
    pub legend: Legend,
    pub data: Vec<u32>,
    pub text: Rope,
}

/// Supplies semantic tokens for a document.
pub trait SpanSource {
    /// Tokens for `document`, or `None` if the provider has nothing yet.
    fn fetch(&mut self, document: &DocumentId) -> Option<DocumentTokens>;
}

/// Receives decorations.
pub trait DisplaySurface {
    /// Remove every decoration this session applied.
    fn clear_all(&mut self);

    /// Style `ranges` with `handle`.
    fn apply(&mut self, handle: ColorHandle, ranges: &[CharRange]);
}

/// A surface that keeps what it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSurface {
    /// Assignments applied since the last clear.
    pub applied: Vec<RenderAssignment>,
    /// Number of `clear_all` calls.
    pub clears: usize,
}

impl DisplaySurface for RecordingSurface {
    fn clear_all(&mut self) {
        self.applied.clear();
        self.clears += 1;
    }

    fn apply(&mut self, handle: ColorHandle, ranges: &[CharRange]) {
        self.applied.push(RenderAssignment {
            handle,
            ranges: ranges.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension() {
        assert_eq!(DocumentId::new("src/main.rs").extension(), Some("rs"));
        assert_eq!(DocumentId::new("Makefile").extension(), None);
    }

    #[test]
    fn recording_surface_resets_on_clear() {
        let mut s = RecordingSurface::default();
        s.clear_all();
        assert_eq!(s.clears, 1);
        assert!(s.applied.is_empty());
    }
}
