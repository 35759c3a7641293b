//! Error types for the engine.
//!
//! Two families with different propagation:
//!
//! - [`ConfigIssue`]: a field-level problem found while validating
//!   settings. Always recovered with a fallback value and reported; never
//!   returned as an `Err`.
//! - [`EngineError`]: misuse of the lifecycle or a broken internal
//!   invariant. Aborts the current call (one render pass at most).

use thiserror::Error;
use tint_color::ParseColorError;

use crate::handle::ColorHandle;
use crate::hash::TableError;
use crate::semantic::{InvalidSemanticCode, SemanticKey};

/// A recovered configuration problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigIssue {
    #[error("{field}: {value:?} is not a color ({reason}); {fallback}")]
    InvalidColor {
        field: String,
        value: String,
        reason: ParseColorError,
        fallback: &'static str,
    },

    #[error("{field}[{index}] = {value} is outside [0, 1]; clamped")]
    StepOutOfRange {
        field: &'static str,
        index: usize,
        value: f64,
    },

    #[error("{field}: expected {expected}, found {found}; ignored")]
    WrongType {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("{field} is missing or empty; using built-in defaults")]
    Missing { field: &'static str },

    #[error("permutationTable rejected ({0}); using the built-in table")]
    PermutationTable(TableError),

    #[error("semanticForegroundColors: {0}; rule ignored")]
    SemanticCode(InvalidSemanticCode),

    #[error("glyphs[{index}] = {value:?} must be exactly one character; ignored")]
    InvalidGlyph { index: usize, value: String },

    #[error("firstSubTokenPolicy {0:?} is not one of keep, first, firstWord; using ignoreFirstSubToken")]
    UnknownPolicy(String),

    #[error("defaultPattern {0:?} is not a known render pattern; using the default")]
    UnknownPattern(String),
}

/// Lifecycle misuse or a broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("engine is not initialized")]
    NotInitialized,

    #[error("engine already holds generation {0}; clear it before initializing again")]
    AlreadyInitialized(u32),

    #[error("handle {handle:?} is stale (current generation: {current:?})")]
    StaleHandle {
        handle: ColorHandle,
        current: Option<u32>,
    },

    #[error("no handle for {key} at bucket {bucket}, level {level:?}")]
    MissingHandle {
        key: SemanticKey,
        bucket: usize,
        level: Option<usize>,
    },

    #[error("unknown render pattern {0:?}")]
    UnknownPattern(String),
}
