//! # tint-engine: Decoration assignment for hashtint
//!
//! Gives every identifier in a source file a stable color, derived only from
//! its own text and its semantic tags. The same name always gets the same
//! color, in every file, across restarts, with no stored state.
//!
//! # Architecture
//!
//! ```text
//! RawConfig ─▶ config.rs:   validate, fall back, report issues
//!                 │
//!                 ▼
//!              resource.rs: allocate every handle (solid, gradients, glyphs)
//!                 │          per semantic key, into one HandleArena
//!                 ▼
//! spans ─────▶ pattern.rs:  segment.rs   split identifiers into words
//!                           hash.rs      Pearson hash → bucket
//!                           semantic.rs  most specific color table
//!                           gradient.rs  char position → gradient level
//!                 │
//!                 ▼
//!              Vec<RenderAssignment>  (handle → char ranges)
//! ```
//!
//! [`Engine`] owns the whole pipeline and its lifecycle: one live
//! generation at a time, disposed in full before the next is built.

// Column and bucket arithmetic mixes usize with u8 hashes and f64 ratios.
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
// Tables in tests compare exact ratios copied from settings.
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod glyph;
pub mod gradient;
pub mod grid;
pub mod handle;
pub mod hash;
pub mod pattern;
pub mod resource;
pub mod segment;
pub mod semantic;
pub mod span;

pub use config::{EngineConfig, RawConfig, Validated, validate};
pub use diagnostics::{CollectingSink, DiagnosticsSink, LogSink};
pub use engine::Engine;
pub use error::{ConfigIssue, EngineError};
pub use handle::{ColorHandle, Disposed, HandleStyle};
pub use pattern::{BucketPolicy, RenderPattern, Strategy, Unit};
pub use segment::FirstSubTokenPolicy;
pub use semantic::SemanticKey;
pub use span::{CharRange, ClassifiedSpan, RenderAssignment};
