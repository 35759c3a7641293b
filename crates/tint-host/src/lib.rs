// SPDX-License-Identifier: MIT
//
// tint-host: everything between the engine and an editor.
//
// The engine turns spans into assignments. This crate gets the spans
// (decoding a language server's semantic token stream against the document
// text), decides when to compute them (a debounced pass per burst of
// edits), and hands the result to a display surface. Editors plug in by
// implementing `SpanSource` and `DisplaySurface`.

pub mod debounce;
pub mod legend;
pub mod session;
pub mod surface;

pub use debounce::Debouncer;
pub use legend::{DecodeError, Legend, decode_modifiers, decode_tokens};
pub use session::{PassOutcome, Session, Skip};
pub use surface::{DisplaySurface, DocumentId, DocumentTokens, RecordingSurface, SpanSource};
