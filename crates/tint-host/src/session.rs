// SPDX-License-Identifier: MIT
//
// Session: one engine, one selected pattern, one debounced render pass.
//
// The host feeds the session three kinds of input:
//
//   triggers  (edit, focus, scroll)    -> on_trigger / preview / set_pattern
//   ticks     (its own loop heartbeat) -> tick
//   commands  (toggle, clear, reload)  -> set_enabled / clear / reload
//
// A pass runs only from `tick`, after the debounce delay. It fetches the
// document's tokens, decodes and filters them, renders the full assignment
// list, and only then clears the surface and applies. A pass that fails
// leaves the surface as it was: the last complete pass stays visible.

use std::time::Instant;

use tint_engine::{
    DiagnosticsSink, Engine, EngineConfig, EngineError, RawConfig, RenderPattern,
};

use crate::debounce::Debouncer;
use crate::legend::{DecodeError, decode_tokens};
use crate::surface::{DisplaySurface, DocumentId, SpanSource};

/// A scheduled render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Pass {
    document: DocumentId,
    pattern: RenderPattern,
}

/// Why a pass did not touch the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    Disabled,
    ExcludedExtension,
    /// The source had no tokens yet.
    NoTokens,
    Decode(DecodeError),
}

/// What a completed pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Rendered {
        pattern: RenderPattern,
        spans: usize,
        handles: usize,
    },
    Skipped(Skip),
    Failed(EngineError),
}

/// Decoration state for one host.
#[derive(Debug)]
pub struct Session {
    engine: Engine,
    pattern: RenderPattern,
    enabled: bool,
    debouncer: Debouncer<Pass>,
}

impl Session {
    /// Build the first generation from `raw` and select its default pattern.
    ///
    /// # Errors
    ///
    /// Propagates [`Engine::initialize`] errors (none for a fresh engine).
    pub fn new(raw: &RawConfig, sink: &mut dyn DiagnosticsSink) -> Result<Self, EngineError> {
        let mut engine = Engine::new();
        engine.initialize(raw, sink)?;
        let config = engine.config()?;
        let pattern = config.default_pattern;
        let debouncer = Debouncer::new(config.render_delay);
        Ok(Self {
            engine,
            pattern,
            enabled: true,
            debouncer,
        })
    }

    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The live configuration.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotInitialized`] if a reload left the engine empty.
    pub fn config(&self) -> Result<&EngineConfig, EngineError> {
        self.engine.config()
    }

    #[must_use]
    pub const fn pattern(&self) -> RenderPattern {
        self.pattern
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// When the host should next call [`Session::tick`].
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    // ── Triggers ────────────────────────────────────────────────────

    /// Something changed in `document`; schedule a pass.
    pub fn on_trigger(&mut self, document: DocumentId, now: Instant) {
        if !self.enabled {
            return;
        }
        let pattern = self.pattern;
        self.debouncer.trigger(now, Pass { document, pattern });
    }

    /// Select `pattern` and schedule a pass with it.
    pub fn set_pattern(&mut self, pattern: RenderPattern, document: DocumentId, now: Instant) {
        log::info!("pattern: {}", pattern.label());
        self.pattern = pattern;
        self.on_trigger(document, now);
    }

    /// Clear the surface at once, then schedule one pass with `pattern`
    /// without changing the selection.
    pub fn preview(
        &mut self,
        pattern: RenderPattern,
        document: DocumentId,
        now: Instant,
        surface: &mut dyn DisplaySurface,
    ) {
        if !self.enabled {
            return;
        }
        surface.clear_all();
        self.debouncer.trigger(now, Pass { document, pattern });
    }

    // ── Commands ────────────────────────────────────────────────────

    /// Turn decoration on or off. Turning off clears the surface and drops
    /// any pending pass.
    pub fn set_enabled(&mut self, enabled: bool, surface: &mut dyn DisplaySurface) {
        self.enabled = enabled;
        if !enabled {
            self.clear(surface);
        }
        log::info!("decoration {}", if enabled { "on" } else { "off" });
    }

    /// Remove decorations until the next pass.
    pub fn clear(&mut self, surface: &mut dyn DisplaySurface) {
        self.debouncer.cancel();
        surface.clear_all();
    }

    /// Dispose the current generation, build the next from `raw`, and
    /// schedule a pass for `document`.
    ///
    /// # Errors
    ///
    /// Propagates [`Engine::reload`] errors.
    pub fn reload(
        &mut self,
        raw: &RawConfig,
        sink: &mut dyn DiagnosticsSink,
        surface: &mut dyn DisplaySurface,
        document: DocumentId,
        now: Instant,
    ) -> Result<u32, EngineError> {
        // Handles of the old generation go stale, so nothing may stay applied.
        self.clear(surface);
        let generation = self.engine.reload(raw, sink)?;
        self.debouncer.set_delay(self.engine.config()?.render_delay);
        self.on_trigger(document, now);
        Ok(generation)
    }

    // ── Passes ──────────────────────────────────────────────────────

    /// Run the pending pass if its delay has elapsed.
    pub fn tick(
        &mut self,
        now: Instant,
        source: &mut dyn SpanSource,
        surface: &mut dyn DisplaySurface,
    ) -> Option<PassOutcome> {
        let pass = self.debouncer.poll(now)?;
        Some(self.run(&pass, source, surface))
    }

    fn run(
        &self,
        pass: &Pass,
        source: &mut dyn SpanSource,
        surface: &mut dyn DisplaySurface,
    ) -> PassOutcome {
        if !self.enabled {
            return PassOutcome::Skipped(Skip::Disabled);
        }
        let config = match self.engine.config() {
            Ok(c) => c,
            Err(e) => return PassOutcome::Failed(e),
        };
        if !pass
            .document
            .extension()
            .is_none_or(|ext| config.accepts_extension(ext))
        {
            log::debug!("{}: extension excluded", pass.document.path().display());
            return PassOutcome::Skipped(Skip::ExcludedExtension);
        }

        let Some(tokens) = source.fetch(&pass.document) else {
            log::debug!("{}: no semantic tokens yet", pass.document.path().display());
            return PassOutcome::Skipped(Skip::NoTokens);
        };
        let spans = match decode_tokens(&tokens.legend, &tokens.data, &tokens.text) {
            Ok(spans) => spans,
            Err(e) => {
                log::warn!("{}: {e}", pass.document.path().display());
                return PassOutcome::Skipped(Skip::Decode(e));
            }
        };
        let spans: Vec<_> = spans
            .into_iter()
            .filter(|s| config.targets_type(&s.semantic_type))
            .collect();

        let assignments = match self.engine.render(pass.pattern, &spans) {
            Ok(a) => a,
            Err(e) => {
                log::error!("render pass aborted: {e}");
                return PassOutcome::Failed(e);
            }
        };

        surface.clear_all();
        for assignment in &assignments {
            surface.apply(assignment.handle, &assignment.ranges);
        }
        log::debug!(
            "{}: {} span(s), {} handle(s)",
            pass.document.path().display(),
            spans.len(),
            assignments.len()
        );
        PassOutcome::Rendered {
            pattern: pass.pattern,
            spans: spans.len(),
            handles: assignments.len(),
        }
    }
}
