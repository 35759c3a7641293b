//! Engine lifecycle: building, serving and disposing generations.
//!
//! A *generation* is everything derived from one configuration load: the
//! validated settings, the handle arena, the color tables and the hash memo.
//! The engine holds at most one generation at a time.
//!
//! ```text
//!            initialize            clear
//!   Empty ──────────────▶ Live(N) ───────▶ Empty
//!                            │
//!                            └── reload ──▶ Live(N+1)
//! ```
//!
//! Generation numbers never repeat, so a handle kept across a reload is
//! recognized as stale instead of silently naming a different style.

use tint_color::Rgb;

use crate::config::{EngineConfig, RawConfig, validate};
use crate::diagnostics::DiagnosticsSink;
use crate::error::EngineError;
use crate::handle::{ColorHandle, Disposed, HandleArena, HandleStyle};
use crate::hash::HashCache;
use crate::pattern::{RenderContext, RenderPattern, Strategy, render, render_strategy};
use crate::resource::Resources;
use crate::span::{ClassifiedSpan, RenderAssignment};

/// One configuration load's worth of state.
#[derive(Debug)]
struct Generation {
    config: EngineConfig,
    arena: HandleArena,
    resources: Resources,
    hashes: HashCache,
}

impl Generation {
    fn context(&self) -> RenderContext<'_> {
        RenderContext::new(&self.config, &self.resources, &self.hashes)
    }
}

/// The decoration assignment engine.
#[derive(Debug, Default)]
pub struct Engine {
    next_generation: u32,
    current: Option<Generation>,
}

impl Engine {
    /// An engine with no live generation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_generation: 0,
            current: None,
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Validate `raw`, report every issue to `sink`, and build a generation.
    ///
    /// Returns the new generation number.
    ///
    /// # Errors
    ///
    /// [`EngineError::AlreadyInitialized`] if a generation is live.
    pub fn initialize(
        &mut self,
        raw: &RawConfig,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<u32, EngineError> {
        if let Some(live) = &self.current {
            return Err(EngineError::AlreadyInitialized(live.arena.generation()));
        }
        let validated = validate(raw);
        for issue in &validated.issues {
            log::warn!("config: {issue}");
            sink.error(&issue.to_string());
        }
        let generation = self.install(validated.config)?;
        sink.info(&format!(
            "generation {generation} ready with {} handle(s)",
            self.handle_count()
        ));
        Ok(generation)
    }

    /// Build a generation from an already validated configuration.
    ///
    /// # Errors
    ///
    /// [`EngineError::AlreadyInitialized`] if a generation is live.
    pub fn install(&mut self, config: EngineConfig) -> Result<u32, EngineError> {
        if let Some(live) = &self.current {
            return Err(EngineError::AlreadyInitialized(live.arena.generation()));
        }
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);

        let mut arena = HandleArena::new(generation);
        let resources = Resources::build(&config, &mut arena);
        let hashes = HashCache::new(config.permutation.clone());
        log::info!("generation {generation}: allocated {} handle(s)", arena.len());

        self.current = Some(Generation {
            config,
            arena,
            resources,
            hashes,
        });
        Ok(generation)
    }

    /// Dispose the live generation, if any. Idempotent.
    pub fn clear(&mut self) -> Option<Disposed> {
        let live = self.current.take()?;
        live.hashes.clear();
        let disposed = live.arena.dispose();
        log::info!(
            "generation {}: disposed {} handle(s)",
            disposed.generation,
            disposed.count
        );
        Some(disposed)
    }

    /// Dispose the live generation and build the next one from `raw`.
    ///
    /// # Errors
    ///
    /// Never fails in practice: the slot is always empty after clearing.
    pub fn reload(
        &mut self,
        raw: &RawConfig,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<u32, EngineError> {
        self.clear();
        self.initialize(raw, sink)
    }

    // ── Queries ─────────────────────────────────────────────────────

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    /// Number of the live generation.
    #[must_use]
    pub fn generation(&self) -> Option<u32> {
        self.current.as_ref().map(|g| g.arena.generation())
    }

    /// The live configuration.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotInitialized`] before `initialize` or after `clear`.
    pub fn config(&self) -> Result<&EngineConfig, EngineError> {
        self.live().map(|g| &g.config)
    }

    /// The live color tables.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotInitialized`] when no generation is live.
    pub fn resources(&self) -> Result<&Resources, EngineError> {
        self.live().map(|g| &g.resources)
    }

    /// Number of live handles (zero when empty).
    #[must_use]
    pub fn handle_count(&self) -> usize {
        self.current.as_ref().map_or(0, |g| g.arena.len())
    }

    /// Every live handle in allocation order.
    #[must_use]
    pub fn handles(&self) -> Vec<ColorHandle> {
        self.current
            .as_ref()
            .map(|g| g.arena.handles().collect())
            .unwrap_or_default()
    }

    /// What `handle` renders as.
    ///
    /// # Errors
    ///
    /// [`EngineError::StaleHandle`] if the handle belongs to a disposed
    /// generation (or no generation is live).
    pub fn style(&self, handle: ColorHandle) -> Result<&HandleStyle, EngineError> {
        self.current
            .as_ref()
            .and_then(|g| g.arena.get(handle))
            .ok_or_else(|| EngineError::StaleHandle {
                handle,
                current: self.generation(),
            })
    }

    /// Shorthand for the color part of [`Engine::style`].
    ///
    /// # Errors
    ///
    /// See [`Engine::style`].
    pub fn color(&self, handle: ColorHandle) -> Result<Option<Rgb>, EngineError> {
        self.style(handle).map(HandleStyle::color)
    }

    /// Bucket of `text` in `0..=max_inclusive`, through the live memo.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotInitialized`] when no generation is live.
    pub fn get_hash(&self, text: &str, max_inclusive: usize) -> Result<usize, EngineError> {
        self.live().map(|g| g.hashes.bucket(text, max_inclusive))
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Assignments for `spans` under `pattern`.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotInitialized`] when no generation is live, or any
    /// error of [`crate::pattern::render`].
    pub fn render(
        &self,
        pattern: RenderPattern,
        spans: &[ClassifiedSpan],
    ) -> Result<Vec<RenderAssignment>, EngineError> {
        let live = self.live()?;
        let out = render(pattern, spans, &live.context())?;
        log::trace!(
            "{}: {} span(s) -> {} handle(s)",
            pattern.slug(),
            spans.len(),
            out.len()
        );
        Ok(out)
    }

    /// Assignments for `spans` under an arbitrary strategy.
    ///
    /// # Errors
    ///
    /// See [`Engine::render`].
    pub fn render_with(
        &self,
        strategy: Strategy,
        spans: &[ClassifiedSpan],
    ) -> Result<Vec<RenderAssignment>, EngineError> {
        let live = self.live()?;
        render_strategy(strategy, spans, &live.context())
    }

    fn live(&self) -> Result<&Generation, EngineError> {
        self.current.as_ref().ok_or(EngineError::NotInitialized)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::gradient::LevelOrder;
    use crate::pattern::{BucketPolicy, Unit};
    use crate::span::CharRange;
    use pretty_assertions::assert_eq;

    fn raw(json: &str) -> RawConfig {
        serde_json::from_str(json).unwrap()
    }

    fn ready() -> Engine {
        let mut engine = Engine::new();
        let mut sink = CollectingSink::new();
        engine
            .initialize(&raw(r##"{ "solidColors": ["#e06c75", "#98c379", "#61afef"] }"##), &mut sink)
            .unwrap();
        engine
    }

    #[test_log::test]
    fn initialize_reports_issues_and_builds() {
        let mut engine = Engine::new();
        let mut sink = CollectingSink::new();
        let generation = engine
            .initialize(&raw(r##"{ "solidColors": ["#zzz", "#fff"] }"##), &mut sink)
            .unwrap();
        assert_eq!(generation, 0);
        assert_eq!(sink.errors.len(), 1);
        assert!(sink.errors[0].contains("solidColors[0]"));
        assert_eq!(sink.infos.len(), 1);
        assert!(engine.handle_count() > 0);
    }

    #[test]
    fn initialize_twice_is_an_error() {
        let mut engine = ready();
        let err = engine
            .initialize(&RawConfig::default(), &mut CollectingSink::new())
            .unwrap_err();
        assert_eq!(err, EngineError::AlreadyInitialized(0));
    }

    #[test]
    fn uninitialized_queries_fail() {
        let engine = Engine::new();
        assert_eq!(engine.get_hash("x", 3), Err(EngineError::NotInitialized));
        assert_eq!(
            engine.render(RenderPattern::default(), &[]),
            Err(EngineError::NotInitialized)
        );
        assert!(engine.handles().is_empty());
        assert!(engine.config().is_err());
    }

    #[test_log::test]
    fn clear_is_idempotent() {
        let mut engine = ready();
        let count = engine.handle_count();
        assert_eq!(
            engine.clear(),
            Some(Disposed {
                generation: 0,
                count
            })
        );
        assert_eq!(engine.clear(), None);
        assert!(!engine.is_initialized());
    }

    #[test]
    fn reload_bumps_generation_and_stales_handles() {
        let mut engine = ready();
        let old = engine.handles()[0];
        assert!(engine.style(old).is_ok());

        let generation = engine
            .reload(&raw(r##"{ "solidColors": ["#000"] }"##), &mut CollectingSink::new())
            .unwrap();
        assert_eq!(generation, 1);
        assert_eq!(
            engine.style(old),
            Err(EngineError::StaleHandle {
                handle: old,
                current: Some(1)
            })
        );
        assert!(engine.handles().iter().all(|h| h.generation() == 1));
    }

    #[test]
    fn hash_is_stable_within_and_across_generations() {
        let mut engine = ready();
        let a = engine.get_hash("requestCount", 9).unwrap();
        assert_eq!(engine.get_hash("requestCount", 9).unwrap(), a);
        engine
            .reload(&raw(r##"{ "solidColors": ["#000"] }"##), &mut CollectingSink::new())
            .unwrap();
        assert_eq!(engine.get_hash("requestCount", 9).unwrap(), a);
        assert_eq!(engine.get_hash("requestCount", 0).unwrap(), 0);
    }

    #[test]
    fn user_name_end_to_end() {
        let mut engine = Engine::new();
        engine
            .initialize(
                &raw(r##"{ "solidColors": ["#FF0000", "#00FF00"], "ignoreFirstSubToken": true }"##),
                &mut CollectingSink::new(),
            )
            .unwrap();
        let spans = [ClassifiedSpan::new(0, 0, "userName", "variable")];
        let out = engine
            .render_with(
                Strategy {
                    bucket: BucketPolicy::PerSpan,
                    unit: Unit::WholeSubToken,
                    order: None,
                },
                &spans,
            )
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ranges, [CharRange::new(0, 4, 8)]);
        let color = engine.color(out[0].handle).unwrap().unwrap();
        assert!(color == Rgb::new(255, 0, 0) || color == Rgb::new(0, 255, 0));
    }

    #[test]
    fn every_rendered_handle_is_live() {
        let engine = ready();
        let spans = [
            ClassifiedSpan::new(0, 0, "HTTPServer", "variable").with_modifiers(["readonly"]),
            ClassifiedSpan::new(1, 2, "item2Count", "parameter"),
        ];
        for pattern in RenderPattern::ALL {
            for assignment in engine.render(pattern, &spans).unwrap() {
                assert!(engine.style(assignment.handle).is_ok());
                assert!(!assignment.ranges.is_empty());
            }
        }
        let fade = engine
            .render_with(
                Strategy {
                    bucket: BucketPolicy::Shared,
                    unit: Unit::FirstCharacter,
                    order: Some(LevelOrder::Ascending),
                },
                &spans,
            )
            .unwrap();
        assert_eq!(fade.len(), 1);
    }
}
