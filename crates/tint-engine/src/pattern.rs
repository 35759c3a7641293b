//! Render patterns: the eleven ways a span list becomes decorations.
//!
//! Ten of the patterns are points in one parameter space, a [`Strategy`]:
//!
//! | Axis | Values |
//! |------|--------|
//! | [`BucketPolicy`] | per sub-token, per span, shared |
//! | [`Unit`] | first character, whole sub-token |
//! | level order | none (solid), ascending (fade-out), descending (fade-in) |
//!
//! The eleventh, [`RenderPattern::GlyphPrefix`], puts a glyph badge at the
//! start of each span instead of recoloring text.
//!
//! [`render`] walks every span, segments it, keeps the eligible sub-tokens,
//! picks a color bucket by hashing, and emits one [`CharRange`] per colored
//! run. Output groups ranges by handle in first-use order, so the same input
//! always yields byte-identical output.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::gradient::{LevelOrder, level_for};
use crate::handle::ColorHandle;
use crate::hash::HashCache;
use crate::resource::{ColorTables, Resources};
use crate::segment::{FirstSubTokenPolicy, eligible};
use crate::semantic::SemanticKey;
use crate::span::{CharRange, ClassifiedSpan, RenderAssignment};

// ---------------------------------------------------------------------------
// RenderPattern
// ---------------------------------------------------------------------------

/// A named, user-selectable rendering strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderPattern {
    #[default]
    FadeInUniqueSubToken,
    FadeInUniqueToken,
    FadeInCommon,
    FadeOutUniqueSubToken,
    FadeOutUniqueToken,
    FadeOutCommon,
    FirstCharUniqueSubToken,
    FirstCharUniqueToken,
    FirstCharCommon,
    SubTokenSolidUniqueSubToken,
    GlyphPrefix,
}

impl RenderPattern {
    /// Every pattern in picker order.
    pub const ALL: [Self; 11] = [
        Self::FadeInUniqueSubToken,
        Self::FadeInUniqueToken,
        Self::FadeInCommon,
        Self::FadeOutUniqueSubToken,
        Self::FadeOutUniqueToken,
        Self::FadeOutCommon,
        Self::FirstCharUniqueSubToken,
        Self::FirstCharUniqueToken,
        Self::FirstCharCommon,
        Self::SubTokenSolidUniqueSubToken,
        Self::GlyphPrefix,
    ];

    /// Two-digit picker code, `01` through `11`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::FadeInUniqueSubToken => "01",
            Self::FadeInUniqueToken => "02",
            Self::FadeInCommon => "03",
            Self::FadeOutUniqueSubToken => "04",
            Self::FadeOutUniqueToken => "05",
            Self::FadeOutCommon => "06",
            Self::FirstCharUniqueSubToken => "07",
            Self::FirstCharUniqueToken => "08",
            Self::FirstCharCommon => "09",
            Self::SubTokenSolidUniqueSubToken => "10",
            Self::GlyphPrefix => "11",
        }
    }

    /// Human-readable label shown in the picker.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FadeInUniqueSubToken => "Subtext - Fade In Gradient - Unique Subtext",
            Self::FadeInUniqueToken => "Subtext - Fade In Gradient - Unique Text",
            Self::FadeInCommon => "Subtext - Fade In Gradient - Commonly",
            Self::FadeOutUniqueSubToken => "Subtext - Fade Out Gradient - Unique Subtext",
            Self::FadeOutUniqueToken => "Subtext - Fade Out Gradient - Unique Text",
            Self::FadeOutCommon => "Subtext - Fade Out Gradient - Commonly",
            Self::FirstCharUniqueSubToken => "First Character - Solid Color - Unique Subtext",
            Self::FirstCharUniqueToken => "First Character - Solid Color - Unique Text",
            Self::FirstCharCommon => "First Character - Solid Color - Commonly",
            Self::SubTokenSolidUniqueSubToken => "Subtext - Solid Color - Unique Subtext",
            Self::GlyphPrefix => "Whole Text - Emoji",
        }
    }

    /// Picker section heading.
    #[must_use]
    pub const fn group(self) -> &'static str {
        match self {
            Self::FadeInUniqueSubToken | Self::FadeInUniqueToken | Self::FadeInCommon => {
                "Fade In Gradient"
            }
            Self::FadeOutUniqueSubToken | Self::FadeOutUniqueToken | Self::FadeOutCommon => {
                "Fade Out Gradient"
            }
            Self::FirstCharUniqueSubToken | Self::FirstCharUniqueToken | Self::FirstCharCommon => {
                "First Character Solid Color"
            }
            Self::SubTokenSolidUniqueSubToken => "Whole Subtext Solid Color",
            Self::GlyphPrefix => "Emoji",
        }
    }

    /// Kebab-case name for command lines and settings files.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::FadeInUniqueSubToken => "fade-in-unique-subtoken",
            Self::FadeInUniqueToken => "fade-in-unique-token",
            Self::FadeInCommon => "fade-in-common",
            Self::FadeOutUniqueSubToken => "fade-out-unique-subtoken",
            Self::FadeOutUniqueToken => "fade-out-unique-token",
            Self::FadeOutCommon => "fade-out-common",
            Self::FirstCharUniqueSubToken => "first-char-unique-subtoken",
            Self::FirstCharUniqueToken => "first-char-unique-token",
            Self::FirstCharCommon => "first-char-common",
            Self::SubTokenSolidUniqueSubToken => "subtoken-solid-unique-subtoken",
            Self::GlyphPrefix => "glyph-prefix",
        }
    }

    /// Look up a pattern by code, slug or label (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|p| {
            p.code() == name
                || p.slug().eq_ignore_ascii_case(name)
                || p.label().eq_ignore_ascii_case(name)
        })
    }

    /// The strategy behind this pattern, or `None` for the glyph badge.
    #[must_use]
    pub const fn strategy(self) -> Option<Strategy> {
        use BucketPolicy::{PerSpan, PerSubToken, Shared};
        use LevelOrder::{Ascending, Descending};
        use Unit::{FirstCharacter, WholeSubToken};

        let (bucket, unit, order) = match self {
            Self::FadeInUniqueSubToken => (PerSubToken, WholeSubToken, Some(Descending)),
            Self::FadeInUniqueToken => (PerSpan, WholeSubToken, Some(Descending)),
            Self::FadeInCommon => (Shared, WholeSubToken, Some(Descending)),
            Self::FadeOutUniqueSubToken => (PerSubToken, WholeSubToken, Some(Ascending)),
            Self::FadeOutUniqueToken => (PerSpan, WholeSubToken, Some(Ascending)),
            Self::FadeOutCommon => (Shared, WholeSubToken, Some(Ascending)),
            Self::FirstCharUniqueSubToken => (PerSubToken, FirstCharacter, None),
            Self::FirstCharUniqueToken => (PerSpan, FirstCharacter, None),
            Self::FirstCharCommon => (Shared, FirstCharacter, None),
            Self::SubTokenSolidUniqueSubToken => (PerSubToken, WholeSubToken, None),
            Self::GlyphPrefix => return None,
        };
        Some(Strategy {
            bucket,
            unit,
            order,
        })
    }
}

impl fmt::Display for RenderPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RenderPattern {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| EngineError::UnknownPattern(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How a color bucket is chosen for a sub-token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketPolicy {
    /// Hash the sub-token's own text.
    PerSubToken,
    /// Hash the whole span text; every sub-token of a span shares a bucket.
    PerSpan,
    /// One common color for everything.
    Shared,
}

/// Which characters of an eligible sub-token are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    FirstCharacter,
    WholeSubToken,
}

/// One point in the pattern parameter space.
///
/// `order: None` paints solid colors; `Some` paints per-character gradient
/// levels from the fade-out (ascending) or fade-in (descending) tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Strategy {
    pub bucket: BucketPolicy,
    pub unit: Unit,
    pub order: Option<LevelOrder>,
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Everything a render pass reads. Borrowed from the live generation.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub resources: &'a Resources,
    pub hashes: &'a HashCache,
    pub first_sub_token: FirstSubTokenPolicy,
}

impl<'a> RenderContext<'a> {
    #[must_use]
    pub const fn new(config: &EngineConfig, resources: &'a Resources, hashes: &'a HashCache) -> Self {
        Self {
            resources,
            hashes,
            first_sub_token: config.first_sub_token,
        }
    }
}

/// Compute the assignments `pattern` makes for `spans`.
///
/// # Errors
///
/// [`EngineError::MissingHandle`] if a table needed by the pattern is empty.
/// Validated configurations never produce empty tables.
pub fn render(
    pattern: RenderPattern,
    spans: &[ClassifiedSpan],
    ctx: &RenderContext<'_>,
) -> Result<Vec<RenderAssignment>, EngineError> {
    match pattern.strategy() {
        Some(strategy) => render_strategy(strategy, spans, ctx),
        None => render_glyphs(spans, ctx),
    }
}

/// Compute the assignments of an arbitrary [`Strategy`].
///
/// # Errors
///
/// See [`render`].
pub fn render_strategy(
    strategy: Strategy,
    spans: &[ClassifiedSpan],
    ctx: &RenderContext<'_>,
) -> Result<Vec<RenderAssignment>, EngineError> {
    let mut out = Assignments::default();

    for span in spans {
        let (key, tables) = ctx
            .resources
            .tables
            .resolve(&span.semantic_type, span.modifiers.as_slice());
        let buckets = bucket_count(tables, strategy.order);

        for sub in eligible(&span.text, ctx.first_sub_token) {
            let bucket = match strategy.bucket {
                BucketPolicy::PerSubToken => Some(pick(ctx.hashes, sub.text, buckets, &key)?),
                BucketPolicy::PerSpan => Some(pick(ctx.hashes, &span.text, buckets, &key)?),
                BucketPolicy::Shared => None,
            };
            let painted = match strategy.unit {
                Unit::FirstCharacter => 1,
                Unit::WholeSubToken => sub.len,
            };
            let col = span.start + sub.offset;

            for k in 0..painted {
                let paint = strategy.order.map(|o| (o, level_for(k, sub.len, o)));
                let handle = lookup(tables, bucket, paint, &key)?;
                out.push(handle, CharRange::single(span.line, col + k));
            }
        }
    }

    Ok(out.finish())
}

/// The glyph badge: one glyph per span, chosen from the whole span text,
/// anchored on the span's first character.
fn render_glyphs(
    spans: &[ClassifiedSpan],
    ctx: &RenderContext<'_>,
) -> Result<Vec<RenderAssignment>, EngineError> {
    let glyphs = &ctx.resources.glyphs;
    let mut out = Assignments::default();

    for span in spans.iter().filter(|s| !s.text.is_empty()) {
        let bucket = pick(ctx.hashes, &span.text, glyphs.len(), &SemanticKey::Default)?;
        let handle = glyphs.get(bucket).copied().ok_or(EngineError::MissingHandle {
            key: SemanticKey::Default,
            bucket,
            level: None,
        })?;
        out.push(handle, CharRange::single(span.line, span.start));
    }

    Ok(out.finish())
}

fn bucket_count(tables: &ColorTables, order: Option<LevelOrder>) -> usize {
    match order {
        None => tables.solid.len(),
        Some(LevelOrder::Ascending) => tables.fade_out.rows(),
        Some(LevelOrder::Descending) => tables.fade_in.rows(),
    }
}

/// Hash `text` into `0..count`.
fn pick(hashes: &HashCache, text: &str, count: usize, key: &SemanticKey) -> Result<usize, EngineError> {
    if count == 0 {
        return Err(EngineError::MissingHandle {
            key: key.clone(),
            bucket: 0,
            level: None,
        });
    }
    Ok(hashes.bucket(text, count - 1))
}

fn lookup(
    tables: &ColorTables,
    bucket: Option<usize>,
    paint: Option<(LevelOrder, usize)>,
    key: &SemanticKey,
) -> Result<ColorHandle, EngineError> {
    use LevelOrder::{Ascending, Descending};

    let found = match (paint, bucket) {
        (None, Some(b)) => tables.solid.get(b),
        (None, None) => Some(&tables.solid_common),
        (Some((Ascending, l)), Some(b)) => tables.fade_out.get(b, l),
        (Some((Descending, l)), Some(b)) => tables.fade_in.get(b, l),
        (Some((Ascending, l)), None) => tables.fade_out_common.get(l),
        (Some((Descending, l)), None) => tables.fade_in_common.get(l),
    };
    found.copied().ok_or_else(|| EngineError::MissingHandle {
        key: key.clone(),
        bucket: bucket.unwrap_or(0),
        level: paint.map(|(_, l)| l),
    })
}

/// Ranges grouped by handle, in first-use order.
///
/// A range that starts where the previous range of the same handle ended
/// (same line) extends it instead of adding a new one.
#[derive(Debug, Default)]
struct Assignments {
    index: HashMap<ColorHandle, usize>,
    list: Vec<RenderAssignment>,
}

impl Assignments {
    fn push(&mut self, handle: ColorHandle, range: CharRange) {
        let slot = *self.index.entry(handle).or_insert_with(|| {
            self.list.push(RenderAssignment {
                handle,
                ranges: Vec::new(),
            });
            self.list.len() - 1
        });
        let ranges = &mut self.list[slot].ranges;
        match ranges.last_mut() {
            Some(last) if last.line == range.line && last.end == range.start => {
                last.end = range.end;
            }
            _ => ranges.push(range),
        }
    }

    fn finish(self) -> Vec<RenderAssignment> {
        self.list
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
