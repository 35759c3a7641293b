//! Engine configuration: raw settings in, validated settings out.
//!
//! Settings arrive as a [`RawConfig`], deserialized with serde from whatever
//! the host stores (camelCase keys, every field optional). [`validate`] turns
//! it into an [`EngineConfig`]: each field is checked on its own, and a bad
//! value is replaced by its fallback and recorded as a [`ConfigIssue`]. The
//! engine always starts, and the user always hears what was wrong.
//!
//! | Field | Fallback |
//! |-------|----------|
//! | `solidColors` | built-in palette (reported when empty) |
//! | `gradientColors` | `solidColors` |
//! | `commonColor` | first solid color |
//! | `defaultSemanticForegroundColor` | `#9CDCFE` |
//! | `fadeInGradientSteps` / `fadeOutGradientSteps` | built-in ramp |
//! | `glyphs` | built-in emoji set |
//! | `permutationTable` | built-in table |

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tint_color::Rgb;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::ConfigIssue;
use crate::glyph::DEFAULT_GLYPHS;
use crate::gradient::resample_steps;
use crate::hash::PermutationTable;
use crate::pattern::RenderPattern;
use crate::segment::FirstSubTokenPolicy;
use crate::semantic::{SemanticKey, SemanticTable};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Delay between the last trigger and the render pass.
pub const DEFAULT_RENDER_DELAY: Duration = Duration::from_millis(500);

/// Palette used when `solidColors` is missing or entirely invalid.
pub const DEFAULT_SOLID_COLORS: [Rgb; 8] = [
    Rgb::new(0xE0, 0x6C, 0x75),
    Rgb::new(0xE5, 0xC0, 0x7B),
    Rgb::new(0x98, 0xC3, 0x79),
    Rgb::new(0x56, 0xB6, 0xC2),
    Rgb::new(0x61, 0xAF, 0xEF),
    Rgb::new(0xC6, 0x78, 0xDD),
    Rgb::new(0xD1, 0x9A, 0x66),
    Rgb::new(0xBE, 0x50, 0x46),
];

/// Foreground the gradients fade toward when no semantic rule matches.
pub const DEFAULT_FOREGROUND: Rgb = Rgb::new(0x9C, 0xDC, 0xFE);

/// Blend ratios from fully saturated down to a quarter, one per level.
pub const DEFAULT_STEPS: [f64; 16] = [
    1.0, 0.95, 0.9, 0.85, 0.8, 0.75, 0.7, 0.65, 0.6, 0.55, 0.5, 0.45, 0.4, 0.35, 0.3, 0.25,
];

/// Semantic token types decorated when the setting is absent.
pub const DEFAULT_TARGETED_TYPES: [&str; 3] = ["variable", "parameter", "property"];

// ---------------------------------------------------------------------------
// RawConfig
// ---------------------------------------------------------------------------

/// User settings exactly as stored. Nothing here has been checked.
///
/// Fields stay untyped JSON so a value of the wrong shape costs only that
/// field: [`validate`] reports it and falls back, the rest still applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawConfig {
    /// Debounce delay in milliseconds.
    pub render_delay: Option<Value>,
    pub ignore_first_sub_token: Option<Value>,
    /// `keep`, `first` or `firstWord`; wins over `ignoreFirstSubToken`.
    pub first_sub_token_policy: Option<Value>,
    pub exclude_file_extensions: Option<Value>,
    /// Absent means the built-in list; an empty list decorates every type.
    pub targeted_semantic_token_types: Option<Value>,
    pub default_pattern: Option<Value>,
    pub solid_colors: Option<Value>,
    pub gradient_colors: Option<Value>,
    pub common_color: Option<Value>,
    pub solid_alpha: Option<Value>,
    pub fade_in_gradient_steps: Option<Value>,
    pub fade_out_gradient_steps: Option<Value>,
    /// Semantic code (`type`, `type:mod1,mod2`, `type:*mod`) to hex color.
    pub semantic_foreground_colors: Option<Value>,
    pub default_semantic_foreground_color: Option<Value>,
    pub glyphs: Option<Value>,
    pub glyph_color: Option<Value>,
    pub permutation_table: Option<Value>,
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Settings after validation. Every field holds a usable value.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub render_delay: Duration,
    pub first_sub_token: FirstSubTokenPolicy,
    /// Lowercase, without the leading dot.
    pub excluded_extensions: Vec<String>,
    /// Empty means every type is decorated.
    pub targeted_types: Vec<String>,
    pub default_pattern: RenderPattern,
    /// Never empty.
    pub solid_colors: Vec<Rgb>,
    /// Never empty.
    pub gradient_colors: Vec<Rgb>,
    pub common_color: Rgb,
    pub solid_alpha: f64,
    /// Exactly one ratio per gradient level.
    pub fade_in_steps: Vec<f64>,
    /// Exactly one ratio per gradient level.
    pub fade_out_steps: Vec<f64>,
    pub foregrounds: SemanticTable<Rgb>,
    /// Never empty; each entry is a single grapheme.
    pub glyphs: Vec<String>,
    pub glyph_color: Option<Rgb>,
    pub permutation: PermutationTable,
}

impl EngineConfig {
    /// Whether a file with this extension is decorated.
    #[must_use]
    pub fn accepts_extension(&self, extension: &str) -> bool {
        let ext = normalize_extension(extension);
        !self.excluded_extensions.iter().any(|e| *e == ext)
    }

    /// Whether spans of this semantic type are decorated.
    #[must_use]
    pub fn targets_type(&self, semantic_type: &str) -> bool {
        self.targeted_types.is_empty() || self.targeted_types.iter().any(|t| t == semantic_type)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        validate(&RawConfig::default()).config
    }
}

/// Result of [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub config: EngineConfig,
    /// Every recovered problem, in field order.
    pub issues: Vec<ConfigIssue>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check every field of `raw`, substituting fallbacks for bad values.
#[must_use]
pub fn validate(raw: &RawConfig) -> Validated {
    let mut issues = Vec::new();

    let render_delay = typed::<u64>(
        "renderDelay",
        raw.render_delay.as_ref(),
        "a non-negative integer of milliseconds",
        &mut issues,
    )
    .map_or(DEFAULT_RENDER_DELAY, Duration::from_millis);

    let first_sub_token = first_sub_token_policy(raw, &mut issues);

    let excluded_extensions = strings(
        "excludeFileExtensions",
        raw.exclude_file_extensions.as_ref(),
        &mut issues,
    )
    .unwrap_or_default()
    .iter()
    .map(|e| normalize_extension(e))
    .filter(|e| !e.is_empty())
    .collect();

    let targeted_types = strings(
        "targetedSemanticTokenTypes",
        raw.targeted_semantic_token_types.as_ref(),
        &mut issues,
    )
    .unwrap_or_else(|| DEFAULT_TARGETED_TYPES.iter().map(|t| (*t).to_owned()).collect());

    let default_pattern = match typed::<String>(
        "defaultPattern",
        raw.default_pattern.as_ref(),
        "a pattern name",
        &mut issues,
    ) {
        None => RenderPattern::default(),
        Some(name) => RenderPattern::from_name(&name).unwrap_or_else(|| {
            issues.push(ConfigIssue::UnknownPattern(name));
            RenderPattern::default()
        }),
    };

    let mut solid_colors = color_list("solidColors", raw.solid_colors.as_ref(), &mut issues);
    if solid_colors.is_empty() {
        issues.push(ConfigIssue::Missing {
            field: "solidColors",
        });
        solid_colors = DEFAULT_SOLID_COLORS.to_vec();
    }

    let mut gradient_colors =
        color_list("gradientColors", raw.gradient_colors.as_ref(), &mut issues);
    if gradient_colors.is_empty() {
        gradient_colors.clone_from(&solid_colors);
    }

    let first_solid = solid_colors[0];
    let common_color = color_or(
        "commonColor",
        raw.common_color.as_ref(),
        first_solid,
        "using the first solid color",
        &mut issues,
    );

    let solid_alpha = solid_alpha(raw.solid_alpha.as_ref(), &mut issues);

    let fade_in_steps = step_list(
        "fadeInGradientSteps",
        raw.fade_in_gradient_steps.as_ref(),
        &mut issues,
    );
    let fade_out_steps = step_list(
        "fadeOutGradientSteps",
        raw.fade_out_gradient_steps.as_ref(),
        &mut issues,
    );

    let foregrounds = foregrounds(raw, &mut issues);

    let glyphs = glyph_list(raw.glyphs.as_ref(), &mut issues);
    let glyph_color = typed::<String>(
        "glyphColor",
        raw.glyph_color.as_ref(),
        "a color string",
        &mut issues,
    )
    .and_then(|value| match value.parse::<Rgb>() {
        Ok(c) => Some(c),
        Err(reason) => {
            issues.push(ConfigIssue::InvalidColor {
                field: "glyphColor".to_owned(),
                value,
                reason,
                fallback: "glyphs keep their own colors",
            });
            None
        }
    });

    let permutation = match typed::<Vec<i64>>(
        "permutationTable",
        raw.permutation_table.as_ref(),
        "an array of integers",
        &mut issues,
    ) {
        None => PermutationTable::default(),
        Some(values) => PermutationTable::from_values(&values).unwrap_or_else(|e| {
            issues.push(ConfigIssue::PermutationTable(e));
            PermutationTable::default()
        }),
    };

    if !issues.is_empty() {
        log::debug!("configuration validated with {} issue(s)", issues.len());
    }

    Validated {
        config: EngineConfig {
            render_delay,
            first_sub_token,
            excluded_extensions,
            targeted_types,
            default_pattern,
            solid_colors,
            gradient_colors,
            common_color,
            solid_alpha,
            fade_in_steps,
            fade_out_steps,
            foregrounds,
            glyphs,
            glyph_color,
            permutation,
        },
        issues,
    }
}

// ── Typed access to raw values ──────────────────────────────────────

/// Read `value` as a `T`. A mismatch is reported and reads as absent.
fn typed<T: DeserializeOwned>(
    field: &str,
    value: Option<&Value>,
    expected: &'static str,
    issues: &mut Vec<ConfigIssue>,
) -> Option<T> {
    let value = value?;
    match T::deserialize(value) {
        Ok(v) => Some(v),
        Err(_) => {
            issues.push(ConfigIssue::WrongType {
                field: field.to_owned(),
                expected,
                found: describe(value),
            });
            None
        }
    }
}

/// The elements of an array field with their indices. `None` when the
/// field is absent or not an array (the latter is reported).
fn entries<'v>(
    field: &str,
    value: Option<&'v Value>,
    issues: &mut Vec<ConfigIssue>,
) -> Option<Vec<(usize, &'v Value)>> {
    match value? {
        Value::Array(items) => Some(items.iter().enumerate().collect()),
        other => {
            issues.push(ConfigIssue::WrongType {
                field: field.to_owned(),
                expected: "an array",
                found: describe(other),
            });
            None
        }
    }
}

/// An array of strings, skipping (and reporting) entries of another type.
fn strings(field: &str, value: Option<&Value>, issues: &mut Vec<ConfigIssue>) -> Option<Vec<String>> {
    let items = entries(field, value, issues)?;
    Some(
        items
            .into_iter()
            .filter_map(|(i, item)| typed(&format!("{field}[{i}]"), Some(item), "a string", issues))
            .collect(),
    )
}

/// Short rendering of a raw value for diagnostics.
fn describe(value: &Value) -> String {
    match value {
        Value::Array(_) => "an array".to_owned(),
        Value::Object(_) => "an object".to_owned(),
        scalar => scalar.to_string(),
    }
}

// ── Per-field validation ────────────────────────────────────────────

fn first_sub_token_policy(raw: &RawConfig, issues: &mut Vec<ConfigIssue>) -> FirstSubTokenPolicy {
    let ignore = typed::<bool>(
        "ignoreFirstSubToken",
        raw.ignore_first_sub_token.as_ref(),
        "true or false",
        issues,
    );
    let from_flag = FirstSubTokenPolicy::from_ignore_flag(ignore.unwrap_or(true));
    match typed::<String>(
        "firstSubTokenPolicy",
        raw.first_sub_token_policy.as_ref(),
        "a policy name",
        issues,
    ) {
        None => from_flag,
        Some(name) => FirstSubTokenPolicy::from_name(&name).unwrap_or_else(|| {
            issues.push(ConfigIssue::UnknownPolicy(name));
            from_flag
        }),
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Parse every entry, dropping (and reporting) the invalid ones.
fn color_list(field: &'static str, value: Option<&Value>, issues: &mut Vec<ConfigIssue>) -> Vec<Rgb> {
    let Some(items) = entries(field, value, issues) else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|(i, item)| {
            let field = format!("{field}[{i}]");
            let text: String = typed(&field, Some(item), "a color string", issues)?;
            match text.parse::<Rgb>() {
                Ok(c) => Some(c),
                Err(reason) => {
                    issues.push(ConfigIssue::InvalidColor {
                        field,
                        value: text,
                        reason,
                        fallback: "entry skipped",
                    });
                    None
                }
            }
        })
        .collect()
}

fn color_or(
    field: &str,
    value: Option<&Value>,
    fallback_color: Rgb,
    fallback: &'static str,
    issues: &mut Vec<ConfigIssue>,
) -> Rgb {
    let Some(text) = typed::<String>(field, value, "a color string", issues) else {
        return fallback_color;
    };
    text.parse::<Rgb>().unwrap_or_else(|reason| {
        issues.push(ConfigIssue::InvalidColor {
            field: field.to_owned(),
            value: text,
            reason,
            fallback,
        });
        fallback_color
    })
}

fn solid_alpha(value: Option<&Value>, issues: &mut Vec<ConfigIssue>) -> f64 {
    let Some(alpha) = typed::<f64>("solidAlpha", value, "a number in [0, 1]", issues) else {
        return 1.0;
    };
    if !(0.0..=1.0).contains(&alpha) {
        issues.push(ConfigIssue::StepOutOfRange {
            field: "solidAlpha",
            index: 0,
            value: alpha,
        });
    }
    alpha.clamp(0.0, 1.0)
}

/// Clean a step list and resample it onto the gradient levels.
fn step_list(field: &'static str, value: Option<&Value>, issues: &mut Vec<ConfigIssue>) -> Vec<f64> {
    let items = entries(field, value, issues).unwrap_or_default();
    let cleaned: Vec<f64> = items
        .iter()
        .filter_map(|&(index, item)| {
            let value: f64 = typed(&format!("{field}[{index}]"), Some(item), "a number", issues)?;
            if !(0.0..=1.0).contains(&value) {
                issues.push(ConfigIssue::StepOutOfRange {
                    field,
                    index,
                    value,
                });
            }
            Some(value.clamp(0.0, 1.0))
        })
        .collect();

    if cleaned.is_empty() {
        if !items.is_empty() {
            issues.push(ConfigIssue::Missing { field });
        }
        return DEFAULT_STEPS.to_vec();
    }
    resample_steps(&cleaned)
}

fn foregrounds(raw: &RawConfig, issues: &mut Vec<ConfigIssue>) -> SemanticTable<Rgb> {
    let default = color_or(
        "defaultSemanticForegroundColor",
        raw.default_semantic_foreground_color.as_ref(),
        DEFAULT_FOREGROUND,
        "using #9cdcfe",
        issues,
    );
    let mut table = SemanticTable::new(default);

    let rules = match raw.semantic_foreground_colors.as_ref() {
        None => return table,
        Some(Value::Object(rules)) => rules,
        Some(other) => {
            issues.push(ConfigIssue::WrongType {
                field: "semanticForegroundColors".to_owned(),
                expected: "an object",
                found: describe(other),
            });
            return table;
        }
    };

    for (code, value) in rules {
        let keys = match SemanticKey::parse(code) {
            Ok(keys) => keys,
            Err(e) => {
                issues.push(ConfigIssue::SemanticCode(e));
                continue;
            }
        };
        let field = format!("semanticForegroundColors.{code}");
        let Some(text) = typed::<String>(&field, Some(value), "a color string", issues) else {
            continue;
        };
        match text.parse::<Rgb>() {
            Ok(color) => {
                for key in keys {
                    table.insert(key, color);
                }
            }
            Err(reason) => issues.push(ConfigIssue::InvalidColor {
                field,
                value: text,
                reason,
                fallback: "rule ignored",
            }),
        }
    }
    table
}

fn glyph_list(value: Option<&Value>, issues: &mut Vec<ConfigIssue>) -> Vec<String> {
    let glyphs: Vec<String> = entries("glyphs", value, issues)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(index, item)| {
            let glyph: String =
                typed(&format!("glyphs[{index}]"), Some(item), "a string", issues)?;
            if glyph.graphemes(true).count() == 1 {
                Some(glyph)
            } else {
                issues.push(ConfigIssue::InvalidGlyph { index, value: glyph });
                None
            }
        })
        .collect();

    if glyphs.is_empty() {
        return DEFAULT_GLYPHS.iter().map(|g| (*g).to_owned()).collect();
    }
    glyphs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
