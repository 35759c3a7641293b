//! Color resource builder.
//!
//! Turns a validated [`EngineConfig`] into every handle a render pass can
//! ask for, allocated up front in one [`HandleArena`]:
//!
//! ```text
//! per semantic key (configured keys + default):
//!     solid          [bucket]            solid color over foreground @ solidAlpha
//!     solid_common                       common color over foreground @ solidAlpha
//!     fade_in        [bucket][level]     gradient color over foreground @ fadeIn[level]
//!     fade_out       [bucket][level]     gradient color over foreground @ fadeOut[level]
//!     fade_in_common [level]             common color over foreground @ fadeIn[level]
//!     fade_out_common[level]             common color over foreground @ fadeOut[level]
//! once:
//!     glyphs         [bucket]
//! ```
//!
//! Rendering never allocates: every lookup hits a table built here.

use tint_color::Rgb;
use unicode_width::UnicodeWidthStr;

use crate::config::EngineConfig;
use crate::gradient::GRADIENT_LEVELS;
use crate::grid::Grid;
use crate::handle::{ColorHandle, HandleArena, HandleStyle};
use crate::semantic::SemanticTable;

/// Every handle for one semantic key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTables {
    pub solid: Vec<ColorHandle>,
    pub solid_common: ColorHandle,
    /// `[bucket][level]`.
    pub fade_in: Grid<ColorHandle>,
    /// `[bucket][level]`.
    pub fade_out: Grid<ColorHandle>,
    pub fade_in_common: Vec<ColorHandle>,
    pub fade_out_common: Vec<ColorHandle>,
}

/// All handles of one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resources {
    pub tables: SemanticTable<ColorTables>,
    pub glyphs: Vec<ColorHandle>,
}

impl Resources {
    /// Allocate every handle `config` calls for.
    pub fn build(config: &EngineConfig, arena: &mut HandleArena) -> Self {
        let tables = config
            .foregrounds
            .map(|_, &foreground| build_tables(config, foreground, arena));

        let glyphs = config
            .glyphs
            .iter()
            .map(|glyph| {
                arena.alloc(HandleStyle::Glyph {
                    glyph: glyph.clone(),
                    width: glyph.width(),
                    color: config.glyph_color,
                })
            })
            .collect();

        log::debug!(
            "built color tables for {} semantic key(s), {} handle(s)",
            tables.len(),
            arena.len()
        );
        Self { tables, glyphs }
    }
}

fn build_tables(config: &EngineConfig, foreground: Rgb, arena: &mut HandleArena) -> ColorTables {
    let mut color = |c: Rgb| arena.alloc(HandleStyle::Color(c));

    let solid = config
        .solid_colors
        .iter()
        .map(|&base| color(base.blend(foreground, config.solid_alpha)))
        .collect();
    let solid_common = color(config.common_color.blend(foreground, config.solid_alpha));

    let rows = config.gradient_colors.len();
    let fade_in = Grid::from_fn(rows, GRADIENT_LEVELS, |row, level| {
        color(config.gradient_colors[row].blend(foreground, config.fade_in_steps[level]))
    });
    let fade_out = Grid::from_fn(rows, GRADIENT_LEVELS, |row, level| {
        color(config.gradient_colors[row].blend(foreground, config.fade_out_steps[level]))
    });

    let fade_in_common = config
        .fade_in_steps
        .iter()
        .map(|&alpha| color(config.common_color.blend(foreground, alpha)))
        .collect();
    let fade_out_common = config
        .fade_out_steps
        .iter()
        .map(|&alpha| color(config.common_color.blend(foreground, alpha)))
        .collect();

    ColorTables {
        solid,
        solid_common,
        fade_in,
        fade_out,
        fade_in_common,
        fade_out_common,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RawConfig, validate};
    use crate::semantic::SemanticKey;

    fn config(json: &str) -> EngineConfig {
        let raw: RawConfig = serde_json::from_str(json).unwrap();
        validate(&raw).config
    }

    /// Solid row, common solid, both gradient grids and their common rows.
    fn handles_per_key(cfg: &EngineConfig) -> usize {
        cfg.solid_colors.len() + 1 + (cfg.gradient_colors.len() + 1) * GRADIENT_LEVELS * 2
    }

    fn style_color(arena: &HandleArena, h: ColorHandle) -> Rgb {
        arena.get(h).and_then(HandleStyle::color).unwrap()
    }

    #[test]
    fn table_shapes() {
        let cfg = config(r##"{ "solidColors": ["#f00", "#0f0", "#00f"], "gradientColors": ["#fff", "#000"] }"##);
        let mut arena = HandleArena::new(1);
        let res = Resources::build(&cfg, &mut arena);
        let t = res.tables.default_value();
        assert_eq!(t.solid.len(), 3);
        assert_eq!((t.fade_in.rows(), t.fade_in.cols()), (2, GRADIENT_LEVELS));
        assert_eq!((t.fade_out.rows(), t.fade_out.cols()), (2, GRADIENT_LEVELS));
        assert_eq!(t.fade_in_common.len(), GRADIENT_LEVELS);
        assert_eq!(t.fade_out_common.len(), GRADIENT_LEVELS);
        assert_eq!(res.glyphs.len(), cfg.glyphs.len());
        assert_eq!(
            arena.len(),
            handles_per_key(&cfg) + cfg.glyphs.len()
        );
    }

    #[test]
    fn one_table_per_configured_key() {
        let cfg = config(
            r##"{
                "solidColors": ["#f00"],
                "semanticForegroundColors": { "variable": "#000", "parameter:*readonly": "#fff" }
            }"##,
        );
        let mut arena = HandleArena::new(1);
        let res = Resources::build(&cfg, &mut arena);
        assert_eq!(res.tables.len(), 3);
        assert!(res.tables.get(&SemanticKey::bare("variable")).is_some());
        assert_eq!(
            arena.len(),
            handles_per_key(&cfg) * 3 + cfg.glyphs.len()
        );
    }

    #[test]
    fn same_config_builds_equal_resources() {
        fn total_eq<T: Eq>(a: &T, b: &T) -> bool {
            a == b
        }
        let cfg = config(
            r##"{
                "solidColors": ["#f00", "#0f0"],
                "semanticForegroundColors": { "variable:*readonly,static": "#fff" }
            }"##,
        );
        let first = Resources::build(&cfg, &mut HandleArena::new(4));
        let second = Resources::build(&cfg, &mut HandleArena::new(4));
        assert!(total_eq(&first, &second));
        assert!(total_eq(&first.tables, &second.tables));
        assert_eq!(first.tables.len(), 3);
    }

    #[test]
    fn solid_alpha_one_keeps_base_color() {
        let cfg = config(r##"{ "solidColors": ["#123456"] }"##);
        let mut arena = HandleArena::new(1);
        let res = Resources::build(&cfg, &mut arena);
        let t = res.tables.default_value();
        assert_eq!(style_color(&arena, t.solid[0]), Rgb::new(0x12, 0x34, 0x56));
    }

    #[test]
    fn gradient_blends_toward_foreground() {
        let cfg = config(
            r##"{
                "solidColors": ["#000000"],
                "defaultSemanticForegroundColor": "#ffffff",
                "fadeOutGradientSteps": [1.0, 0.0]
            }"##,
        );
        let mut arena = HandleArena::new(1);
        let res = Resources::build(&cfg, &mut arena);
        let t = res.tables.default_value();
        let first = *t.fade_out.get(0, 0).unwrap();
        let last = *t.fade_out.get(0, GRADIENT_LEVELS - 1).unwrap();
        assert_eq!(style_color(&arena, first), Rgb::BLACK);
        assert_eq!(style_color(&arena, last), Rgb::WHITE);
        assert_eq!(style_color(&arena, t.fade_out_common[0]), Rgb::BLACK);
    }

    #[test]
    fn glyph_handles_carry_width() {
        let cfg = config(r##"{ "solidColors": ["#f00"], "glyphs": ["★", "🦊"], "glyphColor": "#fff" }"##);
        let mut arena = HandleArena::new(1);
        let res = Resources::build(&cfg, &mut arena);
        assert_eq!(
            arena.get(res.glyphs[1]),
            Some(&HandleStyle::Glyph {
                glyph: "🦊".into(),
                width: 2,
                color: Some(Rgb::WHITE),
            })
        );
    }
}
