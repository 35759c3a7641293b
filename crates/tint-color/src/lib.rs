// SPDX-License-Identifier: MIT
//
// tint-color: sRGB color values for hashtint.
//
// The decoration engine never does perceptual color math: every color it
// hands out is a plain 8-bit sRGB triple produced by linearly mixing two
// configured colors. This crate owns that value type, the hex literal
// grammar users write in their settings, and the mixing rule itself.

pub mod color;

pub use color::{ParseColorError, Rgb};
