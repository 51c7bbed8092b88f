//! Colors and palettes
//!
//! Palettes are shared (`Arc`) because every particle rasterized from one rigid
//! block carries the same custom palette for later color matching.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::random::RandomSource;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Unpack 0xRRGGBBAA
    #[inline]
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            r: (packed >> 24) as u8,
            g: (packed >> 16) as u8,
            b: (packed >> 8) as u8,
            a: packed as u8,
        }
    }

    /// Pack as 0xRRGGBBAA
    #[inline]
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 24) | ((self.g as u32) << 16) | ((self.b as u32) << 8) | self.a as u32
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Color equality ignoring alpha
    #[inline]
    pub fn same_rgb(self, other: Rgba) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }

    /// Brightness in [0, 1] (max channel).
    #[inline]
    pub fn brightness(self) -> f32 {
        self.r.max(self.g).max(self.b) as f32 / 255.0
    }

    /// Scale `tint` by this pixel's brightness. Result is fully opaque.
    pub fn tinted_by(self, tint: Rgba) -> Rgba {
        let k = self.brightness();
        let scale = |c: u8| ((c as f32) * k).round().clamp(0.0, 255.0) as u8;
        Rgba::opaque(scale(tint.r), scale(tint.g), scale(tint.b))
    }
}

/// Immutable, shareable list of colors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette(Arc<[Rgba]>);

impl Palette {
    pub fn new(colors: Vec<Rgba>) -> Self {
        Self(colors.into())
    }

    /// Palette of the distinct colors (first occurrence order) in `colors`.
    pub fn from_distinct<I: IntoIterator<Item = Rgba>>(colors: I) -> Self {
        let mut out: Vec<Rgba> = Vec::new();
        for c in colors {
            if !out.iter().any(|o| o.same_rgb(c)) {
                out.push(c);
            }
        }
        Self::new(out)
    }

    #[inline]
    pub fn colors(&self) -> &[Rgba] {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if any color in this palette equals (ignoring alpha) any of `targets`.
    pub fn shares_color_with(&self, targets: &[Rgba]) -> bool {
        self.0
            .iter()
            .any(|c| targets.iter().any(|t| c.same_rgb(*t)))
    }

    /// Pick one color uniformly. Empty palettes render white.
    pub fn pick(&self, rng: &mut dyn RandomSource) -> Rgba {
        if self.0.is_empty() {
            return Rgba::WHITE;
        }
        let idx = rng.range_i32(0, self.0.len() as i32) as usize;
        self.0[idx]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
