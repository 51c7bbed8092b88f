//! Shape templates for rigid blocks
//!
//! Pixels are row-major with row 0 at the top (image order). World y grows
//! upward, so rows are flipped when converted to offsets. The pivot is the
//! template center (`width / 2`, `height / 2`).

use crate::core::{EngineError, EngineResult, Rgba};

#[derive(Clone, Debug, PartialEq)]
pub struct ShapeTemplate {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl ShapeTemplate {
    pub fn new(width: u32, height: u32, pixels: Vec<Rgba>) -> EngineResult<Self> {
        let expected = pixel_count(width, height)?;
        if pixels.len() != expected {
            return Err(EngineError::TemplateSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        if pixels.iter().all(|p| p.is_transparent()) {
            return Err(EngineError::EmptyTemplate);
        }
        Ok(Self { width, height, pixels })
    }

    /// Build from tightly packed RGBA bytes (4 per pixel).
    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> EngineResult<Self> {
        if bytes.len() % 4 != 0 {
            return Err(EngineError::TemplateSize {
                width,
                height,
                expected: pixel_count(width, height)?,
                actual: bytes.len() / 4,
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| Rgba::new(c[0], c[1], c[2], c[3]))
            .collect();
        Self::new(width, height, pixels)
    }

    /// Solid template from an ASCII mask: `#` is opaque white, anything else transparent.
    pub fn from_mask(rows: &[&str]) -> EngineResult<Self> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut pixels = Vec::with_capacity(pixel_count(width, height)?);
        for row in rows {
            let bytes = row.as_bytes();
            for x in 0..width as usize {
                let opaque = bytes.get(x) == Some(&b'#');
                pixels.push(if opaque { Rgba::WHITE } else { Rgba::default() });
            }
        }
        Self::new(width, height, pixels)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Offsets from the pivot and colors of every opaque pixel.
    pub fn opaque_pixels(&self) -> Vec<((i32, i32), Rgba)> {
        let pivot_x = (self.width / 2) as i32;
        let pivot_y = (self.height / 2) as i32;
        let mut out = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                let px = self.pixels[row as usize * self.width as usize + col as usize];
                if px.is_transparent() {
                    continue;
                }
                let dx = col as i32 - pivot_x;
                let dy = (self.height - 1 - row) as i32 - pivot_y;
                out.push(((dx, dy), px));
            }
        }
        out
    }
}

fn pixel_count(width: u32, height: u32) -> EngineResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(EngineError::TemplateTooLarge { width, height })
}

/// Rotate an offset by `quarter_turns` clockwise turns around the pivot.
#[inline]
pub fn rotate_offset(offset: (i32, i32), quarter_turns: u8) -> (i32, i32) {
    let (mut x, mut y) = offset;
    for _ in 0..(quarter_turns % 4) {
        (x, y) = (y, -x);
    }
    (x, y)
}
