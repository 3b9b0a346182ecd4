//! Linear radiance framebuffer and the display resolve pass.

use rayon::prelude::*;

use crate::tile::TileOutput;
use crate::Color;

/// Display gamma applied by [`encode_channel`].
pub const GAMMA: f32 = 2.2;

/// Encode one linear channel to an 8-bit display value.
#[inline]
pub fn encode_channel(linear: f32) -> u8 {
    // NaN clamps to 0 via max
    let clamped = linear.max(0.0).min(1.0);
    (clamped.powf(1.0 / GAMMA) * 255.0).round() as u8
}

/// Convert a color to 8-bit RGBA with opaque alpha.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    [
        encode_channel(color.x),
        encode_channel(color.y),
        encode_channel(color.z),
        255,
    ]
}

/// Row-major image of linear RGB, row 0 at the top.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Framebuffer {
    /// Create a framebuffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.offset(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let i = self.offset(x, y);
        self.pixels[i] = color;
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Copy a rendered tile into place.
    pub fn write_tile(&mut self, tile: &TileOutput) {
        let rect = tile.rect;
        let row_len = rect.width as usize;

        for (row, src) in tile.pixels.chunks_exact(row_len).enumerate() {
            let start = self.offset(rect.x, rect.y + row as u32);
            self.pixels[start..start + row_len].copy_from_slice(src);
        }
    }

    /// Resolve to packed RGBA8 bytes, top row first.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.pixels.len() * 4];
        let row_bytes = self.width as usize * 4;
        if row_bytes == 0 {
            return bytes;
        }

        bytes
            .par_chunks_mut(row_bytes)
            .zip(self.pixels.par_chunks(self.width as usize))
            .for_each(|(dst, src)| {
                for (out, color) in dst.chunks_exact_mut(4).zip(src) {
                    out.copy_from_slice(&color_to_rgba(*color));
                }
            });

        bytes
    }
}
