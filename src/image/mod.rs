//! Pixel buffers consumed by every extraction stage.
//!
//! `PixelBuffer` owns a row-major array of RGBA floating-point colors. Values
//! are conventionally in `[0, 1]` but never clamped here; filters may produce
//! negative or overshooting values transiently.

use crate::util::math::unit_to_byte;
use crate::util::{ImgDescError, ImgDescResult};
use std::ops::Range;

#[cfg(feature = "image-io")]
pub mod io;

/// RGBA color with floating-point channels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color4f {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color4f {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a color from four channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from three channels.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Returns color channel `c` (0 = R, 1 = G, 2 = B, 3 = A).
    #[inline]
    pub fn channel(&self, c: usize) -> f32 {
        match c {
            0 => self.r,
            1 => self.g,
            2 => self.b,
            _ => self.a,
        }
    }

    /// Returns the RGB channels as an array.
    #[inline]
    pub fn rgb_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Quantizes the color to byte precision with rounding.
    pub fn to_bytes(&self) -> [u8; 4] {
        [
            unit_to_byte(self.r),
            unit_to_byte(self.g),
            unit_to_byte(self.b),
            unit_to_byte(self.a),
        ]
    }

    /// Packs the byte-precision color as `0xRRGGBBAA`.
    pub fn pack(&self) -> u32 {
        u32::from_be_bytes(self.to_bytes())
    }
}

/// Immutable row-major RGBA image.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color4f>,
}

impl PixelBuffer {
    /// Wraps `pixels` after checking that it holds `width * height` colors.
    ///
    /// Zero-sized buffers are accepted; accumulators reject them later with
    /// [`ImgDescError::EmptyInput`].
    pub fn new(width: usize, height: usize, pixels: Vec<Color4f>) -> ImgDescResult<Self> {
        let needed = width
            .checked_mul(height)
            .ok_or(ImgDescError::invalid("width * height overflows"))?;
        if pixels.len() != needed {
            return Err(ImgDescError::BufferSizeMismatch {
                needed,
                got: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds a buffer filled with a single color.
    pub fn filled(width: usize, height: usize, color: Color4f) -> ImgDescResult<Self> {
        let needed = width
            .checked_mul(height)
            .ok_or(ImgDescError::invalid("width * height overflows"))?;
        Self::new(width, height, vec![color; needed])
    }

    /// Builds a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> ImgDescResult<Self>
    where
        F: FnMut(usize, usize) -> Color4f,
    {
        let mut pixels = Vec::with_capacity(width.saturating_mul(height));
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self::new(width, height, pixels)
    }

    /// Builds a buffer from interleaved RGBA bytes.
    pub fn from_rgba8(width: usize, height: usize, bytes: &[u8]) -> ImgDescResult<Self> {
        let needed = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(ImgDescError::invalid("width * height overflows"))?;
        if bytes.len() != needed {
            return Err(ImgDescError::BufferSizeMismatch {
                needed,
                got: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|px| {
                Color4f::new(
                    px[0] as f32 / 255.0,
                    px[1] as f32 / 255.0,
                    px[2] as f32 / 255.0,
                    px[3] as f32 / 255.0,
                )
            })
            .collect();
        Self::new(width, height, pixels)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Returns true when the buffer holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Returns all pixels in row-major order.
    pub fn pixels(&self) -> &[Color4f] {
        &self.pixels
    }

    /// Consumes the buffer and returns its pixels.
    pub fn into_pixels(self) -> Vec<Color4f> {
        self.pixels
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&Color4f> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x)
    }

    /// Returns row `y`.
    pub fn row(&self, y: usize) -> Option<&[Color4f]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.pixels.get(start..start + self.width)
    }

    /// Returns the contiguous pixels of a band of rows.
    pub fn rows(&self, rows: Range<usize>) -> &[Color4f] {
        let end = rows.end.min(self.height);
        let start = rows.start.min(end);
        &self.pixels[start * self.width..end * self.width]
    }

    pub(crate) fn ensure_non_empty(&self, reason: &'static str) -> ImgDescResult<()> {
        if self.is_empty() {
            return Err(ImgDescError::EmptyInput { reason });
        }
        Ok(())
    }

    pub(crate) fn ensure_same_size(&self, other: &PixelBuffer) -> ImgDescResult<()> {
        if self.width != other.width || self.height != other.height {
            return Err(ImgDescError::DimensionMismatch {
                left_width: self.width,
                left_height: self.height,
                right_width: other.width,
                right_height: other.height,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Color4f;

    #[test]
    fn pack_orders_channels_rgba() {
        let color = Color4f::new(1.0, 0.0, 0.5, 1.0);
        assert_eq!(color.to_bytes(), [255, 0, 128, 255]);
        assert_eq!(color.pack(), 0xFF00_80FF);
    }

    #[test]
    fn to_bytes_clamps_out_of_range_channels() {
        let color = Color4f::new(-0.2, 1.7, f32::NAN, 0.0);
        assert_eq!(color.to_bytes(), [0, 255, 0, 0]);
    }
}
