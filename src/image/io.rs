//! Conversions from the `image` crate into pixel buffers.
//!
//! Available when the `image-io` feature is enabled. Decoding is left to the
//! `image` crate; this module only reshapes decoded pixels.

use crate::image::{Color4f, PixelBuffer};
use crate::util::{ImgDescError, ImgDescResult};
use std::path::Path;

/// Converts a floating-point RGBA image into a pixel buffer.
pub fn buffer_from_rgba32f(img: &image::Rgba32FImage) -> ImgDescResult<PixelBuffer> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let pixels = img
        .as_raw()
        .chunks_exact(4)
        .map(|px| Color4f::new(px[0], px[1], px[2], px[3]))
        .collect();
    PixelBuffer::new(width, height, pixels)
}

/// Converts any decoded image into a pixel buffer.
pub fn buffer_from_dynamic_image(img: &image::DynamicImage) -> ImgDescResult<PixelBuffer> {
    buffer_from_rgba32f(&img.to_rgba32f())
}

/// Opens an image file and converts it into a pixel buffer.
pub fn load_pixel_buffer<P: AsRef<Path>>(path: P) -> ImgDescResult<PixelBuffer> {
    let img = image::open(path).map_err(|err| ImgDescError::ImageIo {
        reason: err.to_string(),
    })?;
    buffer_from_dynamic_image(&img)
}
