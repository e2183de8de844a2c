//! Alpha-weighted 2D convolution and pixel-wise subtraction.

use crate::filter::kernel::Kernel;
use crate::image::{Color4f, PixelBuffer};
use crate::parallel::ParallelReducer;
use crate::trace::{trace_event, trace_span};
use crate::util::ImgDescResult;
use std::ops::Range;

/// Convolves `buffer` with `kernel`.
///
/// Each output pixel accumulates `factor * k * alpha * color` over the taps
/// of the spatially mirrored kernel. Taps outside the image are skipped. The
/// output alpha is copied from the source pixel. Bands of rows are processed
/// by `reducer`; the result does not depend on the banding.
pub fn convolve(
    buffer: &PixelBuffer,
    kernel: &Kernel,
    reducer: &ParallelReducer,
) -> ImgDescResult<PixelBuffer> {
    let _span = trace_span!(
        "convolve",
        width = buffer.width(),
        height = buffer.height(),
        kernel_x = kernel.size_x(),
        kernel_y = kernel.size_y()
    )
    .entered();

    let width = buffer.width();
    let height = buffer.height();
    let pixels = reducer.reduce_rows(
        height,
        Vec::with_capacity(buffer.len()),
        |rows| Ok(convolve_rows(buffer, kernel, rows)),
        |acc, band| {
            acc.extend(band);
            Ok(())
        },
    )?;
    trace_event!("convolve_done", pixels = pixels.len());
    PixelBuffer::new(width, height, pixels)
}

fn convolve_rows(buffer: &PixelBuffer, kernel: &Kernel, rows: Range<usize>) -> Vec<Color4f> {
    let width = buffer.width() as isize;
    let height = buffer.height() as isize;
    let half_x = (kernel.size_x() / 2) as isize;
    let half_y = (kernel.size_y() / 2) as isize;
    let factor = kernel.factor();
    let src = buffer.pixels();

    let mut out = Vec::with_capacity(rows.len() * buffer.width());
    for y in rows {
        let y = y as isize;
        for x in 0..width {
            let mut acc = [0.0f64; 3];
            for ky in 0..kernel.size_y() {
                let sy = y + half_y - ky as isize;
                if sy < 0 || sy >= height {
                    continue;
                }
                let row_base = (sy * width) as usize;
                for kx in 0..kernel.size_x() {
                    let sx = x + half_x - kx as isize;
                    if sx < 0 || sx >= width {
                        continue;
                    }
                    let k = kernel.value(kx, ky);
                    if k == 0.0 {
                        continue;
                    }
                    let px = src[row_base + sx as usize];
                    let weight = k * px.a as f64;
                    acc[0] += weight * px.r as f64;
                    acc[1] += weight * px.g as f64;
                    acc[2] += weight * px.b as f64;
                }
            }
            let source = src[(y * width + x) as usize];
            out.push(Color4f::new(
                (factor * acc[0]) as f32,
                (factor * acc[1]) as f32,
                (factor * acc[2]) as f32,
                source.a,
            ));
        }
    }
    out
}

/// Subtracts `b` from `a` channel-wise.
///
/// RGB channels are subtracted; alpha is taken from `a`. Fails with
/// `DimensionMismatch` when the buffers differ in size.
pub fn subtract(a: &PixelBuffer, b: &PixelBuffer) -> ImgDescResult<PixelBuffer> {
    a.ensure_same_size(b)?;
    let pixels = a
        .pixels()
        .iter()
        .zip(b.pixels())
        .map(|(pa, pb)| Color4f::new(pa.r - pb.r, pa.g - pb.g, pa.b - pb.b, pa.a))
        .collect();
    PixelBuffer::new(a.width(), a.height(), pixels)
}
