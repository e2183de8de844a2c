//! Sobel gradient filter producing a binary edge mask and orientations.

use crate::filter::convolve::convolve;
use crate::filter::kernel::Kernel;
use crate::image::{Color4f, PixelBuffer};
use crate::parallel::ParallelReducer;
use crate::trace::{trace_event, trace_span};
use crate::util::math::clamp01;
use crate::util::{ImgDescError, ImgDescResult};

const SOBEL_X: [f64; 9] = [1.0, 0.0, -1.0, 2.0, 0.0, -2.0, 1.0, 0.0, -1.0];

/// Sobel edge detector with a magnitude threshold in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct SobelFilter {
    threshold: f32,
    kernel_x: Kernel,
    kernel_y: Kernel,
}

/// Output of [`SobelFilter::apply`].
///
/// `mask` holds 1.0 in every RGB channel whose gradient magnitude reached the
/// threshold and 0.0 elsewhere; alpha is copied from the source. The
/// per-channel gradient orientation (radians, `atan2(gy, gx)`) is kept for
/// every pixel regardless of the mask.
#[derive(Clone, Debug)]
pub struct EdgeMap {
    mask: PixelBuffer,
    orientation: Vec<[f32; 3]>,
}

impl EdgeMap {
    /// Returns the binary edge mask.
    pub fn mask(&self) -> &PixelBuffer {
        &self.mask
    }

    /// Returns per-pixel RGB orientations in row-major order.
    pub fn orientations(&self) -> &[[f32; 3]] {
        &self.orientation
    }

    /// Returns the RGB orientations at `(x, y)`.
    pub fn orientation(&self, x: usize, y: usize) -> Option<[f32; 3]> {
        if x >= self.mask.width() || y >= self.mask.height() {
            return None;
        }
        self.orientation.get(y * self.mask.width() + x).copied()
    }

    /// Mask width in pixels.
    pub fn width(&self) -> usize {
        self.mask.width()
    }

    /// Mask height in pixels.
    pub fn height(&self) -> usize {
        self.mask.height()
    }

    /// Consumes the map, returning the mask.
    pub fn into_mask(self) -> PixelBuffer {
        self.mask
    }
}

impl SobelFilter {
    /// Creates a filter; fails with `InvalidParameter` outside `[0, 1]`.
    pub fn new(threshold: f32) -> ImgDescResult<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ImgDescError::invalid("sobel threshold must be in [0, 1]"));
        }
        let kernel_x = Kernel::with_factor(3, 3, 1.0, SOBEL_X.to_vec())?;
        let kernel_y = kernel_x.transposed();
        Ok(Self {
            threshold,
            kernel_x,
            kernel_y,
        })
    }

    /// Magnitude above which a pixel counts as an edge.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Horizontal gradient kernel.
    pub fn kernel_x(&self) -> &Kernel {
        &self.kernel_x
    }

    /// Vertical gradient kernel.
    pub fn kernel_y(&self) -> &Kernel {
        &self.kernel_y
    }

    /// Computes the edge mask and orientations for `buffer`.
    pub fn apply(&self, buffer: &PixelBuffer, reducer: &ParallelReducer) -> ImgDescResult<EdgeMap> {
        let _span = trace_span!(
            "sobel",
            width = buffer.width(),
            height = buffer.height(),
            threshold = self.threshold
        )
        .entered();

        let gx = convolve(buffer, &self.kernel_x, reducer)?;
        let gy = convolve(buffer, &self.kernel_y, reducer)?;

        let threshold = self.threshold as f64;
        let mut mask = Vec::with_capacity(buffer.len());
        let mut orientation = Vec::with_capacity(buffer.len());
        let mut edges = 0usize;
        for ((src, px), py) in buffer.pixels().iter().zip(gx.pixels()).zip(gy.pixels()) {
            let gxs = px.rgb_array();
            let gys = py.rgb_array();
            let mut bits = [0.0f32; 3];
            let mut angles = [0.0f32; 3];
            for c in 0..3 {
                let (dx, dy) = (gxs[c] as f64, gys[c] as f64);
                let magnitude = clamp01((dx * dx + dy * dy).sqrt());
                if magnitude >= threshold {
                    bits[c] = 1.0;
                    edges += 1;
                }
                angles[c] = gys[c].atan2(gxs[c]);
            }
            mask.push(Color4f::new(bits[0], bits[1], bits[2], src.a));
            orientation.push(angles);
        }
        trace_event!("sobel_done", edge_samples = edges);

        Ok(EdgeMap {
            mask: PixelBuffer::new(buffer.width(), buffer.height(), mask)?,
            orientation,
        })
    }
}
