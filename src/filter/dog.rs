//! Difference-of-Gaussians band-pass filter.

use crate::filter::convolve::subtract;
use crate::filter::gaussian::GaussianBlur;
use crate::image::{Color4f, PixelBuffer};
use crate::parallel::ParallelReducer;
use crate::trace::trace_span;
use crate::util::math::safe_div;
use crate::util::ImgDescResult;

/// Parameters for [`DifferenceOfGaussians`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DogParams {
    /// Shared standard deviation of both blurs.
    pub sigma: f64,
    /// Odd size of the narrow kernel.
    pub small_size: usize,
    /// Odd size of the wide kernel.
    pub large_size: usize,
    /// Stretch each channel to `[0, 1]` afterwards. Meant for display only.
    pub stretch: bool,
}

impl Default for DogParams {
    fn default() -> Self {
        Self {
            sigma: 1.0,
            small_size: 3,
            large_size: 7,
            stretch: false,
        }
    }
}

/// Band-pass filter: narrow blur minus wide blur.
#[derive(Clone, Debug)]
pub struct DifferenceOfGaussians {
    small: GaussianBlur,
    large: GaussianBlur,
    stretch: bool,
}

impl DifferenceOfGaussians {
    /// Builds both blurs; fails with `InvalidParameter` for bad sizes.
    pub fn new(params: DogParams) -> ImgDescResult<Self> {
        Ok(Self {
            small: GaussianBlur::new(params.small_size, params.sigma)?,
            large: GaussianBlur::new(params.large_size, params.sigma)?,
            stretch: params.stretch,
        })
    }

    /// Returns the small blur minus the large blur, optionally stretched.
    pub fn apply(
        &self,
        buffer: &PixelBuffer,
        reducer: &ParallelReducer,
    ) -> ImgDescResult<PixelBuffer> {
        let _span = trace_span!("dog", width = buffer.width(), height = buffer.height()).entered();
        let narrow = self.small.apply(buffer, reducer)?;
        let wide = self.large.apply(buffer, reducer)?;
        let diff = subtract(&narrow, &wide)?;
        if self.stretch {
            stretch_channels(&diff)
        } else {
            Ok(diff)
        }
    }
}

/// Rescales each RGB channel from its min/max range to `[0, 1]`.
///
/// A flat channel maps to 0. Alpha is left untouched.
pub fn stretch_channels(buffer: &PixelBuffer) -> ImgDescResult<PixelBuffer> {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for px in buffer.pixels() {
        for (c, v) in px.rgb_array().into_iter().enumerate() {
            min[c] = min[c].min(v);
            max[c] = max[c].max(v);
        }
    }
    let scale = |v: f32, c: usize| safe_div((v - min[c]) as f64, (max[c] - min[c]) as f64) as f32;
    let pixels: Vec<Color4f> = buffer
        .pixels()
        .iter()
        .map(|px| Color4f::new(scale(px.r, 0), scale(px.g, 1), scale(px.b, 2), px.a))
        .collect();
    PixelBuffer::new(buffer.width(), buffer.height(), pixels)
}

#[cfg(test)]
mod tests {
    use super::{stretch_channels, DifferenceOfGaussians, DogParams};
    use crate::image::{Color4f, PixelBuffer};
    use crate::parallel::ParallelReducer;
    use crate::util::ImgDescError;

    #[test]
    fn even_sizes_are_rejected() {
        let err = DifferenceOfGaussians::new(DogParams {
            large_size: 6,
            ..DogParams::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, ImgDescError::InvalidParameter { .. }));
    }

    #[test]
    fn flat_interior_cancels() {
        let buffer = PixelBuffer::filled(15, 15, Color4f::rgb(0.3, 0.3, 0.3)).unwrap();
        let dog = DifferenceOfGaussians::new(DogParams::default()).unwrap();
        let out = dog.apply(&buffer, &ParallelReducer::sequential()).unwrap();
        assert!(out.get(7, 7).unwrap().r.abs() < 1e-5);
    }

    #[test]
    fn stretch_maps_channel_range_to_unit() {
        let buffer = PixelBuffer::new(
            3,
            1,
            vec![
                Color4f::new(-1.0, 2.0, 0.5, 0.7),
                Color4f::new(0.0, 2.0, 0.5, 0.7),
                Color4f::new(1.0, 2.0, 0.5, 0.7),
            ],
        )
        .unwrap();
        let out = stretch_channels(&buffer).unwrap();
        let reds: Vec<f32> = out.pixels().iter().map(|p| p.r).collect();
        assert_eq!(reds, vec![0.0, 0.5, 1.0]);
        assert_eq!(out.pixels()[1].g, 0.0);
        assert_eq!(out.pixels()[1].a, 0.7);
    }
}
