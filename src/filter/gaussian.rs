//! Separable Gaussian blur.

use crate::filter::convolve::convolve;
use crate::filter::kernel::Kernel;
use crate::image::PixelBuffer;
use crate::parallel::ParallelReducer;
use crate::trace::trace_span;
use crate::util::math::odd_size_for_sigma;
use crate::util::{ImgDescError, ImgDescResult};
use std::f64::consts::PI;

/// Size and standard deviation of a Gaussian kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaussianParams {
    /// Kernel length in pixels; must be odd.
    pub size: usize,
    /// Standard deviation in pixels; must be positive.
    pub sigma: f64,
}

impl Default for GaussianParams {
    fn default() -> Self {
        Self::from_sigma(1.0)
    }
}

impl GaussianParams {
    /// Uses the smallest odd size that covers three standard deviations.
    pub fn from_sigma(sigma: f64) -> Self {
        Self {
            size: odd_size_for_sigma(sigma),
            sigma,
        }
    }

    /// Rejects even sizes and non-positive sigma.
    pub fn validate(&self) -> ImgDescResult<()> {
        if self.size % 2 == 0 {
            return Err(ImgDescError::invalid("gaussian kernel size must be odd"));
        }
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(ImgDescError::invalid("gaussian sigma must be positive"));
        }
        Ok(())
    }
}

/// Gaussian blur applied as a row pass followed by a column pass.
#[derive(Clone, Debug)]
pub struct GaussianBlur {
    params: GaussianParams,
    row: Kernel,
    column: Kernel,
}

impl GaussianBlur {
    /// Builds both 1D kernels; fails with `InvalidParameter` for an even size.
    pub fn new(size: usize, sigma: f64) -> ImgDescResult<Self> {
        Self::from_params(GaussianParams { size, sigma })
    }

    /// Builds a blur with the size derived from `sigma`.
    pub fn from_sigma(sigma: f64) -> ImgDescResult<Self> {
        Self::from_params(GaussianParams::from_sigma(sigma))
    }

    /// Builds the row and column kernels for `params`.
    pub fn from_params(params: GaussianParams) -> ImgDescResult<Self> {
        params.validate()?;
        let samples = gaussian_samples(params.size, params.sigma);
        let row = Kernel::row(samples.clone())?;
        let column = Kernel::column(samples)?;
        Ok(Self {
            params,
            row,
            column,
        })
    }

    /// Size and sigma of this blur.
    pub fn params(&self) -> GaussianParams {
        self.params
    }

    /// Horizontal pass kernel.
    pub fn row_kernel(&self) -> &Kernel {
        &self.row
    }

    /// Vertical pass kernel.
    pub fn column_kernel(&self) -> &Kernel {
        &self.column
    }

    /// Blurs `buffer` with the row kernel, then the column kernel.
    pub fn apply(
        &self,
        buffer: &PixelBuffer,
        reducer: &ParallelReducer,
    ) -> ImgDescResult<PixelBuffer> {
        let _span = trace_span!(
            "gaussian_blur",
            size = self.params.size,
            sigma = self.params.sigma
        )
        .entered();
        let horizontal = convolve(buffer, &self.row, reducer)?;
        convolve(&horizontal, &self.column, reducer)
    }
}

/// Samples the isotropic 2D Gaussian density along one axis.
fn gaussian_samples(size: usize, sigma: f64) -> Vec<f64> {
    let half = (size / 2) as f64;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let norm = 1.0 / (PI * two_sigma_sq);
    (0..size)
        .map(|i| {
            let d = i as f64 - half;
            norm * (-(d * d) / two_sigma_sq).exp()
        })
        .collect()
}
