//! Immutable convolution kernels.

use crate::util::math::safe_div;
use crate::util::{ImgDescError, ImgDescResult};

/// Row-major convolution kernel with a scalar output factor.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    size_x: usize,
    size_y: usize,
    factor: f64,
    values: Vec<f64>,
}

impl Kernel {
    /// Builds a kernel whose factor is `1 / sum(values)`.
    ///
    /// A zero-sum kernel gets a factor of 0 instead of infinity; kernels such
    /// as Sobel must use [`Kernel::with_factor`].
    pub fn new(size_x: usize, size_y: usize, values: Vec<f64>) -> ImgDescResult<Self> {
        let sum: f64 = values.iter().sum();
        Self::with_factor(size_x, size_y, safe_div(1.0, sum), values)
    }

    /// Builds a kernel with an explicit factor.
    pub fn with_factor(
        size_x: usize,
        size_y: usize,
        factor: f64,
        values: Vec<f64>,
    ) -> ImgDescResult<Self> {
        if size_x == 0 || size_y == 0 {
            return Err(ImgDescError::invalid("kernel sizes must be non-zero"));
        }
        if values.len() != size_x * size_y {
            return Err(ImgDescError::invalid(
                "kernel values must hold size_x * size_y entries",
            ));
        }
        if !factor.is_finite() || values.iter().any(|v| !v.is_finite()) {
            return Err(ImgDescError::invalid("kernel values must be finite"));
        }
        Ok(Self {
            size_x,
            size_y,
            factor,
            values,
        })
    }

    /// The 1x1 kernel that leaves colors unchanged.
    pub fn identity() -> Self {
        Self {
            size_x: 1,
            size_y: 1,
            factor: 1.0,
            values: vec![1.0],
        }
    }

    /// Horizontal 1D kernel (`size_y == 1`), normalized by its sum.
    pub fn row(values: Vec<f64>) -> ImgDescResult<Self> {
        Self::new(values.len(), 1, values)
    }

    /// Vertical 1D kernel (`size_x == 1`), normalized by its sum.
    pub fn column(values: Vec<f64>) -> ImgDescResult<Self> {
        Self::new(1, values.len(), values)
    }

    /// Kernel width.
    pub fn size_x(&self) -> usize {
        self.size_x
    }

    /// Kernel height.
    pub fn size_y(&self) -> usize {
        self.size_y
    }

    /// Multiplier applied to every weighted sum.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Returns the raw kernel values in row-major order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the value at column `kx`, row `ky`.
    #[inline]
    pub fn value(&self, kx: usize, ky: usize) -> f64 {
        self.values[ky * self.size_x + kx]
    }

    /// Returns the transposed kernel with the same factor.
    pub fn transposed(&self) -> Self {
        let mut values = Vec::with_capacity(self.values.len());
        for kx in 0..self.size_x {
            for ky in 0..self.size_y {
                values.push(self.value(kx, ky));
            }
        }
        Self {
            size_x: self.size_y,
            size_y: self.size_x,
            factor: self.factor,
            values,
        }
    }
}
