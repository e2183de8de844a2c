//! Convolution engine and the filters built on it.
//!
//! Every filter takes an immutable [`PixelBuffer`](crate::PixelBuffer) and
//! returns a freshly allocated one. Border taps that fall outside the image
//! are skipped rather than clamped or wrapped, so kernels lose weight near
//! the edges.

pub mod convolve;
pub mod dog;
pub mod gaussian;
pub mod kernel;
pub mod sobel;

pub use convolve::{convolve, subtract};
pub use dog::{stretch_channels, DifferenceOfGaussians, DogParams};
pub use gaussian::{GaussianBlur, GaussianParams};
pub use kernel::Kernel;
pub use sobel::{EdgeMap, SobelFilter};
