//! imgdesc turns RGBA images into compact descriptors for similarity search.
//!
//! An [`Extractor`] computes color histograms, edge-orientation histograms,
//! dominant colors, quantized shades and moment invariants from a
//! [`PixelBuffer`]; [`distance`] compares histograms under one of four
//! normalized [`Metric`]s. Row bands are processed in parallel via the
//! default `rayon` feature.

pub mod descriptor;
pub mod distance;
pub mod filter;
pub mod histogram;
pub mod image;
pub mod lowlevel;
pub mod moments;
pub mod parallel;
pub mod quantize;
pub(crate) mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use descriptor::{
    extract, ColorInfo, DescriptorDistance, ExtractConfig, Extractor, ImageData, ImageId,
    MAX_TOP_K,
};
pub use distance::{distance, Metric};
pub use filter::{
    DifferenceOfGaussians, DogParams, EdgeMap, GaussianBlur, GaussianParams, Kernel, SobelFilter,
};
pub use histogram::{color_histogram, edge_features, EdgeFeatures, Histogram};
pub use crate::image::{Color4f, PixelBuffer};
pub use moments::{analyze_moments, MomentDescriptor};
pub use parallel::ParallelReducer;
pub use quantize::{ClusterGrid, ColorCluster, ColorCounter};
pub use util::{ImgDescError, ImgDescResult};
