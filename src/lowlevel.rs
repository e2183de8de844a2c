//! Building blocks for custom extraction pipelines.
//!
//! These expose the per-band accumulators, raw filters and individual
//! metrics behind [`Extractor`](crate::Extractor). Most users only need the
//! top-level `Extractor`, `ImageData` and `distance`.

pub use crate::distance::{bhattacharyya, city_block, euclidean, mdpa};
pub use crate::filter::{convolve, stretch_channels, subtract};
pub use crate::histogram::{
    color_histogram_rows, edge_histogram_rows, COLOR_BINS, EDGE_BINS, RGB_CHANNELS,
};
pub use crate::moments::{
    central_moment, central_moment_rows, normalized_moment, raw_moment, raw_moment_rows,
    CentralMoments, NormalizedMoments, RawMoments,
};
pub use crate::quantize::topk::TopK;
pub use crate::quantize::{cell_index, cluster_colors, count_colors, GRID_CELLS, GRID_SIDE};
