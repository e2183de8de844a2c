//! Spatial color quantization on an 8x8x8 RGB grid.
//!
//! Each byte channel is split into eight buckets of 32 values, giving 512
//! cells indexed `(r * 8 + g) * 8 + b`. A cell keeps its member count and a
//! running integer average color.

use crate::image::{Color4f, PixelBuffer};
use crate::parallel::ParallelReducer;
use crate::trace::{trace_event, trace_span};
use crate::util::ImgDescResult;
use std::ops::Range;

pub mod exact;
pub mod topk;

pub use exact::ColorCounter;

use topk::TopK;

/// Buckets per channel.
pub const GRID_SIDE: usize = 8;
/// Total number of grid cells.
pub const GRID_CELLS: usize = GRID_SIDE * GRID_SIDE * GRID_SIDE;
const BUCKET_WIDTH: u8 = 32;

/// Member count and average color of one grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColorCluster {
    /// Number of colors merged into this cell.
    pub count: u32,
    /// Average RGBA color at byte precision.
    pub average: [u8; 4],
}

impl ColorCluster {
    /// Adds one member and updates the running integer average.
    pub fn add(&mut self, color: [u8; 4]) {
        let n = self.count as u64;
        for (avg, v) in self.average.iter_mut().zip(color) {
            *avg = ((*avg as u64 * n + v as u64) / (n + 1)) as u8;
        }
        self.count += 1;
    }

    /// Merges another cluster, weighting both averages by their counts.
    pub fn merge(&mut self, other: &ColorCluster) {
        if other.count == 0 {
            return;
        }
        let a = self.count as u64;
        let b = other.count as u64;
        for (avg, v) in self.average.iter_mut().zip(other.average) {
            *avg = ((*avg as u64 * a + v as u64 * b) / (a + b)) as u8;
        }
        self.count += other.count;
    }

    /// Packs the average color as `0xRRGGBBAA`.
    pub fn packed(&self) -> u32 {
        u32::from_be_bytes(self.average)
    }
}

/// Returns the grid cell that owns a byte color.
#[inline]
pub fn cell_index(color: [u8; 4]) -> usize {
    let r = (color[0] / BUCKET_WIDTH) as usize;
    let g = (color[1] / BUCKET_WIDTH) as usize;
    let b = (color[2] / BUCKET_WIDTH) as usize;
    (r * GRID_SIDE + g) * GRID_SIDE + b
}

/// The 512 clusters of the RGB grid.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterGrid {
    cells: Vec<ColorCluster>,
}

impl Default for ClusterGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterGrid {
    /// Creates a grid of empty cells.
    pub fn new() -> Self {
        Self {
            cells: vec![ColorCluster::default(); GRID_CELLS],
        }
    }

    /// Clusters a band of rows.
    pub fn from_rows(buffer: &PixelBuffer, rows: Range<usize>) -> Self {
        let mut grid = Self::new();
        for px in buffer.rows(rows) {
            grid.add_color(px);
        }
        grid
    }

    /// Adds a color to its owning cell.
    pub fn add_color(&mut self, color: &Color4f) {
        let bytes = color.to_bytes();
        self.cells[cell_index(bytes)].add(bytes);
    }

    /// Merges `other` cell by cell.
    pub fn combine(&mut self, other: &ClusterGrid) {
        for (dst, src) in self.cells.iter_mut().zip(&other.cells) {
            dst.merge(src);
        }
    }

    /// All cells in index order.
    pub fn cells(&self) -> &[ColorCluster] {
        &self.cells
    }

    /// Cell at `index`, if in range.
    pub fn cluster(&self, index: usize) -> Option<&ColorCluster> {
        self.cells.get(index)
    }

    /// Total members across all cells.
    pub fn total_count(&self) -> u64 {
        self.cells.iter().map(|c| c.count as u64).sum()
    }

    /// Returns the `k` most populous cells as `(cell index, cluster)`.
    ///
    /// Equal counts keep cell order. Empty cells fill the tail when fewer
    /// than `k` cells are populated. At most [`GRID_CELLS`] entries are
    /// returned.
    pub fn best_clusters(&self, k: usize) -> Vec<(usize, ColorCluster)> {
        let mut topk = TopK::new(k);
        for (idx, cluster) in self.cells.iter().enumerate() {
            topk.push(cluster.count as u64, idx, (idx, *cluster));
        }
        topk.into_sorted_desc()
            .into_iter()
            .map(|(_, entry)| entry)
            .collect()
    }
}

/// Clusters every pixel of `buffer`.
pub fn cluster_colors(
    buffer: &PixelBuffer,
    reducer: &ParallelReducer,
) -> ImgDescResult<ClusterGrid> {
    let _span = trace_span!("cluster_colors", pixels = buffer.len()).entered();
    buffer.ensure_non_empty("color clustering needs at least one pixel")?;
    let grid = reducer.reduce_rows(
        buffer.height(),
        ClusterGrid::new(),
        |rows| Ok(ClusterGrid::from_rows(buffer, rows)),
        |acc, part| {
            acc.combine(&part);
            Ok(())
        },
    )?;
    trace_event!(
        "cluster_colors_done",
        populated = grid.cells.iter().filter(|c| c.count > 0).count()
    );
    Ok(grid)
}

/// Counts exact colors of every pixel of `buffer`.
pub fn count_colors(
    buffer: &PixelBuffer,
    reducer: &ParallelReducer,
) -> ImgDescResult<ColorCounter> {
    let _span = trace_span!("count_colors", pixels = buffer.len()).entered();
    buffer.ensure_non_empty("color counting needs at least one pixel")?;
    reducer.reduce_rows(
        buffer.height(),
        ColorCounter::new(),
        |rows| Ok(ColorCounter::from_rows(buffer, rows)),
        |acc, part| {
            acc.merge(part);
            Ok(())
        },
    )
}
