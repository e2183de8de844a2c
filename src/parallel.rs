//! Row-banded fork-join helper.
//!
//! Work is split into contiguous row bands, one local accumulator per band.
//! Bands run on the rayon pool when the `rayon` feature is enabled and
//! `parallel` is set, otherwise sequentially on the calling thread with the
//! same banding. Partials always come back in row order and are folded on
//! the calling thread after the join, so no lock guards the merge.

use crate::trace::trace_debug;
use crate::util::{ImgDescError, ImgDescResult};
use std::ops::Range;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Default minimum number of rows per band.
pub const DEFAULT_MIN_BATCH_ROWS: usize = 16;

/// Splits row ranges into bands and reduces per-band accumulators.
#[derive(Clone, Copy, Debug)]
pub struct ParallelReducer {
    parallel: bool,
    min_batch_rows: usize,
}

impl Default for ParallelReducer {
    fn default() -> Self {
        Self::new(true, DEFAULT_MIN_BATCH_ROWS)
    }
}

impl ParallelReducer {
    /// Creates a reducer; `min_batch_rows` is clamped to at least 1.
    pub fn new(parallel: bool, min_batch_rows: usize) -> Self {
        Self {
            parallel,
            min_batch_rows: min_batch_rows.max(1),
        }
    }

    /// Reducer that always runs bands on the calling thread.
    pub fn sequential() -> Self {
        Self::new(false, DEFAULT_MIN_BATCH_ROWS)
    }

    /// Returns whether bands may run concurrently.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Returns the minimum band height.
    pub fn min_batch_rows(&self) -> usize {
        self.min_batch_rows
    }

    /// Returns the row bands used for `rows` rows.
    pub fn bands(&self, rows: usize) -> Vec<Range<usize>> {
        row_bands(rows, worker_count(), self.min_batch_rows)
    }

    /// Runs `work` on every band and returns the partials in row order.
    ///
    /// All bands run to completion before errors are inspected. A single
    /// failure is returned unchanged; several are wrapped in
    /// [`ImgDescError::Parallel`].
    pub fn map_bands<A, F>(&self, rows: usize, work: F) -> ImgDescResult<Vec<A>>
    where
        A: Send,
        F: Fn(Range<usize>) -> ImgDescResult<A> + Sync + Send,
    {
        let bands = self.bands(rows);
        trace_debug!("map_bands", rows = rows, bands = bands.len());
        let results = self.run(bands, &work);
        collect_partials(results)
    }

    /// Maps every band to a local accumulator and folds them in row order.
    ///
    /// `init` seeds the fold; `merge` runs on the calling thread only.
    pub fn reduce_rows<A, F, M>(
        &self,
        rows: usize,
        init: A,
        work: F,
        mut merge: M,
    ) -> ImgDescResult<A>
    where
        A: Send,
        F: Fn(Range<usize>) -> ImgDescResult<A> + Sync + Send,
        M: FnMut(&mut A, A) -> ImgDescResult<()>,
    {
        let partials = self.map_bands(rows, work)?;
        let mut acc = init;
        for partial in partials {
            merge(&mut acc, partial)?;
        }
        Ok(acc)
    }

    #[cfg(feature = "rayon")]
    fn run<A, F>(&self, bands: Vec<Range<usize>>, work: &F) -> Vec<ImgDescResult<A>>
    where
        A: Send,
        F: Fn(Range<usize>) -> ImgDescResult<A> + Sync + Send,
    {
        if self.parallel && bands.len() > 1 {
            bands.into_par_iter().map(work).collect()
        } else {
            bands.into_iter().map(work).collect()
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn run<A, F>(&self, bands: Vec<Range<usize>>, work: &F) -> Vec<ImgDescResult<A>>
    where
        A: Send,
        F: Fn(Range<usize>) -> ImgDescResult<A> + Sync + Send,
    {
        bands.into_iter().map(work).collect()
    }
}

fn collect_partials<A>(results: Vec<ImgDescResult<A>>) -> ImgDescResult<Vec<A>> {
    let mut partials = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(partial) => partials.push(partial),
            Err(err) => errors.push(err),
        }
    }
    match errors.len() {
        0 => Ok(partials),
        1 => Err(errors.remove(0)),
        _ => Err(ImgDescError::Parallel(errors)),
    }
}

#[cfg(feature = "rayon")]
fn worker_count() -> usize {
    rayon::current_num_threads().max(1)
}

#[cfg(not(feature = "rayon"))]
fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Splits `rows` into contiguous bands of `max(ceil(rows / workers), min_batch)`.
pub(crate) fn row_bands(rows: usize, workers: usize, min_batch: usize) -> Vec<Range<usize>> {
    if rows == 0 {
        return Vec::new();
    }
    let workers = workers.max(1);
    let band = rows.div_ceil(workers).max(min_batch.max(1));
    (0..rows)
        .step_by(band)
        .map(|start| start..(start + band).min(rows))
        .collect()
}
