//! Edge-orientation histogram and edge densities.
//!
//! Only pixels whose Sobel mask is set contribute. Orientations are folded
//! into `[0, 180)` degrees and bucketed by `round(deg / 45) mod 4`, so each
//! channel is normalized by its own edge count.

use crate::filter::sobel::EdgeMap;
use crate::histogram::{Histogram, RGB_CHANNELS};
use crate::parallel::ParallelReducer;
use crate::trace::{trace_event, trace_span};
use crate::util::math::{orientation_bucket, safe_div};
use crate::util::{ImgDescError, ImgDescResult};
use std::ops::Range;

/// Normalized edge histogram plus per-channel edge densities.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeFeatures {
    histogram: Histogram,
    densities: [f64; RGB_CHANNELS],
    counts: [usize; RGB_CHANNELS],
}

impl EdgeFeatures {
    /// Orientation histogram, normalized per channel.
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Fraction of pixels that are edges, per channel.
    pub fn densities(&self) -> [f64; RGB_CHANNELS] {
        self.densities
    }

    /// Number of edge pixels per channel.
    pub fn counts(&self) -> [usize; RGB_CHANNELS] {
        self.counts
    }

    /// Splits into the histogram and the densities.
    pub fn into_parts(self) -> (Histogram, [f64; RGB_CHANNELS]) {
        (self.histogram, self.densities)
    }
}

/// Raw orientation counts and edge counts for a band of rows.
pub fn edge_histogram_rows(
    edges: &EdgeMap,
    rows: Range<usize>,
) -> (Histogram, [usize; RGB_CHANNELS]) {
    let mut hist = Histogram::edge();
    let mut counts = [0usize; RGB_CHANNELS];
    let mask = edges.mask();
    let width = mask.width();
    let rows = rows.start.min(mask.height())..rows.end.min(mask.height());
    let start = rows.start * width;
    let end = rows.end * width;
    let orientations = &edges.orientations()[start..end];
    for (px, angles) in mask.rows(rows).iter().zip(orientations) {
        let bits = px.rgb_array();
        for c in 0..RGB_CHANNELS {
            if bits[c] > 0.0 {
                hist.bump(c, orientation_bucket(angles[c]));
                counts[c] += 1;
            }
        }
    }
    (hist, counts)
}

/// Builds the edge histogram and densities from a Sobel edge map.
///
/// Fails with `EmptyInput` for an empty map.
pub fn edge_features(edges: &EdgeMap, reducer: &ParallelReducer) -> ImgDescResult<EdgeFeatures> {
    let _span = trace_span!(
        "edge_histogram",
        width = edges.width(),
        height = edges.height()
    )
    .entered();
    let total = edges.width() * edges.height();
    if total == 0 {
        return Err(ImgDescError::EmptyInput {
            reason: "edge histogram needs at least one pixel",
        });
    }

    let (mut histogram, counts) = reducer.reduce_rows(
        edges.height(),
        (Histogram::edge(), [0usize; RGB_CHANNELS]),
        |rows| Ok(edge_histogram_rows(edges, rows)),
        |acc, (part, part_counts)| {
            acc.0.combine(&part)?;
            for (dst, src) in acc.1.iter_mut().zip(part_counts) {
                *dst += src;
            }
            Ok(())
        },
    )?;
    histogram.normalize_per_channel(&counts)?;

    let densities = counts.map(|count| safe_div(count as f64, total as f64));
    trace_event!(
        "edge_histogram_done",
        red_edges = counts[0],
        green_edges = counts[1],
        blue_edges = counts[2]
    );
    Ok(EdgeFeatures {
        histogram,
        densities,
        counts,
    })
}
