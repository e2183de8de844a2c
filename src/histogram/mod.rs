//! Per-channel frequency histograms.
//!
//! Histograms are accumulated as raw counts, optionally in per-band partials
//! that are combined bin-wise, and normalized exactly once at the end. Once
//! normalized a histogram rejects further samples, combines and
//! normalizations with [`ImgDescError::AlreadyNormalized`].

use crate::image::{Color4f, PixelBuffer};
use crate::parallel::ParallelReducer;
use crate::trace::{trace_event, trace_span};
use crate::util::math::{safe_div, unit_to_byte};
use crate::util::{ImgDescError, ImgDescResult};
use std::ops::Range;

pub mod edge;

pub use edge::{edge_features, edge_histogram_rows, EdgeFeatures};

/// Bins of a color histogram (one per byte value).
pub const COLOR_BINS: usize = 256;
/// Bins of an edge-orientation histogram (0, 45, 90 and 135 degrees).
pub const EDGE_BINS: usize = 4;
/// Channels tracked by color and edge histograms (R, G, B).
pub const RGB_CHANNELS: usize = 3;

/// Channel-major histogram of `channels * bins` values.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    channels: usize,
    bins: usize,
    values: Vec<f32>,
    normalized: bool,
}

impl Histogram {
    /// Creates an empty histogram.
    pub fn new(channels: usize, bins: usize) -> Self {
        Self {
            channels,
            bins,
            values: vec![0.0; channels * bins],
            normalized: false,
        }
    }

    /// Empty RGB histogram with 256 bins per channel.
    pub fn color() -> Self {
        Self::new(RGB_CHANNELS, COLOR_BINS)
    }

    /// Empty RGB histogram with 4 orientation bins per channel.
    pub fn edge() -> Self {
        Self::new(RGB_CHANNELS, EDGE_BINS)
    }

    /// Wraps precomputed channel-major values, treated as final.
    pub fn from_values(channels: usize, bins: usize, values: Vec<f32>) -> ImgDescResult<Self> {
        if values.len() != channels * bins {
            return Err(ImgDescError::BufferSizeMismatch {
                needed: channels * bins,
                got: values.len(),
            });
        }
        Ok(Self {
            channels,
            bins,
            values,
            normalized: true,
        })
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Bins per channel.
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Returns whether `normalize` has already run.
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Returns all values, channel-major.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Returns the bins of channel `c`, or `None` past the last channel.
    pub fn channel(&self, c: usize) -> Option<&[f32]> {
        if c >= self.channels {
            return None;
        }
        self.values.get(c * self.bins..(c + 1) * self.bins)
    }

    /// Iterates over the bins of every channel in order.
    pub fn iter_channels(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.channels).map(move |c| &self.values[c * self.bins..(c + 1) * self.bins])
    }

    /// Returns the value of `bin` in channel `c`.
    pub fn get(&self, c: usize, bin: usize) -> Option<f32> {
        if c >= self.channels || bin >= self.bins {
            return None;
        }
        self.values.get(c * self.bins + bin).copied()
    }

    /// Sum of the bins of channel `c`; 0 past the last channel.
    pub fn channel_sum(&self, c: usize) -> f64 {
        self.channel(c)
            .map_or(0.0, |bins| bins.iter().map(|&v| v as f64).sum())
    }

    /// Counts one sample per channel at the channel's byte value.
    pub fn add_pixel(&mut self, pixel: &Color4f) -> ImgDescResult<()> {
        self.ensure_raw()?;
        self.count_pixel(pixel);
        Ok(())
    }

    /// Counts one sample in `bin` of channel `c`.
    pub fn add_sample(&mut self, c: usize, bin: usize) -> ImgDescResult<()> {
        self.ensure_raw()?;
        if c >= self.channels || bin >= self.bins {
            return Err(ImgDescError::invalid("histogram sample out of range"));
        }
        self.bump(c, bin);
        Ok(())
    }

    /// Divides every bin by `total_count`; a zero count yields zeros.
    pub fn normalize(&mut self, total_count: usize) -> ImgDescResult<()> {
        let counts = vec![total_count; self.channels];
        self.normalize_per_channel(&counts)
    }

    /// Divides each channel by its own sample count.
    pub fn normalize_per_channel(&mut self, counts: &[usize]) -> ImgDescResult<()> {
        self.ensure_raw()?;
        if counts.len() != self.channels {
            return Err(ImgDescError::invalid(
                "normalization needs one count per channel",
            ));
        }
        let bins = self.bins;
        for (c, &count) in counts.iter().enumerate() {
            for v in &mut self.values[c * bins..(c + 1) * bins] {
                *v = safe_div(*v as f64, count as f64) as f32;
            }
        }
        self.normalized = true;
        Ok(())
    }

    /// Adds `other` bin-wise. Both histograms must still hold raw counts.
    pub fn combine(&mut self, other: &Histogram) -> ImgDescResult<()> {
        self.ensure_same_shape(other)?;
        self.ensure_raw()?;
        other.ensure_raw()?;
        for (dst, src) in self.values.iter_mut().zip(&other.values) {
            *dst += src;
        }
        Ok(())
    }

    pub(crate) fn ensure_same_shape(&self, other: &Histogram) -> ImgDescResult<()> {
        if self.channels != other.channels || self.bins != other.bins {
            return Err(ImgDescError::ShapeMismatch {
                left_channels: self.channels,
                left_bins: self.bins,
                right_channels: other.channels,
                right_bins: other.bins,
            });
        }
        Ok(())
    }

    fn ensure_raw(&self) -> ImgDescResult<()> {
        if self.normalized {
            return Err(ImgDescError::AlreadyNormalized);
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn bump(&mut self, c: usize, bin: usize) {
        self.values[c * self.bins + bin] += 1.0;
    }

    #[inline]
    fn count_pixel(&mut self, pixel: &Color4f) {
        let bins = self.bins;
        for c in 0..self.channels.min(4) {
            let bin = unit_to_byte(pixel.channel(c)) as usize;
            if bin < bins {
                self.bump(c, bin);
            }
        }
    }
}

/// Raw RGB color counts for a band of rows.
pub fn color_histogram_rows(buffer: &PixelBuffer, rows: Range<usize>) -> Histogram {
    let mut hist = Histogram::color();
    for px in buffer.rows(rows) {
        hist.count_pixel(px);
    }
    hist
}

/// Normalized RGB color histogram of `buffer`.
///
/// Fails with `EmptyInput` for a buffer without pixels.
pub fn color_histogram(
    buffer: &PixelBuffer,
    reducer: &ParallelReducer,
) -> ImgDescResult<Histogram> {
    let _span = trace_span!("color_histogram", pixels = buffer.len()).entered();
    buffer.ensure_non_empty("color histogram needs at least one pixel")?;
    let mut hist = reducer.reduce_rows(
        buffer.height(),
        Histogram::color(),
        |rows| Ok(color_histogram_rows(buffer, rows)),
        |acc, part| acc.combine(&part),
    )?;
    hist.normalize(buffer.len())?;
    trace_event!("color_histogram_done", samples = buffer.len());
    Ok(hist)
}

#[cfg(test)]
mod tests {
    use super::Histogram;
    use crate::image::Color4f;
    use crate::util::ImgDescError;

    #[test]
    fn normalize_twice_is_rejected() {
        let mut hist = Histogram::color();
        hist.add_pixel(&Color4f::WHITE).unwrap();
        hist.normalize(1).unwrap();
        assert_eq!(hist.normalize(1).err(), Some(ImgDescError::AlreadyNormalized));
        assert_eq!(
            hist.add_pixel(&Color4f::WHITE).err(),
            Some(ImgDescError::AlreadyNormalized)
        );
    }

    #[test]
    fn combine_after_normalize_is_rejected() {
        let mut a = Histogram::color();
        let mut b = Histogram::color();
        b.normalize(1).unwrap();
        assert_eq!(a.combine(&b).err(), Some(ImgDescError::AlreadyNormalized));
    }

    #[test]
    fn combine_rejects_other_shapes() {
        let mut a = Histogram::color();
        let b = Histogram::edge();
        assert_eq!(
            a.combine(&b).err(),
            Some(ImgDescError::ShapeMismatch {
                left_channels: 3,
                left_bins: 256,
                right_channels: 3,
                right_bins: 4,
            })
        );
    }

    #[test]
    fn zero_count_normalizes_to_zero() {
        let mut hist = Histogram::edge();
        hist.add_sample(1, 2).unwrap();
        hist.normalize_per_channel(&[0, 0, 0]).unwrap();
        assert!(hist.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn per_channel_counts_are_independent() {
        let mut hist = Histogram::edge();
        hist.add_sample(0, 0).unwrap();
        hist.add_sample(0, 1).unwrap();
        hist.add_sample(2, 3).unwrap();
        hist.normalize_per_channel(&[2, 0, 1]).unwrap();
        assert_eq!(hist.channel(0), Some(&[0.5, 0.5, 0.0, 0.0][..]));
        assert_eq!(hist.channel(2), Some(&[0.0, 0.0, 0.0, 1.0][..]));
    }

    #[test]
    fn channel_access_past_the_end_is_none() {
        let hist = Histogram::edge();
        assert!(hist.channel(3).is_none());
        assert_eq!(hist.channel_sum(3), 0.0);
        assert_eq!(hist.iter_channels().count(), 3);
        assert!(hist.iter_channels().all(|bins| bins.len() == 4));
    }
}
