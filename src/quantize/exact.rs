//! Exact color frequency counting.

use crate::image::PixelBuffer;
use crate::quantize::topk::TopK;
use std::collections::HashMap;
use std::ops::Range;

/// Counts exact byte-precision colors, remembering first-occurrence order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorCounter {
    index: HashMap<u32, usize>,
    entries: Vec<(u32, u64)>,
    total: u64,
}

impl ColorCounter {
    /// Creates an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts colors of a band of rows in scan order.
    pub fn from_rows(buffer: &PixelBuffer, rows: Range<usize>) -> Self {
        let mut counter = Self::new();
        for px in buffer.rows(rows) {
            counter.add(px.pack(), 1);
        }
        counter
    }

    /// Adds `count` occurrences of the packed color.
    pub fn add(&mut self, color: u32, count: u64) {
        match self.index.get(&color) {
            Some(&slot) => self.entries[slot].1 += count,
            None => {
                self.index.insert(color, self.entries.len());
                self.entries.push((color, count));
            }
        }
        self.total += count;
    }

    /// Folds `other` in; its new colors are ordered after the existing ones.
    pub fn merge(&mut self, other: ColorCounter) {
        for (color, count) in other.entries {
            self.add(color, count);
        }
    }

    /// Number of distinct colors.
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    /// Total number of counted samples.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Occurrences of `color`.
    pub fn count(&self, color: u32) -> u64 {
        self.index
            .get(&color)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Returns `k` `(color, count)` pairs by descending count.
    ///
    /// Ties keep first-occurrence order. Fewer than `k` distinct colors are
    /// padded with `(0, 0)`.
    pub fn best_colors(&self, k: usize) -> Vec<(u32, u64)> {
        let mut topk = TopK::new(k);
        for (order, &(color, count)) in self.entries.iter().enumerate() {
            topk.push(count, order, color);
        }
        let mut best: Vec<(u32, u64)> = topk
            .into_sorted_desc()
            .into_iter()
            .map(|(count, color)| (color, count))
            .collect();
        best.resize(k, (0, 0));
        best
    }
}
