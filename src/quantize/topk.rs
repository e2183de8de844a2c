//! Top-K selection by count with first-seen tie-breaking.

use std::cmp::Ordering;

#[derive(Clone, Copy, Debug)]
struct Ranked<T> {
    count: u64,
    order: usize,
    item: T,
}

fn ranked_cmp_desc<T>(a: &Ranked<T>, b: &Ranked<T>) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| a.order.cmp(&b.order))
}

/// Keeps the `k` items with the highest counts.
///
/// Equal counts are ordered by `order` ascending, which makes the result the
/// same as a stable descending sort truncated to `k`.
pub struct TopK<T> {
    k: usize,
    items: Vec<Ranked<T>>,
}

impl<T> TopK<T> {
    /// Creates an empty selection of at most `k` items.
    ///
    /// Storage grows with the items pushed, not with `k`.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            items: Vec::new(),
        }
    }

    /// Offers an item, evicting the current worst when full.
    pub fn push(&mut self, count: u64, order: usize, item: T) {
        if self.k == 0 {
            return;
        }
        let candidate = Ranked { count, order, item };
        if self.items.len() < self.k {
            self.items.push(candidate);
            return;
        }

        let mut worst_idx = 0usize;
        for (idx, ranked) in self.items.iter().enumerate().skip(1) {
            if ranked_cmp_desc(ranked, &self.items[worst_idx]) == Ordering::Greater {
                worst_idx = idx;
            }
        }
        if ranked_cmp_desc(&candidate, &self.items[worst_idx]) == Ordering::Less {
            self.items[worst_idx] = candidate;
        }
    }

    /// Returns `(count, item)` pairs, highest count first.
    pub fn into_sorted_desc(mut self) -> Vec<(u64, T)> {
        self.items.sort_by(ranked_cmp_desc);
        self.items.into_iter().map(|r| (r.count, r.item)).collect()
    }
}
