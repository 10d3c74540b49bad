// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A tally of how many pixels escaped at each iteration count, used to
//! equalize the gradient so that it follows the actual distribution of
//! escape times in the current view.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared, lock-free per-iteration counters.  Every column worker
/// records into the same accumulator; reading it is only meaningful
/// once all of them have joined.
#[derive(Debug)]
pub struct HistogramAccumulator {
    buckets: Vec<AtomicUsize>,
}

impl HistogramAccumulator {
    /// One counter for each iteration count a point can escape at.
    pub fn new(max_iterations: u32) -> Self {
        HistogramAccumulator {
            buckets: (0..max_iterations).map(|_| AtomicUsize::new(0)).collect(),
        }
    }

    /// Counts one escaped pixel.  Bounded pixels, which sit at or past
    /// the last bucket, are not escapes and are dropped.  A smoothed
    /// value is counted under its integral part.
    #[inline]
    pub fn record(&self, value: f64) {
        if value < 0.0 {
            return;
        }
        if let Some(bucket) = self.buckets.get(value as usize) {
            bucket.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// The number of escaped pixels recorded so far.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.load(Ordering::Relaxed)).sum()
    }

    /// Freezes the counters into a plain histogram.
    pub fn snapshot(&self) -> Histogram {
        Histogram::from_counts(
            self.buckets
                .iter()
                .map(|b| b.load(Ordering::Relaxed))
                .collect(),
        )
    }
}

/// A read-only histogram, with the running totals precomputed so that
/// looking up a pixel's cumulative position is a single index.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    counts: Vec<usize>,
    // cumulative[n] is the number of escapes at or below n.
    cumulative: Vec<usize>,
    total: usize,
}

impl Histogram {
    /// Builds a histogram from raw per-iteration counts.
    pub fn from_counts(counts: Vec<usize>) -> Self {
        let cumulative: Vec<usize> = counts
            .iter()
            .scan(0, |acc, &count| {
                *acc += count;
                Some(*acc)
            })
            .collect();
        let total = cumulative.last().cloned().unwrap_or(0);
        Histogram {
            counts,
            cumulative,
            total,
        }
    }

    /// The per-iteration counts.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// The number of escaped pixels.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The fraction of escaped pixels whose count is at or below
    /// `iteration`.  Zero for an empty histogram.
    pub fn cumulative(&self, iteration: usize) -> f64 {
        if self.total == 0 || self.cumulative.is_empty() {
            return 0.0;
        }
        let index = iteration.min(self.cumulative.len() - 1);
        self.cumulative[index] as f64 / self.total as f64
    }

    /// The fraction of escaped pixels that escaped strictly before
    /// `iteration`: `cumulative(iteration - 1)`, and zero at the bottom.
    pub fn below(&self, iteration: usize) -> f64 {
        if iteration == 0 {
            0.0
        } else {
            self.cumulative(iteration - 1)
        }
    }
}
