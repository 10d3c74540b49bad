// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The iteration grid: one escape value per pixel, stored column by
//! column so that a column is a single contiguous slice that can be
//! handed to exactly one worker.

use std::slice::ChunksMut;

use crate::histogram::Histogram;

/// Escape values for every pixel of an image.  A value equal to
/// `max_iterations` marks a pixel that never escaped.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationGrid {
    width: usize,
    height: usize,
    max_iterations: u32,
    values: Vec<f64>,
}

impl IterationGrid {
    /// A grid with every pixel marked as bounded.
    pub fn new(width: usize, height: usize, max_iterations: u32) -> Self {
        IterationGrid {
            width,
            height,
            max_iterations,
            values: vec![f64::from(max_iterations); width * height],
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The iteration budget the grid was computed with.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// The escape value of the pixel at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[x * self.height + y]
    }

    /// True if the pixel never escaped.
    pub fn is_bounded(&self, x: usize, y: usize) -> bool {
        self.get(x, y) >= f64::from(self.max_iterations)
    }

    /// Splits the grid into its columns, left to right.  Each slice is
    /// `height` long and no two of them overlap.
    pub fn columns_mut(&mut self) -> ChunksMut<f64> {
        self.values.chunks_mut(self.height)
    }

    /// All values, column-major.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The number of pixels that escaped.
    pub fn escaped(&self) -> usize {
        let max = f64::from(self.max_iterations);
        self.values.iter().filter(|&&v| v < max).count()
    }

    /// Tallies the grid's escape values in a single pass.  The render
    /// path fills a `HistogramAccumulator` as it goes instead; this is
    /// for grids assembled some other way.
    pub fn histogram(&self) -> Histogram {
        let mut counts = vec![0; self.max_iterations as usize];
        for &v in &self.values {
            if v >= 0.0 && v < f64::from(self.max_iterations) {
                counts[v as usize] += 1;
            }
        }
        Histogram::from_counts(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_all_bounded() {
        let grid = IterationGrid::new(3, 2, 20);
        assert_eq!(grid.values().len(), 6);
        assert_eq!(grid.escaped(), 0);
        assert!(grid.is_bounded(2, 1));
    }

    #[test]
    fn columns_are_disjoint_and_ordered() {
        let mut grid = IterationGrid::new(3, 2, 20);
        for (x, column) in grid.columns_mut().enumerate() {
            assert_eq!(column.len(), 2);
            for (y, v) in column.iter_mut().enumerate() {
                *v = (x * 10 + y) as f64;
            }
        }
        assert_eq!(grid.get(0, 1), 1.0);
        assert_eq!(grid.get(2, 0), 20.0);
        assert!(grid.is_bounded(2, 0));
        assert_eq!(grid.escaped(), 5);
    }

    #[test]
    fn histogram_counts_only_escapes() {
        let mut grid = IterationGrid::new(2, 2, 4);
        {
            let mut columns = grid.columns_mut();
            let left = columns.next().unwrap();
            left[0] = 0.0;
            left[1] = 2.5;
            let right = columns.next().unwrap();
            right[0] = 2.0;
        }
        let hist = grid.histogram();
        assert_eq!(hist.counts(), &[1, 0, 2, 0]);
        assert_eq!(hist.total(), grid.escaped());
    }
}
