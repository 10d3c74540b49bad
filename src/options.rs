// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The knobs and dials of a render that are not part of the request
//! itself: how hard to iterate, how to color, and how many threads to
//! throw at it.  Once set, these should not be mutated mid-render.

use crate::error::RenderError;

/// How iteration counts are turned into colors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Coloring {
    /// Equal-sized iteration bands with random colors at each
    /// boundary, linearly interpolated within a band.
    Banded {
        /// The width of one band as a percentage of the colorable
        /// range.
        band_percent: f64,
        /// Iteration counts above this all share the last band's top
        /// color.
        color_threshold: u32,
    },
    /// A grayscale gradient laid out by the histogram of escape times,
    /// so that every shade is used by roughly the same number of
    /// pixels.
    Equalized {
        /// Brighten the fast escapes and darken the slow ones instead.
        invert: bool,
    },
}

impl Default for Coloring {
    fn default() -> Self {
        Coloring::Banded {
            band_percent: 1.0,
            color_threshold: 1000,
        }
    }
}

/// Everything about a render other than the request.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    /// The iteration budget per pixel.  A pixel that survives this many
    /// iterations is considered inside the set.
    pub max_iterations: u32,
    /// The color-mapping strategy.
    pub coloring: Coloring,
    /// Use the fractional escape time instead of the integral one.
    pub smooth: bool,
    /// The number of worker threads in the column pool.
    pub threads: usize,
    /// Fixes the random band colors.  None draws a fresh palette every
    /// render.
    pub seed: Option<u64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            max_iterations: 1000,
            coloring: Coloring::default(),
            smooth: false,
            threads: num_cpus::get(),
            seed: None,
        }
    }
}

impl RenderOptions {
    /// Sets the per-pixel iteration budget.
    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the coloring strategy.
    pub fn coloring(mut self, coloring: Coloring) -> Self {
        self.coloring = coloring;
        self
    }

    /// Turns smoothing on or off.
    pub fn smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    /// Sets the size of the worker pool.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Fixes the palette seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Refuses option sets that would make a render meaningless.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.max_iterations == 0 {
            return Err(RenderError::invalid("max_iterations must be positive"));
        }
        if self.threads == 0 {
            return Err(RenderError::invalid("thread count must be positive"));
        }
        if let Coloring::Banded { band_percent, .. } = self.coloring {
            if !(band_percent.is_finite() && band_percent > 0.0) {
                return Err(RenderError::invalid(format!(
                    "band percentage must be positive, got {}",
                    band_percent
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = RenderOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.max_iterations, 1000);
        assert!(options.threads >= 1);
    }

    #[test]
    fn builder_sets_fields() {
        let options = RenderOptions::default()
            .max_iterations(50)
            .threads(3)
            .smooth(true)
            .seed(7)
            .coloring(Coloring::Equalized { invert: true });
        assert_eq!(options.max_iterations, 50);
        assert_eq!(options.threads, 3);
        assert!(options.smooth);
        assert_eq!(options.seed, Some(7));
        assert_eq!(options.coloring, Coloring::Equalized { invert: true });
    }

    #[test]
    fn zero_iterations_and_threads_are_refused() {
        assert!(RenderOptions::default().max_iterations(0).validate().is_err());
        assert!(RenderOptions::default().threads(0).validate().is_err());
    }

    #[test]
    fn bad_band_percentages_are_refused() {
        for &pct in &[0.0, -1.0, std::f64::NAN] {
            let options = RenderOptions::default().coloring(Coloring::Banded {
                band_percent: pct,
                color_threshold: 100,
            });
            assert!(options.validate().is_err());
        }
    }
}
