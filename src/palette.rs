// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turns a finished iteration grid into colors.  Two strategies: a
//! banded gradient between randomly chosen colors, and a grayscale
//! gradient laid out by the histogram of escape times.  Either way,
//! points that never escaped are black.

use image::Rgba;
use log::{debug, trace};
use rand::Rng;

use crate::grid::IterationGrid;
use crate::histogram::Histogram;
use crate::options::Coloring;
use crate::raster::RasterBuffer;

/// The color of the set itself.
pub const INTERIOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Blends two colors, each channel on its own.  A ratio at or below
/// zero gives `from`, at or above one gives `to`.
pub fn interpolate(from: Rgba<u8>, to: Rgba<u8>, ratio: f64) -> Rgba<u8> {
    if ratio <= 0.0 {
        return from;
    }
    if ratio >= 1.0 {
        return to;
    }
    let Rgba(a) = from;
    let Rgba(b) = to;
    let mix = |i: usize| (f64::from(a[i]) + ratio * (f64::from(b[i]) - f64::from(a[i]))) as u8;
    Rgba([mix(0), mix(1), mix(2), mix(3)])
}

/// An opaque color with random red, green and blue.
pub fn random_color<R: Rng>(rng: &mut R) -> Rgba<u8> {
    Rgba([rng.gen(), rng.gen(), rng.gen(), 255])
}

/// The first iteration count covered by a band, and the color at that
/// boundary.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorBand {
    /// Lowest iteration count in the band.
    pub start: u32,
    /// Color at `start`.
    pub color: Rgba<u8>,
}

/// Equal-width iteration bands covering `[0, iterations_to_color]`.
/// Band `k` runs from `k * width` to the smaller of `(k + 1) * width`
/// and `iterations_to_color`, so when the range does not divide evenly
/// the last band is the short one.  Within a band the color slides
/// from the band's own color toward the next band's.
#[derive(Clone, Debug)]
pub struct BandedPalette {
    bands: Vec<ColorBand>,
    // Color at the top of the last band.
    end_stop: Rgba<u8>,
    band_width: u32,
    iterations_to_color: u32,
    max_iterations: u32,
}

impl BandedPalette {
    /// Lays out the bands and draws one color per boundary from `rng`.
    pub fn new<R: Rng>(
        max_iterations: u32,
        band_percent: f64,
        color_threshold: u32,
        rng: &mut R,
    ) -> Self {
        let iterations_to_color = max_iterations.min(color_threshold);
        let band_width =
            ((f64::from(iterations_to_color) * band_percent / 100.0).floor() as u32).max(1);

        let mut bands = vec![ColorBand {
            start: 0,
            color: random_color(rng),
        }];
        // Counted in u64: near u32::MAX the next start would wrap.
        let mut start = u64::from(band_width);
        while start < u64::from(iterations_to_color) {
            bands.push(ColorBand {
                start: start as u32,
                color: random_color(rng),
            });
            start += u64::from(band_width);
        }
        let end_stop = random_color(rng);

        debug!(
            "{} bands of width {} over [0, {}]",
            bands.len(),
            band_width,
            iterations_to_color
        );
        for band in &bands {
            trace!("band at {}: {:?}", band.start, band.color);
        }

        BandedPalette {
            bands,
            end_stop,
            band_width,
            iterations_to_color,
            max_iterations,
        }
    }

    /// The bands, lowest first.
    pub fn bands(&self) -> &[ColorBand] {
        &self.bands
    }

    /// The iteration width of every band but, possibly, the last.
    pub fn band_width(&self) -> u32 {
        self.band_width
    }

    /// The top of the colored range.
    pub fn iterations_to_color(&self) -> u32 {
        self.iterations_to_color
    }

    /// The inclusive iteration range of band `index`.
    pub fn band_range(&self, index: usize) -> (u32, u32) {
        let start = self.bands[index].start;
        let end = start
            .saturating_add(self.band_width)
            .min(self.iterations_to_color);
        (start, end)
    }

    /// The band containing `value`.  A value sitting on the boundary
    /// between two bands belongs to the lower one; values past the
    /// colored range belong to the last band.
    pub fn band_index(&self, value: f64) -> usize {
        let index = (value / f64::from(self.band_width)).ceil() - 1.0;
        if index <= 0.0 {
            0
        } else {
            (index as usize).min(self.bands.len() - 1)
        }
    }

    /// The color for one escape value.
    pub fn color(&self, value: f64) -> Rgba<u8> {
        if value >= f64::from(self.max_iterations) {
            return INTERIOR;
        }
        let index = self.band_index(value);
        let (start, end) = self.band_range(index);
        let next = self
            .bands
            .get(index + 1)
            .map(|band| band.color)
            .unwrap_or(self.end_stop);
        let t = if end > start {
            num::clamp(
                (value - f64::from(start)) / f64::from(end - start),
                0.0,
                1.0,
            )
        } else {
            0.0
        };
        interpolate(self.bands[index].color, next, t)
    }
}

/// Grayscale by rank: a pixel's brightness is the share of escaped
/// pixels that got out faster than it did.  The quickest escapes are
/// black, the slowest close to white.
#[derive(Debug)]
pub struct EqualizedPalette<'a> {
    histogram: &'a Histogram,
    max_iterations: u32,
    invert: bool,
}

impl<'a> EqualizedPalette<'a> {
    /// Wraps a completed histogram.
    pub fn new(histogram: &'a Histogram, max_iterations: u32, invert: bool) -> Self {
        EqualizedPalette {
            histogram,
            max_iterations,
            invert,
        }
    }

    /// Where `value` sits in the escape-time distribution, in [0, 1].
    /// A fractional value is interpolated between the positions of the
    /// counts on either side of it.
    pub fn position(&self, value: f64) -> f64 {
        let floor = value.floor();
        let low = self.histogram.below(floor as usize);
        let high = self.histogram.below(value.ceil() as usize);
        low + (high - low) * (value - floor)
    }

    /// The color for one escape value.
    pub fn color(&self, value: f64) -> Rgba<u8> {
        if value >= f64::from(self.max_iterations) || self.histogram.total() == 0 {
            return INTERIOR;
        }
        let h = self.position(value.max(0.0));
        let brightness = if self.invert { 1.0 - h } else { h };
        let g = num::clamp((brightness * 255.0).round(), 0.0, 255.0) as u8;
        Rgba([g, g, g, 255])
    }
}

/// Colors every pixel of a finished grid.  The equalized strategy uses
/// `histogram` when the render collected one, and tallies the grid
/// itself otherwise.  `rng` supplies the band colors, so a seeded
/// generator gives a reproducible image.
pub fn colorize<R: Rng>(
    grid: &IterationGrid,
    histogram: Option<&Histogram>,
    coloring: &Coloring,
    rng: &mut R,
) -> RasterBuffer {
    let max_iterations = grid.max_iterations();
    match *coloring {
        Coloring::Banded {
            band_percent,
            color_threshold,
        } => {
            let palette = BandedPalette::new(max_iterations, band_percent, color_threshold, rng);
            RasterBuffer::from_fn(grid.width(), grid.height(), |x, y| {
                palette.color(grid.get(x, y))
            })
        }
        Coloring::Equalized { invert } => {
            let tallied;
            let histogram = match histogram {
                Some(histogram) => histogram,
                None => {
                    tallied = grid.histogram();
                    &tallied
                }
            };
            debug!("equalizing over {} escaped pixels", histogram.total());
            let palette = EqualizedPalette::new(histogram, max_iterations, invert);
            RasterBuffer::from_fn(grid.width(), grid.height(), |x, y| {
                palette.color(grid.get(x, y))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn palette(max: u32, pct: f64, threshold: u32) -> BandedPalette {
        BandedPalette::new(max, pct, threshold, &mut StdRng::seed_from_u64(42))
    }

    #[test]
    fn interpolate_clamps_and_blends_each_channel() {
        let a = Rgba([0, 100, 200, 255]);
        let b = Rgba([100, 100, 0, 55]);
        assert_eq!(interpolate(a, b, -0.5), a);
        assert_eq!(interpolate(a, b, 1.5), b);
        assert_eq!(interpolate(a, b, 0.5), Rgba([50, 100, 100, 155]));
    }

    #[test]
    fn band_layout_covers_range_from_zero() {
        let p = palette(1000, 1.0, 1000);
        assert_eq!(p.band_width(), 10);
        assert_eq!(p.bands().len(), 100);
        assert_eq!(p.bands()[0].start, 0);
        for (a, b) in p.bands().iter().tuple_windows() {
            assert_eq!(b.start - a.start, 10);
        }
        assert_eq!(p.band_range(99), (990, 1000));
    }

    #[test]
    fn threshold_limits_the_colored_range() {
        let p = palette(5000, 10.0, 300);
        assert_eq!(p.iterations_to_color(), 300);
        assert_eq!(p.band_width(), 30);
        assert_eq!(p.bands().len(), 10);
    }

    #[test]
    fn uneven_range_leaves_a_short_last_band() {
        let p = palette(105, 10.0, 1000);
        assert_eq!(p.band_width(), 10);
        assert_eq!(p.bands().len(), 11);
        assert_eq!(p.band_range(10), (100, 105));
    }

    #[test]
    fn huge_ranges_do_not_overflow_band_starts() {
        let p = palette(u32::max_value(), 60.0, u32::max_value());
        assert_eq!(p.bands().len(), 2);
        assert_eq!(p.bands()[1].start, p.band_width());
        assert_eq!(p.band_range(1), (p.band_width(), u32::max_value()));
        let top = f64::from(u32::max_value()) - 1.0;
        assert_eq!(p.band_index(top), 1);
    }

    #[test]
    fn every_count_falls_in_exactly_one_band() {
        for &(max, pct) in &[(100, 1.0), (105, 10.0), (7, 50.0), (1, 1.0), (333, 3.0)] {
            let p = palette(max, pct, max);
            for n in 0..=p.iterations_to_color() {
                let index = p.band_index(f64::from(n));
                let (start, end) = p.band_range(index);
                assert!(start <= n && n <= end, "{} not in band {}", n, index);
                // Shared boundaries go to the lower band.
                if index > 0 {
                    assert!(n > start, "{} should belong to band {}", n, index - 1);
                }
            }
        }
    }

    #[test]
    fn band_edges_take_the_boundary_colors() {
        let p = palette(100, 10.0, 100);
        assert_eq!(p.color(0.0), p.bands()[0].color);
        assert_eq!(p.color(10.0), p.bands()[1].color);
        assert_eq!(p.color(20.0), p.bands()[2].color);
    }

    #[test]
    fn bounded_pixels_are_black() {
        let p = palette(100, 10.0, 100);
        assert_eq!(p.color(100.0), INTERIOR);
        let hist = Histogram::from_counts(vec![3; 100]);
        let eq = EqualizedPalette::new(&hist, 100, false);
        assert_eq!(eq.color(100.0), INTERIOR);
    }

    #[test]
    fn same_seed_gives_same_bands() {
        let a = palette(500, 2.0, 500);
        let b = palette(500, 2.0, 500);
        assert_eq!(a.bands(), b.bands());
    }

    #[test]
    fn equalized_gray_follows_rank() {
        let hist = Histogram::from_counts(vec![2, 0, 2, 0]);
        let eq = EqualizedPalette::new(&hist, 4, false);
        assert_eq!(eq.color(0.0), Rgba([0, 0, 0, 255]));
        assert_eq!(eq.color(2.0), Rgba([128, 128, 128, 255]));
        assert_eq!(eq.color(3.0), Rgba([255, 255, 255, 255]));
        // Halfway between counts 2 and 3.
        assert_eq!(eq.position(2.5), 0.75);

        let inverted = EqualizedPalette::new(&hist, 4, true);
        assert_eq!(inverted.color(0.0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn empty_histogram_colors_black() {
        let hist = Histogram::from_counts(vec![0; 10]);
        let eq = EqualizedPalette::new(&hist, 10, true);
        assert_eq!(eq.color(3.0), INTERIOR);
    }

    #[test]
    fn colorize_tallies_the_grid_when_no_histogram_is_given() {
        let mut grid = IterationGrid::new(2, 1, 4);
        grid.columns_mut().next().unwrap()[0] = 1.0;
        let mut rng = StdRng::seed_from_u64(1);
        let raster = colorize(
            &grid,
            None,
            &Coloring::Equalized { invert: true },
            &mut rng,
        );
        assert_eq!(raster.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(raster.get_pixel(1, 0), INTERIOR);
    }
}
