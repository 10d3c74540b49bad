// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The renderer: fans the columns of the image out over a pool of
//! scoped threads, waits for all of them, then colors the result.

use std::iter::Enumerate;
use std::slice::ChunksMut;
use std::sync::{Arc, Mutex};

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::RenderError;
use crate::escape::{escape_time, smooth_escape_time};
use crate::grid::IterationGrid;
use crate::histogram::{Histogram, HistogramAccumulator};
use crate::options::{Coloring, RenderOptions};
use crate::palette::colorize;
use crate::planes::{Pixel, RenderRequest, Viewport};
use crate::raster::RasterBuffer;

type ColumnQueue<'a> = Arc<Mutex<Enumerate<ChunksMut<'a, f64>>>>;

/// A request and its options, checked and ready to go.  Once built it
/// is not mutated; every call to `render` is independent of the last.
#[derive(Debug)]
pub struct Renderer {
    viewport: Viewport,
    request: RenderRequest,
    options: RenderOptions,
}

impl Renderer {
    /// Validates the options and sets up the viewport for `request`.
    pub fn new(request: RenderRequest, options: RenderOptions) -> Result<Self, RenderError> {
        options.validate()?;
        Ok(Renderer {
            viewport: Viewport::new(&request),
            request,
            options,
        })
    }

    /// The request being rendered.
    pub fn request(&self) -> &RenderRequest {
        &self.request
    }

    /// The options in force.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn wants_histogram(&self) -> bool {
        match self.options.coloring {
            Coloring::Equalized { .. } => true,
            Coloring::Banded { .. } => false,
        }
    }

    /// The escape value of a single pixel.
    fn evaluate(&self, pixel: &Pixel) -> f64 {
        let point = self.viewport.pixel_to_point(pixel);
        if self.options.smooth {
            smooth_escape_time(point, self.options.max_iterations)
        } else {
            f64::from(escape_time(point, self.options.max_iterations))
        }
    }

    /// Fills one column of the grid.  The slice belongs to this column
    /// and nothing else.
    fn fill_column(
        &self,
        x: usize,
        column: &mut [f64],
        histogram: Option<&HistogramAccumulator>,
    ) {
        for (y, value) in column.iter_mut().enumerate() {
            *value = self.evaluate(&Pixel(x, y));
            if let Some(histogram) = histogram {
                histogram.record(*value);
            }
        }
    }

    // Never more workers than columns or cores.
    fn thread_count(&self) -> usize {
        self.options
            .threads
            .min(self.request.width())
            .min(num_cpus::get())
            .max(1)
    }

    /// The single-threaded version of `iterate`, column by column on
    /// the calling thread.
    pub fn iterate_single(&self) -> (IterationGrid, Option<Histogram>) {
        let mut grid = IterationGrid::new(
            self.request.width(),
            self.request.height(),
            self.options.max_iterations,
        );
        let histogram = if self.wants_histogram() {
            Some(HistogramAccumulator::new(self.options.max_iterations))
        } else {
            None
        };
        for (x, column) in grid.columns_mut().enumerate() {
            self.fill_column(x, column, histogram.as_ref());
        }
        (grid, histogram.map(|h| h.snapshot()))
    }

    /// Computes the escape value of every pixel.  Each worker takes the
    /// next unclaimed column off a shared queue until there are none
    /// left; the scope does not return until every worker has joined,
    /// so the grid handed back is always complete.
    pub fn iterate(&self) -> Result<(IterationGrid, Option<Histogram>), RenderError> {
        let mut grid = IterationGrid::new(
            self.request.width(),
            self.request.height(),
            self.options.max_iterations,
        );
        let histogram = if self.wants_histogram() {
            Some(HistogramAccumulator::new(self.options.max_iterations))
        } else {
            None
        };
        let threads = self.thread_count();
        debug!(
            "iterating {}x{} on {} threads",
            self.request.width(),
            self.request.height(),
            threads
        );

        {
            let columns: ColumnQueue = Arc::new(Mutex::new(grid.columns_mut().enumerate()));
            let histogram = histogram.as_ref();
            crossbeam::scope(|spawner| {
                for _ in 0..threads {
                    let columns = columns.clone();
                    spawner.spawn(move |_| loop {
                        let column = match columns.lock() {
                            Ok(mut queue) => queue.next(),
                            Err(_) => break,
                        };
                        match column {
                            Some((x, column)) => self.fill_column(x, column, histogram),
                            None => break,
                        }
                    });
                }
            })
            .map_err(|_| RenderError::WorkerPanic)?;
        }

        let histogram = histogram.map(|h| h.snapshot());
        if let Some(ref h) = histogram {
            debug!("{} of {} pixels escaped", h.total(), self.viewport.len());
        }
        Ok((grid, histogram))
    }

    /// Renders and colors the image.  The band colors come from the
    /// configured seed, or from fresh entropy when there is none.
    pub fn render(&self) -> Result<RasterBuffer, RenderError> {
        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.render_with(&mut rng)
    }

    /// Renders and colors the image, drawing band colors from `rng`.
    pub fn render_with<R: Rng>(&self, rng: &mut R) -> Result<RasterBuffer, RenderError> {
        let (grid, histogram) = self.iterate()?;
        debug!("coloring with {:?}", self.options.coloring);
        Ok(colorize(
            &grid,
            histogram.as_ref(),
            &self.options.coloring,
            rng,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::Complex;

    fn renderer(width: usize, height: usize, options: RenderOptions) -> Renderer {
        let request = RenderRequest::new(width, height, 1.0, Complex::new(-0.5, 0.0)).unwrap();
        Renderer::new(request, options).unwrap()
    }

    #[test]
    fn renderer_refuses_bad_options() {
        let request = RenderRequest::new(4, 4, 1.0, Complex::new(0.0, 0.0)).unwrap();
        let options = RenderOptions::default().max_iterations(0);
        assert!(Renderer::new(request, options).is_err());
    }

    #[test]
    fn threaded_matches_single() {
        for &threads in &[1, 2, 3, 8] {
            let options = RenderOptions::default()
                .max_iterations(200)
                .threads(threads)
                .coloring(Coloring::Equalized { invert: false });
            let r = renderer(37, 23, options);
            let (single, single_hist) = r.iterate_single();
            let (threaded, threaded_hist) = r.iterate().unwrap();
            assert_eq!(single, threaded);
            assert_eq!(single_hist, threaded_hist);
        }
    }

    #[test]
    fn histogram_matches_escaped_pixels() {
        let options = RenderOptions::default()
            .max_iterations(100)
            .threads(4)
            .coloring(Coloring::Equalized { invert: false });
        let r = renderer(64, 48, options);
        let (grid, hist) = r.iterate().unwrap();
        let hist = hist.unwrap();
        assert_eq!(hist.total(), grid.escaped());
        assert!(hist.total() <= 64 * 48);
        assert_eq!(hist, grid.histogram());
    }

    #[test]
    fn banded_render_skips_the_histogram() {
        let r = renderer(8, 8, RenderOptions::default().max_iterations(20));
        let (_, hist) = r.iterate().unwrap();
        assert!(hist.is_none());
    }

    #[test]
    fn more_threads_than_columns_is_fine() {
        let r = renderer(3, 50, RenderOptions::default().max_iterations(50).threads(16));
        assert!(r.thread_count() <= 3);
        assert!(r.thread_count() <= num_cpus::get());
        assert_eq!(r.thread_count(), 3.min(num_cpus::get()));
        let (grid, _) = r.iterate().unwrap();
        assert_eq!(grid.values().len(), 150);
    }

    #[test]
    fn pool_never_exceeds_the_cores() {
        let r = renderer(500, 2, RenderOptions::default().max_iterations(30).threads(400));
        assert!(r.thread_count() >= 1);
        assert!(r.thread_count() <= num_cpus::get());
        let (grid, _) = r.iterate().unwrap();
        assert_eq!(grid.values().len(), 1000);
    }

    #[test]
    fn smoothed_grid_stays_in_range() {
        let options = RenderOptions::default().max_iterations(80).smooth(true);
        let r = renderer(20, 20, options);
        let (grid, _) = r.iterate().unwrap();
        assert!(grid.values().iter().all(|&v| v >= 0.0 && v <= 80.0));
        assert!(grid.values().iter().any(|&v| v.fract() != 0.0));
    }
}
