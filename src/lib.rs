#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane for
//! which repeatedly squaring `z` and adding `c` back, starting from
//! zero, never runs off to infinity.  Every pixel of the image is
//! mapped to such a point, and we count how many rounds it takes the
//! orbit to leave the disc of radius 2.  That count, the "escape
//! time", is what gets colored; points that never leave within the
//! iteration budget are the set itself, and are painted black.
//!
//! Rendering happens in two phases.  First the columns of the image
//! are shared out across a pool of threads, each column computed by
//! exactly one of them, and the histogram of escape times collected
//! along the way if the coloring needs it.  Once every thread has
//! finished, the completed grid is turned into RGBA pixels, either as
//! a gradient between randomly chosen band colors or as a grayscale
//! ramp equalized by the histogram.
//!
//! ```no_run
//! use mandelbrot::{render_image, RenderOptions};
//!
//! let options = RenderOptions::default().max_iterations(500).seed(7);
//! let raster = render_image(800, 600, 1.0, -0.5, 0.0, &options).unwrap();
//! assert_eq!(raster.len(), 800 * 600);
//! ```

#[macro_use]
extern crate failure;

pub mod error;
pub mod escape;
pub mod grid;
pub mod histogram;
pub mod options;
pub mod palette;
pub mod planes;
pub mod raster;
pub mod render;

use num::Complex;

pub use crate::error::RenderError;
pub use crate::escape::{escape_time, smooth_escape_time};
pub use crate::grid::IterationGrid;
pub use crate::histogram::{Histogram, HistogramAccumulator};
pub use crate::options::{Coloring, RenderOptions};
pub use crate::palette::{colorize, interpolate, BandedPalette, ColorBand, EqualizedPalette};
pub use crate::planes::{map_pixel, Pixel, RenderRequest, Viewport};
pub use crate::raster::RasterBuffer;
pub use crate::render::Renderer;

/// Renders a `width` × `height` image centered on
/// `center_x + center_y·i`, `zoom` times closer than the default
/// framing.  Fails only if the request or the options make no sense;
/// a valid request always produces a complete raster.
pub fn render_image(
    width: usize,
    height: usize,
    zoom: f64,
    center_x: f64,
    center_y: f64,
    options: &RenderOptions,
) -> Result<RasterBuffer, RenderError> {
    let request = RenderRequest::new(width, height, zoom, Complex::new(center_x, center_y))?;
    Renderer::new(request, options.clone())?.render()
}
