// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the RenderRequest and the Viewport, which together describe
//! a relationship between a rectangle on the integral plane with an
//! origin at 0,0, and a rectangle on the complex plane centered on an
//! arbitrary point and scaled by a zoom factor.
use num::Complex;

use crate::error::RenderError;

/// Half the side of the square the base framing always shows.  The
/// whole escape disc, radius 2, fits in the shorter side of the image
/// at a zoom of 1.
const BASE_RADIUS: f64 = 2.0;

/// Describes the x, y of a pixel on the integral plane.  The origin is
/// the left-upper corner of the image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// What the caller wants rendered: how big the image is, and which
/// part of the complex plane it should show.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderRequest {
    width: usize,
    height: usize,
    zoom: f64,
    center: Complex<f64>,
}

impl RenderRequest {
    /// Validates and builds a request.  Nothing downstream re-checks
    /// these, so a zero dimension or a silly zoom is refused here.
    pub fn new(
        width: usize,
        height: usize,
        zoom: f64,
        center: Complex<f64>,
    ) -> Result<RenderRequest, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::invalid(format!(
                "image dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(RenderError::invalid(format!(
                "zoom must be a positive number, got {}",
                zoom
            )));
        }
        if !(center.re.is_finite() && center.im.is_finite()) {
            return Err(RenderError::invalid("center must be a finite point"));
        }
        Ok(RenderRequest {
            width,
            height,
            zoom,
            center,
        })
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Magnification relative to the base framing.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// The point of the complex plane at the middle of the image.
    pub fn center(&self) -> Complex<f64> {
        self.center
    }
}

/// Maps pixels on the integral plane to points on the complex plane
/// for one request.  The pixel at (width/2, height/2) lands exactly on
/// the request's center, and every pixel spans the same distance in
/// both directions, so circles stay circles.
#[derive(Debug)]
pub struct Viewport {
    width: usize,
    height: usize,
    center: Complex<f64>,
    // The distance on the complex plane covered by one pixel.
    scale: f64,
}

impl Viewport {
    /// Builds the mapping for a validated request.
    pub fn new(request: &RenderRequest) -> Viewport {
        let short_side = request.width.min(request.height) as f64;
        Viewport {
            width: request.width,
            height: request.height,
            center: request.center,
            scale: (2.0 * BASE_RADIUS) / (request.zoom * short_side),
        }
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// True if the viewport covers no pixels.  A validated request
    /// always has at least one, so this is false for any `Viewport`
    /// built from a `RenderRequest`.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The distance on the complex plane between neighbouring pixels.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Given a pixel on the integral cartesian plane, map it to the
    /// corresponding point on the complex cartesian plane.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            self.center.re + (pixel.0 as f64 - self.width as f64 / 2.0) * self.scale,
            self.center.im + (pixel.1 as f64 - self.height as f64 / 2.0) * self.scale,
        )
    }

    /// Given a point on the complex plane, find the pixel it falls in,
    /// or None if it is outside the image.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let left = (point.re - self.center.re) / self.scale + self.width as f64 / 2.0;
        let top = (point.im - self.center.im) / self.scale + self.height as f64 / 2.0;
        if left < 0.0 || top < 0.0 {
            return None;
        }
        let pixel = Pixel(left.floor() as usize, top.floor() as usize);
        if pixel.0 >= self.width || pixel.1 >= self.height {
            return None;
        }
        Some(pixel)
    }
}

/// One-shot form of `Viewport::pixel_to_point`, for callers that only
/// need a single point and have already validated their dimensions.
pub fn map_pixel(
    px: usize,
    py: usize,
    width: usize,
    height: usize,
    zoom: f64,
    center: Complex<f64>,
) -> Result<Complex<f64>, RenderError> {
    let request = RenderRequest::new(width, height, zoom, center)?;
    Ok(Viewport::new(&request).pixel_to_point(&Pixel(px, py)))
}
