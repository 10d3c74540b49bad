// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The finished image: width × height RGBA pixels, row-major, four
//! bytes apiece.  This is what gets handed to whatever encodes it.

use image::{Rgba, RgbaImage};
use itertools::iproduct;

/// Bytes per pixel.
const CHANNELS: usize = 4;

/// A completed raster.  Owned by whoever asked for the render; nothing
/// in the crate holds on to it afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RasterBuffer {
    /// Builds a raster by asking `color` for each pixel, row by row.
    pub fn from_fn<F>(width: usize, height: usize, mut color: F) -> Self
    where
        F: FnMut(usize, usize) -> Rgba<u8>,
    {
        let mut pixels = Vec::with_capacity(width * height * CHANNELS);
        for (y, x) in iproduct!(0..height, 0..width) {
            let Rgba(channels) = color(x, y);
            pixels.extend_from_slice(&channels);
        }
        RasterBuffer {
            width,
            height,
            pixels,
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

    /// The number of pixels.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// True if the raster holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The color at column `x`, row `y`.
    pub fn get_pixel(&self, x: usize, y: usize) -> Rgba<u8> {
        let offset = (y * self.width + x) * CHANNELS;
        let p = &self.pixels[offset..offset + CHANNELS];
        Rgba([p[0], p[1], p[2], p[3]])
    }

    /// Every pixel, row-major.
    pub fn pixels<'a>(&'a self) -> impl Iterator<Item = Rgba<u8>> + 'a {
        self.pixels
            .chunks(CHANNELS)
            .map(|p| Rgba([p[0], p[1], p[2], p[3]]))
    }

    /// The flat RGBA bytes, ready for an encoder.
    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    /// Hands the pixels over to the `image` crate without copying them.
    pub fn into_image(self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width as u32, self.height as u32, self.pixels)
    }
}
