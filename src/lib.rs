// Copyright 2017, Reizner Evgeniy <razrfalcon@gmail.com>.
// See the COPYRIGHT file at the top-level directory of this distribution.
// Licensed under the MIT license, see the LICENSE file or <http://opensource.org/licenses/MIT>

//! *palette-dither* reduces an RGBA image to a small palette and re-renders
//! the image using only that palette.
//!
//! The palette is built by k-means clustering of the image's colors under a
//! redmean distance. The image is then either remapped pixel by pixel to the
//! nearest palette entry or dithered with Floyd-Steinberg error diffusion.
//!
//! Decoding and encoding image files is left to the caller: pixels come in as
//! an [`Image`], either built directly or from a raw buffer in one of the
//! [`ColorFormat`] layouts.
//!
//! ```
//! use palette_dither::{Color, Image, KMeans, Mode};
//!
//! let pixels = (0..64u8).map(|i| Color::new(i * 4, 255 - i * 4, 128, 255)).collect();
//! let image = Image::from_pixels(8, 8, pixels).unwrap();
//! let out = palette_dither::quantize(&image, 4, Mode::Dither, &KMeans::with_seed(1)).unwrap();
//! assert_eq!(out.palette.len(), 4);
//! assert_eq!(out.image.width(), 8);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod image;
mod kmeans;
mod nearest;
mod recolor;

use std::str::FromStr;
use thiserror::Error;

pub use image::Image;
pub use kmeans::{DEFAULT_MAX_ITERATIONS, KMeans, KMeansError, build_palette};
pub use nearest::{distance, nearest};
pub use recolor::{Mode, ModeParseError, Quantized, dither, quantize, remap};

pub use rgb::RGBA8 as Color;

/// Represent a color format of an underlying image data.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ColorFormat {
    /// Red, Green, Blue color format.
    Rgb,
    /// Red, Green, Blue, Alpha color format.
    Rgba,
    /// Alpha, Red, Green, Blue color format.
    Argb,
    /// Blue, Green, Red color format.
    Bgr,
    /// Blue, Green, Red, Alpha color format.
    Bgra,
}

impl ColorFormat {
    /// Returns the number of channels in a color format.
    pub fn channels(&self) -> usize {
        match self {
            ColorFormat::Rgb => 3,
            ColorFormat::Rgba => 4,
            ColorFormat::Argb => 4,
            ColorFormat::Bgr => 3,
            ColorFormat::Bgra => 4,
        }
    }

    /// Splits one pixel's bytes into `(r, g, b, a)`.
    fn color_parts(&self, px: &[u8]) -> (u8, u8, u8, u8) {
        match self {
            ColorFormat::Rgb => (px[0], px[1], px[2], 255),
            ColorFormat::Rgba => (px[0], px[1], px[2], px[3]),
            ColorFormat::Argb => (px[1], px[2], px[3], px[0]),
            ColorFormat::Bgr => (px[2], px[1], px[0], 255),
            ColorFormat::Bgra => (px[2], px[1], px[0], px[3]),
        }
    }
}

/// Represents an error for invalid input when parsing a color format
#[derive(Debug, Error)]
#[error("invalid color format")]
pub struct ColorParseError;

impl FromStr for ColorFormat {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<ColorFormat, Self::Err> {
        const VARIANTS: &[(&str, ColorFormat)] = &[
            ("rgb", ColorFormat::Rgb),
            ("rgba", ColorFormat::Rgba),
            ("argb", ColorFormat::Argb),
            ("bgr", ColorFormat::Bgr),
            ("bgra", ColorFormat::Bgra),
        ];

        VARIANTS
            .iter()
            .find(|(name, _)| s.eq_ignore_ascii_case(name))
            .map(|(_, fmt)| *fmt)
            .ok_or(ColorParseError)
    }
}

/// Represents an error that can occur while building a palette or recoloring
/// an image.
///
/// Every variant is a precondition violation detected before any output is
/// produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// A palette with no entries was supplied.
    #[error("palette is empty")]
    EmptyPalette,
    /// The palette builder rejected its arguments.
    #[error(transparent)]
    KMeans(#[from] KMeansError),
    /// A pixel buffer does not match the requested dimensions.
    #[error("expected a buffer of {expected} elements, got {actual}")]
    BufferSize {
        /// Length implied by the dimensions.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// The image dimensions are too large to address.
    #[error("image dimensions {width}x{height} overflow")]
    Dimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
}

impl Error {
    /// Returns `true` if the error is caused by an invalid argument.
    ///
    /// That holds for every current variant. Nothing in this crate does I/O,
    /// so there are no transient failures worth retrying.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Error::EmptyPalette
            | Error::KMeans(_)
            | Error::BufferSize { .. }
            | Error::Dimensions { .. } => true,
        }
    }
}

/// A source of palettes for [`quantize`].
///
/// [`KMeans`] is the built-in implementation. Anything that can turn a set of
/// colors into `k` representatives can stand in for it.
pub trait PaletteGenerator {
    /// Returns a palette of `k` colors representing `colors`.
    fn generate_palette(&self, colors: &[Color], k: usize) -> Result<Vec<Color>, Error>;
}
