use super::{Color, ColorFormat, Error};

/// A rectangular grid of colors stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Image {
    /// Creates a `width` x `height` image filled with `fill`.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize, fill: Color) -> Image {
        let Ok(len) = area(width, height, 1) else {
            panic!("image dimensions {}x{} overflow", width, height);
        };
        Image {
            width,
            height,
            pixels: vec![fill; len],
        }
    }

    /// Wraps row-major `pixels`. The length must be exactly `width * height`.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Color>) -> Result<Image, Error> {
        let expected = area(width, height, 1)?;
        if pixels.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Image {
            width,
            height,
            pixels,
        })
    }

    /// Decodes an interleaved byte buffer laid out as `color_format`.
    ///
    /// Formats without an alpha channel produce opaque pixels.
    pub fn from_raw(
        bytes: &[u8],
        width: usize,
        height: usize,
        color_format: ColorFormat,
    ) -> Result<Image, Error> {
        let channels = color_format.channels();
        let expected = area(width, height, channels)?;
        if bytes.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }

        let pixels = bytes
            .chunks_exact(channels)
            .map(|chunk| {
                let (r, g, b, a) = color_format.color_parts(chunk);
                Color::new(r, g, b, a)
            })
            .collect();

        Ok(Image {
            width,
            height,
            pixels,
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

    /// Returns `true` if the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Returns the pixel at (`x`, `y`), or `None` outside the image.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Overwrites the pixel at (`x`, `y`). Returns `false` and leaves the
    /// image untouched when the position lies outside the image.
    pub fn set(&mut self, x: usize, y: usize, color: Color) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    /// Interleaved RGBA bytes, ready for an encoder.
    pub fn into_raw(self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for c in self.pixels {
            bytes.extend_from_slice(&[c.r, c.g, c.b, c.a]);
        }
        bytes
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }
}

/// Number of elements in a `width` x `height` buffer with `channels` per pixel.
fn area(width: usize, height: usize, channels: usize) -> Result<usize, Error> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(Error::Dimensions { width, height })
}
