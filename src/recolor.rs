use super::nearest::nearest_index;
use super::{Color, Error, Image, PaletteGenerator};
use log::debug;
use rayon::prelude::*;
use std::str::FromStr;

/// How an image is re-rendered once a palette is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every pixel is replaced by its nearest palette entry, alpha included.
    Remap,
    /// Floyd-Steinberg error diffusion. Source alpha is kept.
    Dither,
}

/// Represents an error for invalid input when parsing a [`Mode`].
#[derive(Debug, thiserror::Error)]
#[error("invalid recolor mode")]
pub struct ModeParseError;

impl FromStr for Mode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Mode, Self::Err> {
        const VARIANTS: &[(&str, Mode)] = &[
            ("remap", Mode::Remap),
            ("nearest", Mode::Remap),
            ("dither", Mode::Dither),
            ("floyd-steinberg", Mode::Dither),
        ];

        VARIANTS
            .iter()
            .find(|(name, _)| s.eq_ignore_ascii_case(name))
            .map(|(_, mode)| *mode)
            .ok_or(ModeParseError)
    }
}

/// Result of [`quantize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quantized {
    /// The recolored image.
    pub image: Image,
    /// The palette it was recolored with.
    pub palette: Vec<Color>,
}

/// Floyd-Steinberg weights as (dx, dy, fraction).
///
/// ```text
///        X   7
///    3   5   1
/// ```
const FLOYD_STEINBERG: [(isize, isize, f64); 4] = [
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

/// Replaces every pixel with its nearest palette entry.
///
/// The output takes its alpha from the matched palette entry, not from the
/// source pixel.
pub fn remap(image: &Image, palette: &[Color]) -> Result<Image, Error> {
    if palette.is_empty() {
        return Err(Error::EmptyPalette);
    }

    let mut out = image.clone();
    let width = out.width().max(1);
    out.pixels_mut()
        .par_chunks_mut(width)
        .for_each(|row| {
            for px in row.iter_mut() {
                *px = palette[nearest_index(px, palette)];
            }
        });
    Ok(out)
}

/// Re-renders `image` with Floyd-Steinberg error diffusion.
///
/// Pixels are visited top to bottom and left to right. Quantization error is
/// pushed into the not yet visited neighbors of the output, so every pixel is
/// matched against its source value plus the error it has received. Output
/// pixels keep the alpha of the source image.
pub fn dither(image: &Image, palette: &[Color]) -> Result<Image, Error> {
    if palette.is_empty() {
        return Err(Error::EmptyPalette);
    }

    let width = image.width();
    let mut out = image.clone();
    for y in 0..image.height() {
        for x in 0..width {
            let i = y * width + x;
            let old = out.pixels()[i];
            let alpha = image.pixels()[i].a;
            let matched = palette[nearest_index(&old, palette)];
            out.pixels_mut()[i] = Color::new(matched.r, matched.g, matched.b, alpha);

            diffuse_error(&mut out, x, y, quantization_error(old, matched));
        }
    }
    Ok(out)
}

/// Distributes the error of pixel (`x`, `y`) over its neighbors with the
/// Floyd-Steinberg weights.
fn diffuse_error(img: &mut Image, x: usize, y: usize, error: (i32, i32, i32)) {
    for &(dx, dy, factor) in &FLOYD_STEINBERG {
        spread_error(img, x as isize + dx, y as isize + dy, error, factor);
    }
}

/// Per-channel `old - new` for red, green and blue.
pub(crate) fn quantization_error(old: Color, new: Color) -> (i32, i32, i32) {
    (
        old.r as i32 - new.r as i32,
        old.g as i32 - new.g as i32,
        old.b as i32 - new.b as i32,
    )
}

/// Adds `error * factor` to the pixel at (`x`, `y`), clamping each channel.
/// Positions outside the image are ignored. Alpha is left alone.
pub(crate) fn spread_error(
    img: &mut Image,
    x: isize,
    y: isize,
    (r_err, g_err, b_err): (i32, i32, i32),
    factor: f64,
) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    let Some(current) = img.get(x, y) else {
        return;
    };

    let adjust = |channel: u8, error: i32| -> u8 {
        ((channel as f64 + error as f64 * factor) as i32).clamp(0, 255) as u8
    };
    img.set(
        x,
        y,
        Color::new(
            adjust(current.r, r_err),
            adjust(current.g, g_err),
            adjust(current.b, b_err),
            current.a,
        ),
    );
}

/// Builds a palette of `max_colors` entries from the image's own colors and
/// re-renders the image with it.
///
/// A zero-area image has nothing to cluster and comes back unchanged with an
/// empty palette.
pub fn quantize<G>(
    image: &Image,
    max_colors: usize,
    mode: Mode,
    generator: &G,
) -> Result<Quantized, Error>
where
    G: PaletteGenerator + ?Sized,
{
    if max_colors == 0 {
        return Err(super::KMeansError::ZeroClusters.into());
    }
    if image.is_empty() {
        return Ok(Quantized {
            image: image.clone(),
            palette: Vec::new(),
        });
    }

    let palette = generator.generate_palette(image.pixels(), max_colors)?;
    debug!(
        "recoloring {}x{} image with {} colors ({:?})",
        image.width(),
        image.height(),
        palette.len(),
        mode
    );

    let image = match mode {
        Mode::Remap => remap(image, &palette)?,
        Mode::Dither => dither(image, &palette)?,
    };
    Ok(Quantized { image, palette })
}
