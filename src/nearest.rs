use super::{Color, Error};

/// Redmean-weighted color difference. Alpha does not take part.
///
/// A cheap approximation of perceptual distance that weights the red and
/// blue channels by the average redness of the two colors.
#[inline]
pub fn distance(c1: &Color, c2: &Color) -> f64 {
    let rmean = (c1.r as f64 + c2.r as f64) / 2.0;
    let dr = c1.r as f64 - c2.r as f64;
    let dg = c1.g as f64 - c2.g as f64;
    let db = c1.b as f64 - c2.b as f64;
    (((512.0 + rmean) * dr * dr) / 256.0 + 4.0 * dg * dg + ((767.0 - rmean) * db * db) / 256.0)
        .sqrt()
}

/// Returns the palette entry closest to `color`.
///
/// On equal distances the entry that comes first in `palette` wins.
pub fn nearest(color: Color, palette: &[Color]) -> Result<Color, Error> {
    if palette.is_empty() {
        return Err(Error::EmptyPalette);
    }
    Ok(palette[nearest_index(&color, palette)])
}

/// Index of the closest entry. `palette` must not be empty.
pub(crate) fn nearest_index(color: &Color, palette: &[Color]) -> usize {
    debug_assert!(!palette.is_empty());

    let mut min_dist = f64::MAX;
    let mut best = 0;
    for (i, candidate) in palette.iter().enumerate() {
        let dist = distance(color, candidate);
        if dist < min_dist {
            min_dist = dist;
            best = i;
        }
    }
    best
}
