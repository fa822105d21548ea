extern crate image;
extern crate palette_dither;

use palette_dither::{Color, ColorFormat, Error, Image, KMeans, KMeansError, Mode};

fn to_image(img: image::DynamicImage) -> Image {
    let ((width, height), buffer, color_format) = match img {
        image::DynamicImage::ImageRgb8(buffer) => {
            (buffer.dimensions(), buffer.into_raw(), ColorFormat::Rgb)
        }
        image::DynamicImage::ImageRgba8(buffer) => {
            (buffer.dimensions(), buffer.into_raw(), ColorFormat::Rgba)
        }
        _ => unreachable!(),
    };
    Image::from_raw(&buffer, width as usize, height as usize, color_format).unwrap()
}

/// Horizontal red-to-blue gradient over a vertical dark-to-light ramp.
fn gradient(width: u32, height: u32) -> Image {
    let buffer = image::RgbImage::from_fn(width, height, |x, y| {
        let t = x * 255 / (width - 1);
        let v = y * 255 / (height - 1);
        image::Rgb([t as u8, (v / 2) as u8, (255 - t) as u8])
    });
    to_image(image::DynamicImage::ImageRgb8(buffer))
}

fn in_palette(c: &Color, palette: &[Color]) -> bool {
    palette.iter().any(|p| p.rgb() == c.rgb())
}

#[test]
fn remap_uses_only_palette_colors() {
    let img = gradient(32, 24);
    let palette = palette_dither::build_palette(img.pixels(), 6, Some(0)).unwrap();
    assert_eq!(palette.len(), 6);

    let out = palette_dither::remap(&img, &palette).unwrap();
    assert_eq!((out.width(), out.height()), (32, 24));
    assert!(out.pixels().iter().all(|c| palette.contains(c)));

    for (src, dst) in img.pixels().iter().zip(out.pixels()) {
        assert_eq!(*dst, palette_dither::nearest(*src, &palette).unwrap());
    }
}

#[test]
fn dither_uses_only_palette_colors() {
    let img = gradient(32, 24);
    let palette = palette_dither::build_palette(img.pixels(), 4, Some(3)).unwrap();

    let out = palette_dither::dither(&img, &palette).unwrap();
    assert_eq!((out.width(), out.height()), (32, 24));
    assert!(out.pixels().iter().all(|c| in_palette(c, &palette)));
}

#[test]
fn dither_preserves_average_gray() {
    let gray = 77u8;
    let img = Image::new(40, 40, Color::new(gray, gray, gray, 255));
    let palette = [Color::new(0, 0, 0, 255), Color::new(255, 255, 255, 255)];

    let out = palette_dither::dither(&img, &palette).unwrap();
    let white = out.pixels().iter().filter(|c| c.r == 255).count();
    let ratio = white as f64 / out.pixels().len() as f64;

    assert!(white > 0 && white < out.pixels().len());
    assert!((ratio - gray as f64 / 255.0).abs() < 0.1, "white ratio {}", ratio);
}

#[test]
fn rgba_input_alpha_handling() {
    let buffer = image::RgbaImage::from_fn(4, 4, |x, y| {
        image::Rgba([(x * 60) as u8, (y * 60) as u8, 90, (x * 16 + y) as u8])
    });
    let img = to_image(image::DynamicImage::ImageRgba8(buffer));
    let palette = [Color::new(0, 0, 0, 255), Color::new(200, 200, 90, 255)];

    let remapped = palette_dither::remap(&img, &palette).unwrap();
    assert!(remapped.pixels().iter().all(|c| c.a == 255));

    let dithered = palette_dither::dither(&img, &palette).unwrap();
    for (src, dst) in img.pixels().iter().zip(dithered.pixels()) {
        assert_eq!(src.a, dst.a);
    }
}

#[test]
fn quantize_both_modes() {
    let img = gradient(16, 16);
    for mode in [Mode::Remap, Mode::Dither] {
        let out = palette_dither::quantize(&img, 8, mode, &KMeans::with_seed(9)).unwrap();
        assert_eq!(out.palette.len(), 8);
        assert_eq!((out.image.width(), out.image.height()), (16, 16));
        assert!(out.image.pixels().iter().all(|c| in_palette(c, &out.palette)));
    }
}

#[test]
fn quantize_is_reproducible_with_seed() {
    let img = gradient(20, 10);
    let kmeans = KMeans::with_seed(2024);
    let a = palette_dither::quantize(&img, 5, Mode::Dither, &kmeans).unwrap();
    let b = palette_dither::quantize(&img, 5, Mode::Dither, &kmeans).unwrap();
    assert_eq!(a, b);
}

#[test]
fn quantize_zero_area() {
    let img = Image::new(0, 12, Color::new(1, 2, 3, 255));
    let out = palette_dither::quantize(&img, 4, Mode::Dither, &KMeans::default()).unwrap();
    assert!(out.image.is_empty());
    assert!(out.palette.is_empty());
}

#[test]
fn quantize_rejects_zero_colors() {
    let img = gradient(4, 4);
    assert_eq!(
        palette_dither::quantize(&img, 0, Mode::Remap, &KMeans::default()),
        Err(Error::KMeans(KMeansError::ZeroClusters))
    );
}

#[test]
fn custom_palette_generator() {
    struct Fixed(Vec<Color>);

    impl palette_dither::PaletteGenerator for Fixed {
        fn generate_palette(&self, _colors: &[Color], k: usize) -> Result<Vec<Color>, Error> {
            Ok(self.0.iter().copied().take(k).collect())
        }
    }

    let img = gradient(8, 8);
    let fixed = Fixed(vec![Color::new(255, 0, 0, 255), Color::new(0, 0, 255, 255)]);
    let out = palette_dither::quantize(&img, 2, Mode::Remap, &fixed).unwrap();
    assert_eq!(out.palette, fixed.0);
    assert_eq!(out.image.get(0, 0), Some(Color::new(0, 0, 255, 255)));
    assert_eq!(out.image.get(7, 0), Some(Color::new(255, 0, 0, 255)));
}

#[test]
fn empty_palette_is_rejected_before_work() {
    let img = gradient(4, 4);
    assert_eq!(palette_dither::remap(&img, &[]), Err(Error::EmptyPalette));
    assert_eq!(palette_dither::dither(&img, &[]), Err(Error::EmptyPalette));
    assert_eq!(
        palette_dither::nearest(Color::new(0, 0, 0, 255), &[]),
        Err(Error::EmptyPalette)
    );
}
