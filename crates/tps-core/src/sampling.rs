use crate::{Image, ImageError, ImageView, Pixel};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Pixel interpolation used when reading the source image at fractional
/// coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Order 0.
    Nearest,
    /// Order 1 (bilinear in 2D).
    #[default]
    Linear,
}

impl Interpolation {
    pub fn order(self) -> u8 {
        match self {
            Interpolation::Nearest => 0,
            Interpolation::Linear => 1,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unsupported interpolation order {0} (expected 0 = nearest or 1 = linear)")]
pub struct UnsupportedOrder(pub u8);

impl TryFrom<u8> for Interpolation {
    type Error = UnsupportedOrder;

    fn try_from(order: u8) -> Result<Self, Self::Error> {
        match order {
            0 => Ok(Interpolation::Nearest),
            1 => Ok(Interpolation::Linear),
            other => Err(UnsupportedOrder(other)),
        }
    }
}

/// `true` when `(x, y)` is finite and close enough to the image that one of
/// its bilinear neighbours can be inside. Keeps the integer casts in range.
#[inline]
fn near_image<T: Pixel>(src: &ImageView<'_, T>, x: f64, y: f64) -> bool {
    x.is_finite()
        && y.is_finite()
        && x > -1.0
        && y > -1.0
        && x < src.width() as f64
        && y < src.height() as f64
}

#[inline]
fn get_or<T: Pixel>(src: &ImageView<'_, T>, x: i64, y: i64, c: usize, fill: f64) -> f64 {
    src.get(x, y, c).map_or(fill, Pixel::to_f64)
}

/// Nearest-neighbour sample of channel `c`; `fill` outside the image.
#[inline]
pub fn sample_nearest<T: Pixel>(src: &ImageView<'_, T>, x: f64, y: f64, c: usize, fill: f64) -> f64 {
    if !near_image(src, x, y) {
        return fill;
    }
    get_or(src, x.round() as i64, y.round() as i64, c, fill)
}

/// Bilinear sample of channel `c`. Neighbours outside the image read `fill`.
#[inline]
pub fn sample_bilinear<T: Pixel>(
    src: &ImageView<'_, T>,
    x: f64,
    y: f64,
    c: usize,
    fill: f64,
) -> f64 {
    if !near_image(src, x, y) {
        return fill;
    }
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = get_or(src, x0, y0, c, fill);
    let p10 = get_or(src, x0 + 1, y0, c, fill);
    let p01 = get_or(src, x0, y0 + 1, c, fill);
    let p11 = get_or(src, x0 + 1, y0 + 1, c, fill);

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[inline]
pub fn sample<T: Pixel>(
    src: &ImageView<'_, T>,
    p: Point2<f64>,
    c: usize,
    interpolation: Interpolation,
    fill: f64,
) -> f64 {
    match interpolation {
        Interpolation::Nearest => sample_nearest(src, p.x, p.y, c, fill),
        Interpolation::Linear => sample_bilinear(src, p.x, p.y, c, fill),
    }
}

fn resample_row<T: Pixel>(
    src: &ImageView<'_, T>,
    coords: &[Point2<f64>],
    out: &mut [T],
    interpolation: Interpolation,
    fill: f64,
) {
    let channels = src.channels();
    for (p, px) in coords.iter().zip(out.chunks_exact_mut(channels)) {
        for (c, v) in px.iter_mut().enumerate() {
            *v = T::from_f64(sample(src, *p, c, interpolation, fill));
        }
    }
}

/// Resample `src` at per-pixel source coordinates.
///
/// `coords` is a row-major `height x width` field of `(x, y)` positions in
/// `src`. Every channel is sampled at the same coordinates, so the output
/// keeps the channel count and order of the input.
pub fn map_coordinates<T: Pixel>(
    src: &ImageView<'_, T>,
    coords: &[Point2<f64>],
    width: usize,
    height: usize,
    interpolation: Interpolation,
    fill: f64,
) -> Result<Image<T>, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::EmptyImage { width, height });
    }
    if coords.len() != width * height {
        return Err(ImageError::BufferLength {
            expected: width * height,
            actual: coords.len(),
        });
    }

    let channels = src.channels();
    let mut out = vec![T::default(); width * height * channels];
    let row_len = width * channels;

    #[cfg(feature = "rayon")]
    out.par_chunks_mut(row_len)
        .zip(coords.par_chunks(width))
        .for_each(|(row, row_coords)| resample_row(src, row_coords, row, interpolation, fill));

    #[cfg(not(feature = "rayon"))]
    for (row, row_coords) in out.chunks_mut(row_len).zip(coords.chunks(width)) {
        resample_row(src, row_coords, row, interpolation, fill);
    }

    Image::new(width, height, channels, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp() -> Image<f32> {
        // 4x3, value = 10*y + x
        Image::from_fn(4, 3, 1, |x, y, _| (10 * y + x) as f32).unwrap()
    }

    #[test]
    fn order_conversion() {
        assert_eq!(Interpolation::try_from(0).unwrap(), Interpolation::Nearest);
        assert_eq!(Interpolation::try_from(1).unwrap(), Interpolation::Linear);
        assert_eq!(Interpolation::try_from(3), Err(UnsupportedOrder(3)));
        assert_eq!(Interpolation::Linear.order(), 1);
    }

    #[test]
    fn bilinear_blends_between_pixels() {
        let img = ramp();
        let v = img.view();
        assert_relative_eq!(sample_bilinear(&v, 1.5, 1.0, 0, 0.0), 11.5);
        assert_relative_eq!(sample_bilinear(&v, 1.0, 0.5, 0, 0.0), 6.0);
        assert_relative_eq!(sample_bilinear(&v, 2.25, 1.5, 0, 0.0), 17.25);
        // last pixel is exact even though its right neighbour is outside
        assert_relative_eq!(sample_bilinear(&v, 3.0, 2.0, 0, -1.0), 23.0);
    }

    #[test]
    fn out_of_bounds_reads_fill() {
        let img = ramp();
        let v = img.view();
        assert_relative_eq!(sample_nearest(&v, -2.0, 0.0, 0, 7.0), 7.0);
        assert_relative_eq!(sample_bilinear(&v, 10.0, 10.0, 0, 7.0), 7.0);
        assert_relative_eq!(sample_bilinear(&v, f64::NAN, 1.0, 0, 7.0), 7.0);
        // partially outside: the inside neighbour still contributes
        assert_relative_eq!(sample_bilinear(&v, -0.5, 0.0, 0, 2.0), 1.0);
        assert_relative_eq!(sample_nearest(&v, 3.4, 2.4, 0, 7.0), 23.0);
    }

    #[test]
    fn huge_coordinates_read_fill() {
        let img = ramp();
        let v = img.view();
        for (x, y) in [(3e19, 1.0), (1.0, -3e19), (f64::MAX, f64::MAX), (-1e300, 0.0)] {
            assert_relative_eq!(sample_bilinear(&v, x, y, 0, 7.0), 7.0);
            assert_relative_eq!(sample_nearest(&v, x, y, 0, 7.0), 7.0);
        }
    }

    #[test]
    fn nearest_rounds_to_closest_pixel() {
        let img = ramp();
        let v = img.view();
        assert_relative_eq!(sample_nearest(&v, 1.4, 1.6, 0, 0.0), 21.0);
    }

    #[test]
    fn map_coordinates_keeps_channel_order() {
        let img = Image::from_fn(3, 3, 3, |x, y, c| (x + 3 * y) as u8 * 10 + c as u8).unwrap();
        let coords = vec![
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
            Point2::new(1.0, 1.0),
            Point2::new(5.0, 5.0),
        ];
        let out = map_coordinates(&img.view(), &coords, 2, 2, Interpolation::Nearest, 0.0).unwrap();
        assert_eq!(out.shape(), vec![2, 2, 3]);
        assert_eq!(out.data(), &[20, 21, 22, 60, 61, 62, 40, 41, 42, 0, 0, 0]);
    }

    #[test]
    fn map_coordinates_checks_field_size() {
        let img = ramp();
        let coords = vec![Point2::new(0.0, 0.0); 3];
        let err = map_coordinates(&img.view(), &coords, 2, 2, Interpolation::Linear, 0.0);
        assert!(matches!(err, Err(ImageError::BufferLength { expected: 4, actual: 3 })));
    }
}
