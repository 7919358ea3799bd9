/// Errors raised while building an image container from raw parts.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("image has an invalid shape {height}x{width} (both extents must be non-zero)")]
    EmptyImage { width: usize, height: usize },
    #[error("image of rank {0} has an invalid shape (expected HxW or HxWxC)")]
    UnsupportedRank(usize),
    #[error("image must have at least one channel")]
    ZeroChannels,
    #[error("buffer holds {actual} samples but the image shape needs {expected}")]
    BufferLength { expected: usize, actual: usize },
}

/// Scalar sample type stored in an image.
///
/// Interpolation always happens in `f64`; integer types round and saturate
/// when converted back.
pub trait Pixel: Copy + Default + Send + Sync + 'static {
    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;
}

macro_rules! int_pixel {
    ($($t:ty),*) => {$(
        impl Pixel for $t {
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                // `as` saturates and maps NaN to 0.
                v.round().clamp(<$t>::MIN as f64, <$t>::MAX as f64) as $t
            }
        }
    )*};
}

int_pixel!(u8, u16, i16, i32);

impl Pixel for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl Pixel for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}

fn check_parts(
    width: usize,
    height: usize,
    channels: usize,
    len: usize,
) -> Result<(), ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::EmptyImage { width, height });
    }
    if channels == 0 {
        return Err(ImageError::ZeroChannels);
    }
    let expected = width * height * channels;
    if len != expected {
        return Err(ImageError::BufferLength {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Split an `HxW` / `HxWxC` shape into `(width, height, channels)`.
fn split_shape(shape: &[usize]) -> Result<(usize, usize, usize), ImageError> {
    match *shape {
        [h, w] => Ok((w, h, 1)),
        [h, w, c] => Ok((w, h, c)),
        _ => Err(ImageError::UnsupportedRank(shape.len())),
    }
}

/// Borrowed row-major image, channels interleaved.
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a, T> {
    width: usize,
    height: usize,
    channels: usize,
    data: &'a [T], // len = w*h*c
}

impl<'a, T: Pixel> ImageView<'a, T> {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: &'a [T],
    ) -> Result<Self, ImageError> {
        check_parts(width, height, channels, data.len())?;
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Single-channel view.
    pub fn gray(width: usize, height: usize, data: &'a [T]) -> Result<Self, ImageError> {
        Self::new(width, height, 1, data)
    }

    /// Build a view from an array shape: `[H, W]` (grayscale) or `[H, W, C]`.
    ///
    /// Rank 0, 1 or >3 shapes and zero extents are rejected.
    pub fn from_shape(shape: &[usize], data: &'a [T]) -> Result<Self, ImageError> {
        let (w, h, c) = split_shape(shape)?;
        Self::new(w, h, c, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn data(&self) -> &'a [T] {
        self.data
    }

    /// Sample at integer pixel `(x, y)`, channel `c`. `None` outside the image.
    #[inline]
    pub fn get(&self, x: i64, y: i64, c: usize) -> Option<T> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        let idx = (y as usize * self.width + x as usize) * self.channels + c;
        self.data.get(idx).copied()
    }
}

/// Owned row-major image, channels interleaved.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<T>,
}

impl<T: Pixel> Image<T> {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<T>,
    ) -> Result<Self, ImageError> {
        check_parts(width, height, channels, data.len())?;
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn from_shape(shape: &[usize], data: Vec<T>) -> Result<Self, ImageError> {
        let (w, h, c) = split_shape(shape)?;
        Self::new(w, h, c, data)
    }

    /// Build an image by evaluating `f(x, y, c)` for every sample.
    pub fn from_fn(
        width: usize,
        height: usize,
        channels: usize,
        mut f: impl FnMut(usize, usize, usize) -> T,
    ) -> Result<Self, ImageError> {
        let mut data = Vec::with_capacity(width * height * channels);
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push(f(x, y, c));
                }
            }
        }
        Self::new(width, height, channels, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `[H, W]` for single-channel images, `[H, W, C]` otherwise.
    pub fn shape(&self) -> Vec<usize> {
        if self.channels == 1 {
            vec![self.height, self.width]
        } else {
            vec![self.height, self.width, self.channels]
        }
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, c: usize) -> Option<T> {
        self.view().get(x as i64, y as i64, c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_extents_are_rejected() {
        let empty: [f32; 0] = [];
        for shape in [[0usize, 10], [10, 0]] {
            let err = ImageView::from_shape(&shape, &empty).unwrap_err();
            assert!(matches!(err, ImageError::EmptyImage { .. }), "{err}");
        }
    }

    #[test]
    fn scalar_and_high_rank_shapes_are_rejected() {
        let data = [0u8; 16];
        assert_eq!(
            ImageView::from_shape(&[], &data[..1]).unwrap_err(),
            ImageError::UnsupportedRank(0)
        );
        assert_eq!(
            ImageView::from_shape(&[2, 2, 2, 2], &data).unwrap_err(),
            ImageError::UnsupportedRank(4)
        );
    }

    #[test]
    fn buffer_length_must_match_shape() {
        let data = [0u8; 5];
        let err = ImageView::from_shape(&[2, 3], &data).unwrap_err();
        assert_eq!(
            err,
            ImageError::BufferLength {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn interleaved_channels_are_addressed_per_pixel() {
        let img = Image::from_fn(3, 2, 2, |x, y, c| (10 * y + x) as u8 + 100 * c as u8).unwrap();
        assert_eq!(img.shape(), vec![2, 3, 2]);
        assert_eq!(img.get(2, 1, 0), Some(12));
        assert_eq!(img.get(2, 1, 1), Some(112));
        assert_eq!(img.get(3, 1, 0), None);
        assert_eq!(img.view().get(-1, 0, 0), None);
    }

    #[test]
    fn integer_pixels_round_and_saturate() {
        assert_eq!(u8::from_f64(254.6), 255);
        assert_eq!(u8::from_f64(300.0), 255);
        assert_eq!(u8::from_f64(-3.0), 0);
        assert_eq!(u16::from_f64(f64::NAN), 0);
        assert_eq!(i16::from_f64(-1.4), -1);
    }
}
