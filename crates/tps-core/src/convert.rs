//! Conversions to and from the `image` crate buffers.

use crate::{Image, ImageError};
use image::{GrayImage, RgbImage};

impl TryFrom<&GrayImage> for Image<u8> {
    type Error = ImageError;

    fn try_from(img: &GrayImage) -> Result<Self, Self::Error> {
        Image::new(
            img.width() as usize,
            img.height() as usize,
            1,
            img.as_raw().clone(),
        )
    }
}

impl TryFrom<&RgbImage> for Image<u8> {
    type Error = ImageError;

    fn try_from(img: &RgbImage) -> Result<Self, Self::Error> {
        Image::new(
            img.width() as usize,
            img.height() as usize,
            3,
            img.as_raw().clone(),
        )
    }
}

impl Image<u8> {
    /// `None` unless the image has exactly one channel.
    pub fn to_gray_image(&self) -> Option<GrayImage> {
        if self.channels() != 1 {
            return None;
        }
        GrayImage::from_raw(
            self.width() as u32,
            self.height() as u32,
            self.data().to_vec(),
        )
    }

    /// `None` unless the image has exactly three channels.
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        if self.channels() != 3 {
            return None;
        }
        RgbImage::from_raw(
            self.width() as u32,
            self.height() as u32,
            self.data().to_vec(),
        )
    }
}
