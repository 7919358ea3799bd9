//! Numeric building blocks for thin plate spline warping.
//!
//! This crate knows nothing about splines. It provides the two primitives the
//! warper is written against:
//! - [`pairwise_distances`]: the `cdist` of two point sets,
//! - [`map_coordinates`]: resampling an image at per-pixel source coordinates
//!   with nearest or bilinear interpolation,
//!
//! plus the row-major [`Image`] / [`ImageView`] containers and a small logger.

#[cfg(feature = "image")]
mod convert;
mod distance;
mod logger;
mod raster;
mod sampling;

pub use distance::pairwise_distances;
pub use raster::{Image, ImageError, ImageView, Pixel};
pub use sampling::{
    map_coordinates, sample, sample_bilinear, sample_nearest, Interpolation, UnsupportedOrder,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, LOG_ENV};
