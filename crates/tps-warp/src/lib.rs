//! Thin plate spline (TPS) transforms and image warping.
//!
//! Given `N >= 3` landmark pairs, the spline maps every source landmark
//! exactly onto its destination landmark and bends as little as possible in
//! between. The crate covers:
//! - [`solve`]: build the `(N + 3) x (N + 3)` system and solve it with an SVD
//!   pseudo-inverse,
//! - [`evaluate`]: evaluate solved coefficients at many query points,
//! - [`ThinPlateSpline`] / [`TpsModel`]: the estimated transform as a value,
//! - [`tps_warp`]: inverse-warp an image, optionally evaluating the spline on
//!   a coarse grid and bilinearly upsampling the coordinate field.
//!
//! ## Quickstart
//!
//! ```
//! use tps_warp::{landmarks_from, ThinPlateSpline};
//!
//! let src = landmarks_from(&[[0, 0], [0, 5], [5, 5], [5, 0]]);
//! let dst = landmarks_from(&[[5, 0], [0, 0], [0, 5], [5, 5]]);
//!
//! let tps = ThinPlateSpline::estimate(&src, &dst)?;
//! for (s, d) in tps.transform_points(&src).iter().zip(&dst) {
//!     assert!((s - d).norm() < 1e-9);
//! }
//! # Ok::<(), tps_warp::TpsError>(())
//! ```
//!
//! Warping a grayscale buffer:
//!
//! ```
//! use tps_core::ImageView;
//! use tps_warp::{landmarks_from, tps_warp, WarpParams};
//!
//! let data = vec![0u8; 64 * 48];
//! let img = ImageView::gray(64, 48, &data)?;
//! let src = landmarks_from(&[[0, 0], [63, 0], [63, 47], [0, 47], [30, 20]]);
//! let dst = landmarks_from(&[[0, 0], [63, 0], [63, 47], [0, 47], [34, 22]]);
//!
//! let params = WarpParams { grid_scale: 4, ..WarpParams::default() };
//! let warped = tps_warp(&img, &src, &dst, &params)?;
//! assert_eq!((warped.width(), warped.height()), (64, 48));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Kernel convention
//!
//! The default kernel is `U(r) = r² ln(r² + ε)` ([`TpsKernel::LogSquared`]);
//! `U(r) = r² ln(r + ε)` is available as [`TpsKernel::Log`]. The kernel is
//! stored inside a [`ThinPlateSpline`], so evaluation always matches the solve.

mod error;
mod evaluator;
mod kernel;
mod solver;
mod transform;
mod warp;

pub use error::{DegenerateReason, LandmarkSet, TpsError};
pub use evaluator::{evaluate, TpsCoefficients, EVAL_CHUNK};
pub use kernel::{TpsKernel, KERNEL_EPS};
pub use solver::{solve, system_matrix, target_matrix, SolverParams, MIN_LANDMARKS};
pub use transform::{landmarks_from, ThinPlateSpline, TpsModel};
pub use warp::{tps_warp, tps_warp_array, CoordinateGrid, OutputRegion, WarpParams};

pub use tps_core::{Image, ImageError, ImageView, Interpolation};
