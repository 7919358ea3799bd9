use nalgebra::{DMatrix, Point2};
use serde::{Deserialize, Serialize};
use tps_core::pairwise_distances;

/// Offset inside the logarithm; only keeps `ln` away from zero.
pub const KERNEL_EPS: f64 = 1e-8;

/// Radial basis `U(r)` of the spline. `U(0) = 0` for both conventions.
///
/// The two conventions differ by roughly a factor of two away from `r ≈ 0`,
/// so a spline must be evaluated with the kernel it was solved with.
/// [`ThinPlateSpline`](crate::ThinPlateSpline) stores its kernel for that
/// reason.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TpsKernel {
    /// `U(r) = r² ln(r² + ε)`
    #[default]
    LogSquared,
    /// `U(r) = r² ln(r + ε)`
    Log,
}

impl TpsKernel {
    #[inline]
    pub fn eval(self, r: f64) -> f64 {
        if r == 0.0 {
            return 0.0;
        }
        let r2 = r * r;
        match self {
            TpsKernel::LogSquared => r2 * (r2 + KERNEL_EPS).ln(),
            TpsKernel::Log => r2 * (r + KERNEL_EPS).ln(),
        }
    }

    /// `U` of the distances between `rows` and `cols`, shape `rows.len() x cols.len()`.
    pub fn matrix(self, rows: &[Point2<f64>], cols: &[Point2<f64>]) -> DMatrix<f64> {
        let mut k = pairwise_distances(rows, cols);
        k.apply(|d| *d = self.eval(*d));
        k
    }
}
