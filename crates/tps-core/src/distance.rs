use nalgebra::{DMatrix, Point2};

/// Euclidean distances between every point of `a` (rows) and `b` (columns).
pub fn pairwise_distances(a: &[Point2<f64>], b: &[Point2<f64>]) -> DMatrix<f64> {
    DMatrix::from_fn(a.len(), b.len(), |i, j| (a[i] - b[j]).norm())
}
