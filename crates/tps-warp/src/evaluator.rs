use crate::{TpsError, TpsKernel};
use nalgebra::{DMatrix, DMatrixView, Point2};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Query points evaluated per kernel-matrix block. Bounds the temporary
/// `EVAL_CHUNK x N` matrix for large grids.
pub const EVAL_CHUNK: usize = 4096;

/// Solved spline coefficients, shape `(N + 3) x 2`.
///
/// Column 0 maps to the output `x`, column 1 to `y`. Rows `0..N` are the
/// per-landmark weights, the last three rows the affine terms `(a1, ax, ay)`.
#[derive(Clone, Debug, PartialEq)]
pub struct TpsCoefficients {
    matrix: DMatrix<f64>,
}

impl Default for TpsCoefficients {
    /// Empty coefficients; evaluating them fails with [`TpsError::Uninitialized`].
    fn default() -> Self {
        Self {
            matrix: DMatrix::zeros(0, 2),
        }
    }
}

impl TpsCoefficients {
    /// Wrap an `(N + 3) x 2` matrix, e.g. coefficients stored by a caller.
    pub fn from_matrix(matrix: DMatrix<f64>) -> Result<Self, TpsError> {
        if matrix.ncols() != 2 || (matrix.nrows() != 0 && matrix.nrows() < 3) {
            return Err(TpsError::InvalidParameter(format!(
                "coefficient matrix must be (N + 3) x 2, got {} x {}",
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        Ok(Self { matrix })
    }

    pub(crate) fn new(matrix: DMatrix<f64>) -> Self {
        Self { matrix }
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.nrows() == 0
    }

    /// Number of landmarks `N` these coefficients were solved for.
    pub fn landmark_count(&self) -> usize {
        self.matrix.nrows().saturating_sub(3)
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Landmark weights `w`, shape `N x 2`.
    pub fn weights(&self) -> DMatrixView<'_, f64> {
        self.matrix.rows(0, self.landmark_count())
    }

    /// Affine part `(a1, ax, ay)` of the given output axis (0 = x, 1 = y).
    pub fn affine(&self, axis: usize) -> [f64; 3] {
        let n = self.landmark_count();
        let col = self.matrix.column(axis);
        [col[n], col[n + 1], col[n + 2]]
    }
}

/// Evaluate a spline at `query`.
///
/// For every query point `p` and output axis:
/// `f(p) = a1 + ax·x + ay·y + Σᵢ wᵢ·U(‖sᵢ − p‖)`.
///
/// `kernel` must be the kernel the coefficients were solved with.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(landmarks = source.len(), queries = query.len()))
)]
pub fn evaluate(
    coefficients: &TpsCoefficients,
    source: &[Point2<f64>],
    kernel: TpsKernel,
    query: &[Point2<f64>],
) -> Result<Vec<Point2<f64>>, TpsError> {
    if coefficients.is_empty() || source.is_empty() {
        return Err(TpsError::Uninitialized);
    }
    if coefficients.landmark_count() != source.len() {
        return Err(TpsError::ShapeMismatch {
            src_len: source.len(),
            dst_len: coefficients.landmark_count(),
        });
    }
    Ok(evaluate_points(coefficients, source, kernel, query))
}

/// Unchecked variant for callers that already hold consistent state.
pub(crate) fn evaluate_points(
    coefficients: &TpsCoefficients,
    source: &[Point2<f64>],
    kernel: TpsKernel,
    query: &[Point2<f64>],
) -> Vec<Point2<f64>> {
    let mut out = vec![Point2::origin(); query.len()];

    #[cfg(feature = "rayon")]
    query
        .par_chunks(EVAL_CHUNK)
        .zip(out.par_chunks_mut(EVAL_CHUNK))
        .for_each(|(q, o)| evaluate_chunk(coefficients, source, kernel, q, o));

    #[cfg(not(feature = "rayon"))]
    for (q, o) in query.chunks(EVAL_CHUNK).zip(out.chunks_mut(EVAL_CHUNK)) {
        evaluate_chunk(coefficients, source, kernel, q, o);
    }

    out
}

fn evaluate_chunk(
    coefficients: &TpsCoefficients,
    source: &[Point2<f64>],
    kernel: TpsKernel,
    query: &[Point2<f64>],
    out: &mut [Point2<f64>],
) {
    // (M x N) * (N x 2): both axes share one kernel block.
    let bent = kernel.matrix(query, source) * coefficients.weights();
    let [a1x, axx, ayx] = coefficients.affine(0);
    let [a1y, axy, ayy] = coefficients.affine(1);

    for (i, (q, o)) in query.iter().zip(out.iter_mut()).enumerate() {
        let x = a1x + axx * q.x + ayx * q.y + bent[(i, 0)];
        let y = a1y + axy * q.x + ayy * q.y + bent[(i, 1)];
        *o = Point2::new(x, y);
    }
}
