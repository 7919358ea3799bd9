use crate::{DegenerateReason, LandmarkSet, TpsCoefficients, TpsError, TpsKernel};
use log::{debug, warn};
use nalgebra::{DMatrix, Point2};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Smallest landmark count that pins down the affine part.
pub const MIN_LANDMARKS: usize = 3;

/// Parameters of the spline system solve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// Radial basis used for both solving and evaluation.
    pub kernel: TpsKernel,
    /// Singular values below `rcond * σ_max` are treated as zero by the
    /// pseudo-inverse.
    pub rcond: f64,
    /// A warning is logged when `σ_min / σ_max` of the system matrix drops
    /// below this value (duplicate or collinear landmarks).
    pub warn_rcond: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            kernel: TpsKernel::default(),
            rcond: 1e-12,
            warn_rcond: 1e-10,
        }
    }
}

fn validate_landmarks(
    source: &[Point2<f64>],
    destination: &[Point2<f64>],
) -> Result<(), TpsError> {
    if source.len() != destination.len() {
        return Err(TpsError::ShapeMismatch {
            src_len: source.len(),
            dst_len: destination.len(),
        });
    }
    let n = source.len();
    if n < MIN_LANDMARKS {
        return Err(TpsError::DegenerateInput(
            DegenerateReason::TooFewLandmarks { found: n },
        ));
    }
    let sets = [
        (LandmarkSet::Source, source),
        (LandmarkSet::Destination, destination),
    ];
    for (set, points) in sets {
        if let Some(index) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(TpsError::DegenerateInput(
                DegenerateReason::NonFiniteLandmark { set, index },
            ));
        }
    }
    Ok(())
}

/// System matrix `L = [[K, P], [Pᵗ, 0]]`, shape `(N + 3) x (N + 3)`.
///
/// `K[i, j] = U(‖sᵢ − sⱼ‖)`, `P` has rows `[1, xᵢ, yᵢ]`.
pub fn system_matrix(source: &[Point2<f64>], kernel: TpsKernel) -> DMatrix<f64> {
    let n = source.len();
    let mut l = DMatrix::<f64>::zeros(n + 3, n + 3);
    l.view_mut((0, 0), (n, n))
        .copy_from(&kernel.matrix(source, source));

    for (i, p) in source.iter().enumerate() {
        for (k, v) in [1.0, p.x, p.y].into_iter().enumerate() {
            l[(i, n + k)] = v;
            l[(n + k, i)] = v;
        }
    }
    l
}

/// Right-hand side `V`: destination points over a `3 x 2` zero block.
pub fn target_matrix(destination: &[Point2<f64>]) -> DMatrix<f64> {
    let n = destination.len();
    let mut v = DMatrix::<f64>::zeros(n + 3, 2);
    for (i, p) in destination.iter().enumerate() {
        v[(i, 0)] = p.x;
        v[(i, 1)] = p.y;
    }
    v
}

/// Solve the spline mapping `source[i] -> destination[i]`.
///
/// Uses the SVD pseudo-inverse of `L`, so duplicate or collinear landmarks
/// yield a least-squares solution instead of a hard failure.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(landmarks = source.len()))
)]
pub fn solve(
    source: &[Point2<f64>],
    destination: &[Point2<f64>],
    params: &SolverParams,
) -> Result<TpsCoefficients, TpsError> {
    validate_landmarks(source, destination)?;

    let l = system_matrix(source, params.kernel);
    let v = target_matrix(destination);

    let svd = l.svd(true, true);
    let sv_max = svd.singular_values.max();
    let sv_min = svd.singular_values.min();
    if !sv_max.is_finite() || sv_max <= 0.0 {
        return Err(TpsError::DegenerateInput(DegenerateReason::SingularSystem));
    }

    let rcond = sv_min / sv_max;
    debug!(
        "tps system: {} landmarks, sigma_max {:.3e}, rcond {:.3e}",
        source.len(),
        sv_max,
        rcond
    );
    if rcond < params.warn_rcond {
        warn!(
            "tps system is ill-conditioned (rcond {:.3e}); duplicate or collinear landmarks?",
            rcond
        );
    }

    let pinv = svd
        .pseudo_inverse(params.rcond.max(0.0) * sv_max)
        .map_err(|_| TpsError::DegenerateInput(DegenerateReason::SingularSystem))?;
    let coeffs = pinv * v;
    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(TpsError::DegenerateInput(DegenerateReason::SingularSystem));
    }

    Ok(TpsCoefficients::new(coeffs))
}
