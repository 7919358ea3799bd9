use crate::evaluator::evaluate_points;
use crate::{solve, SolverParams, TpsCoefficients, TpsError, TpsKernel};
use nalgebra::Point2;

/// Convert integer or float landmark pairs into `f64` points.
pub fn landmarks_from<T: Copy + Into<f64>>(points: &[[T; 2]]) -> Vec<Point2<f64>> {
    points
        .iter()
        .map(|&[x, y]| Point2::new(x.into(), y.into()))
        .collect()
}

/// An estimated thin plate spline.
///
/// Only [`ThinPlateSpline::estimate`] (or [`from_parts`](Self::from_parts))
/// produces a value, so holding one means source landmarks, coefficients and
/// kernel are consistent. It is immutable and can be shared across threads.
#[derive(Clone, Debug, PartialEq)]
pub struct ThinPlateSpline {
    source: Vec<Point2<f64>>,
    coefficients: TpsCoefficients,
    kernel: TpsKernel,
}

impl ThinPlateSpline {
    /// Estimate the mapping `source[i] -> destination[i]` with default
    /// solver parameters.
    pub fn estimate(
        source: &[Point2<f64>],
        destination: &[Point2<f64>],
    ) -> Result<Self, TpsError> {
        Self::estimate_with(source, destination, &SolverParams::default())
    }

    pub fn estimate_with(
        source: &[Point2<f64>],
        destination: &[Point2<f64>],
        params: &SolverParams,
    ) -> Result<Self, TpsError> {
        let coefficients = solve(source, destination, params)?;
        Ok(Self {
            source: source.to_vec(),
            coefficients,
            kernel: params.kernel,
        })
    }

    /// Reassemble a spline from previously solved parts.
    pub fn from_parts(
        source: Vec<Point2<f64>>,
        coefficients: TpsCoefficients,
        kernel: TpsKernel,
    ) -> Result<Self, TpsError> {
        if source.is_empty() || coefficients.is_empty() {
            return Err(TpsError::Uninitialized);
        }
        if coefficients.landmark_count() != source.len() {
            return Err(TpsError::ShapeMismatch {
                src_len: source.len(),
                dst_len: coefficients.landmark_count(),
            });
        }
        Ok(Self {
            source,
            coefficients,
            kernel,
        })
    }

    pub fn source(&self) -> &[Point2<f64>] {
        &self.source
    }

    pub fn coefficients(&self) -> &TpsCoefficients {
        &self.coefficients
    }

    pub fn kernel(&self) -> TpsKernel {
        self.kernel
    }

    pub fn transform_point(&self, p: Point2<f64>) -> Point2<f64> {
        self.transform_points(std::slice::from_ref(&p))[0]
    }

    pub fn transform_points(&self, points: &[Point2<f64>]) -> Vec<Point2<f64>> {
        evaluate_points(&self.coefficients, &self.source, self.kernel, points)
    }

    /// Transform separate coordinate arrays, e.g. the two halves of a meshgrid.
    pub fn transform_xy(&self, xs: &[f64], ys: &[f64]) -> Result<(Vec<f64>, Vec<f64>), TpsError> {
        if xs.len() != ys.len() {
            return Err(TpsError::InvalidParameter(format!(
                "x and y coordinate arrays differ in length ({} vs {})",
                xs.len(),
                ys.len()
            )));
        }
        let points: Vec<Point2<f64>> = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| Point2::new(x, y))
            .collect();
        Ok(self.transform_points(&points).into_iter().map(|p| (p.x, p.y)).unzip())
    }

    /// A thin plate spline has no closed-form inverse; this always fails.
    ///
    /// Estimate a second spline with the landmark sets swapped instead.
    pub fn inverse(&self) -> Result<ThinPlateSpline, TpsError> {
        Err(TpsError::UnsupportedOperation(
            "thin plate splines have no analytic inverse; estimate destination -> source instead",
        ))
    }
}

/// Slot holding either nothing or an estimated spline.
///
/// [`TpsModel::estimate`] replaces the slot only when estimation succeeds; a
/// failed call leaves the previous state untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TpsModel {
    #[default]
    Unestimated,
    Estimated(ThinPlateSpline),
}

impl TpsModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn estimate(
        &mut self,
        source: &[Point2<f64>],
        destination: &[Point2<f64>],
    ) -> Result<&ThinPlateSpline, TpsError> {
        self.estimate_with(source, destination, &SolverParams::default())
    }

    pub fn estimate_with(
        &mut self,
        source: &[Point2<f64>],
        destination: &[Point2<f64>],
        params: &SolverParams,
    ) -> Result<&ThinPlateSpline, TpsError> {
        let spline = ThinPlateSpline::estimate_with(source, destination, params)?;
        *self = TpsModel::Estimated(spline);
        self.spline()
    }

    pub fn is_estimated(&self) -> bool {
        matches!(self, TpsModel::Estimated(_))
    }

    pub fn spline(&self) -> Result<&ThinPlateSpline, TpsError> {
        match self {
            TpsModel::Estimated(spline) => Ok(spline),
            TpsModel::Unestimated => Err(TpsError::Uninitialized),
        }
    }

    pub fn transform_points(&self, points: &[Point2<f64>]) -> Result<Vec<Point2<f64>>, TpsError> {
        Ok(self.spline()?.transform_points(points))
    }

    pub fn transform_xy(&self, xs: &[f64], ys: &[f64]) -> Result<(Vec<f64>, Vec<f64>), TpsError> {
        self.spline()?.transform_xy(xs, ys)
    }

    /// Always fails, estimated or not. See [`ThinPlateSpline::inverse`].
    pub fn inverse(&self) -> Result<ThinPlateSpline, TpsError> {
        match self {
            TpsModel::Estimated(spline) => spline.inverse(),
            TpsModel::Unestimated => Err(TpsError::UnsupportedOperation(
                "thin plate splines have no analytic inverse",
            )),
        }
    }

    pub fn reset(&mut self) {
        *self = TpsModel::Unestimated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn landmarks_accept_integer_input() {
        let pts = landmarks_from(&[[0i32, 5], [5, -5]]);
        assert_eq!(pts, vec![Point2::new(0.0, 5.0), Point2::new(5.0, -5.0)]);
        let pts = landmarks_from(&[[0.5f32, 1.0]]);
        assert_eq!(pts[0], Point2::new(0.5, 1.0));
    }

    #[test]
    fn unestimated_model_refuses_to_transform() {
        let model = TpsModel::new();
        assert!(!model.is_estimated());
        assert_eq!(
            model.transform_points(&[Point2::new(1.0, 2.0)]).unwrap_err(),
            TpsError::Uninitialized
        );
        assert_eq!(
            model.transform_xy(&[1.0], &[2.0]).unwrap_err(),
            TpsError::Uninitialized
        );
    }

    #[test]
    fn failed_estimate_keeps_previous_state() {
        let src = landmarks_from(&[[0, 0], [0, 5], [5, 5], [5, 0]]);
        let dst = landmarks_from(&[[5, 0], [0, 0], [0, 5], [5, 5]]);

        let mut model = TpsModel::new();
        assert!(model.estimate(&src, &dst[..3]).is_err());
        assert_eq!(model, TpsModel::Unestimated);

        model.estimate(&src, &dst).unwrap();
        let before = model.clone();
        assert!(model.estimate(&src[..2], &dst[..2]).is_err());
        assert_eq!(model, before);
    }

    #[test]
    fn inverse_is_unsupported() {
        let src = landmarks_from(&[[0, 0], [0, 5], [5, 5], [5, 0]]);
        let spline = ThinPlateSpline::estimate(&src, &src).unwrap();
        assert!(matches!(
            spline.inverse(),
            Err(TpsError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            TpsModel::new().inverse(),
            Err(TpsError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn from_parts_checks_consistency() {
        let src = landmarks_from(&[[0, 0], [0, 5], [5, 5], [5, 0]]);
        let spline = ThinPlateSpline::estimate(&src, &src).unwrap();
        let rebuilt = ThinPlateSpline::from_parts(
            spline.source().to_vec(),
            spline.coefficients().clone(),
            spline.kernel(),
        )
        .unwrap();
        assert_eq!(rebuilt, spline);

        let err = ThinPlateSpline::from_parts(
            src[..3].to_vec(),
            spline.coefficients().clone(),
            spline.kernel(),
        )
        .unwrap_err();
        assert!(matches!(err, TpsError::ShapeMismatch { .. }));
        assert_eq!(
            ThinPlateSpline::from_parts(Vec::new(), TpsCoefficients::default(), TpsKernel::Log)
                .unwrap_err(),
            TpsError::Uninitialized
        );
    }

    #[test]
    fn transform_xy_matches_point_transform() {
        let src = landmarks_from(&[[0, 0], [0, 5], [5, 5], [5, 0]]);
        let dst = landmarks_from(&[[5, 0], [0, 0], [0, 5], [5, 5]]);
        let spline = ThinPlateSpline::estimate(&src, &dst).unwrap();

        let (xs, ys) = spline.transform_xy(&[1.0, 3.0], &[2.0, 4.0]).unwrap();
        let p = spline.transform_point(Point2::new(3.0, 4.0));
        assert_relative_eq!(xs[1], p.x);
        assert_relative_eq!(ys[1], p.y);
        assert!(spline.transform_xy(&[1.0], &[]).is_err());
    }
}
