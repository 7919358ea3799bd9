use tps_core::ImageError;

/// Which of the two landmark sets a point belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LandmarkSet {
    Source,
    Destination,
}

impl std::fmt::Display for LandmarkSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LandmarkSet::Source => "source",
            LandmarkSet::Destination => "destination",
        })
    }
}

/// Why a landmark configuration cannot be turned into a spline.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DegenerateReason {
    #[error("need at least 3 landmarks, got {found}")]
    TooFewLandmarks { found: usize },
    #[error("{set} landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { set: LandmarkSet, index: usize },
    #[error("system matrix is singular")]
    SingularSystem,
}

/// Errors returned by spline estimation, evaluation and warping.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TpsError {
    #[error("source and destination shape must be identical ({src_len} vs {dst_len} landmarks)")]
    ShapeMismatch { src_len: usize, dst_len: usize },
    #[error("degenerate landmarks: {0}")]
    DegenerateInput(DegenerateReason),
    #[error("transform is not estimated; call `estimate` first")]
    Uninitialized,
    #[error(transparent)]
    InvalidShape(#[from] ImageError),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}
