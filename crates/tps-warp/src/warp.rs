use crate::{SolverParams, ThinPlateSpline, TpsError};
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tps_core::{map_coordinates, Image, ImageView, Interpolation, Pixel};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Inclusive output window `xmin <= x <= xmax`, `ymin <= y <= ymax` in
/// destination pixel coordinates (`x` = column, `y` = row).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRegion {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
}

impl OutputRegion {
    pub fn new(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// The whole `width x height` image.
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width as i32 - 1, height as i32 - 1)
    }

    pub fn width(&self) -> usize {
        (self.xmax as i64 - self.xmin as i64 + 1).max(0) as usize
    }

    pub fn height(&self) -> usize {
        (self.ymax as i64 - self.ymin as i64 + 1).max(0) as usize
    }

    fn validate(&self) -> Result<(), TpsError> {
        if self.xmin > self.xmax || self.ymin > self.ymax {
            return Err(TpsError::InvalidParameter(format!(
                "output region ({}, {}, {}, {}) is inverted",
                self.xmin, self.ymin, self.xmax, self.ymax
            )));
        }
        Ok(())
    }
}

impl From<(i32, i32, i32, i32)> for OutputRegion {
    fn from((xmin, ymin, xmax, ymax): (i32, i32, i32, i32)) -> Self {
        Self::new(xmin, ymin, xmax, ymax)
    }
}

/// Parameters of [`tps_warp`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpParams {
    /// Output window; `None` warps onto the full input frame.
    pub output_region: Option<OutputRegion>,
    pub interpolation: Interpolation,
    /// Spacing of the grid on which the spline is evaluated exactly. `1`
    /// evaluates every output pixel; larger values bilinearly interpolate
    /// between grid nodes. Accurate for values up to 10 or so.
    pub grid_scale: usize,
    /// Value read for samples that fall outside the source image.
    pub fill: f64,
    pub solver: SolverParams,
}

impl Default for WarpParams {
    fn default() -> Self {
        Self {
            output_region: None,
            interpolation: Interpolation::Linear,
            grid_scale: 1,
            fill: 0.0,
            solver: SolverParams::default(),
        }
    }
}

fn node_count(extent: usize, scale: usize) -> usize {
    (extent - 1).div_ceil(scale) + 1
}

/// Source-space positions of a regular grid of output nodes.
///
/// Node `(ix, iy)` sits at output pixel `(xmin + ix·s, ymin + iy·s)`. The grid
/// covers the whole region; its last node may lie past the far edge.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateGrid {
    nx: usize,
    ny: usize,
    scale: usize,
    nodes: Vec<Point2<f64>>, // row-major, ny x nx
}

impl CoordinateGrid {
    /// Evaluate `spline` at every node of the grid over `region`.
    pub fn evaluate(
        spline: &ThinPlateSpline,
        region: &OutputRegion,
        scale: usize,
    ) -> Result<Self, TpsError> {
        region.validate()?;
        if scale == 0 {
            return Err(TpsError::InvalidParameter(
                "grid_scale must be at least 1".to_string(),
            ));
        }
        let nx = node_count(region.width(), scale);
        let ny = node_count(region.height(), scale);

        let mut query = Vec::with_capacity(nx * ny);
        for iy in 0..ny {
            let y = region.ymin as f64 + (iy * scale) as f64;
            for ix in 0..nx {
                let x = region.xmin as f64 + (ix * scale) as f64;
                query.push(Point2::new(x, y));
            }
        }

        Ok(Self {
            nx,
            ny,
            scale,
            nodes: spline.transform_points(&query),
        })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn scale(&self) -> usize {
        self.scale
    }

    #[inline]
    pub fn node(&self, ix: usize, iy: usize) -> Point2<f64> {
        self.nodes[iy * self.nx + ix]
    }

    pub fn into_nodes(self) -> Vec<Point2<f64>> {
        self.nodes
    }

    /// Bilinearly upsample to a `width x height` per-pixel field.
    ///
    /// Pixel `(c, r)` blends nodes `(ix, iy)` .. `(ix + 1, iy + 1)` with
    /// `ix = c / s` and `fx = (c mod s) / s`; `ix + 1` is clamped to the last
    /// node. Pixels that sit on a node get that node's value exactly.
    pub fn upsample(&self, width: usize, height: usize) -> Vec<Point2<f64>> {
        let s = self.scale;
        let inv = 1.0 / s as f64;
        let mut field = Vec::with_capacity(width * height);

        for r in 0..height {
            let iy = (r / s).min(self.ny - 1);
            let iy1 = (iy + 1).min(self.ny - 1);
            let fy = (r % s) as f64 * inv;
            for c in 0..width {
                let ix = (c / s).min(self.nx - 1);
                let ix1 = (ix + 1).min(self.nx - 1);
                let fx = (c % s) as f64 * inv;

                let p00 = self.node(ix, iy).coords;
                let p10 = self.node(ix1, iy).coords;
                let p01 = self.node(ix, iy1).coords;
                let p11 = self.node(ix1, iy1).coords;

                let v = p00 * ((1.0 - fx) * (1.0 - fy))
                    + p01 * ((1.0 - fx) * fy)
                    + p10 * (fx * (1.0 - fy))
                    + p11 * (fx * fy);
                field.push(Point2::from(v));
            }
        }
        field
    }
}

/// Warp `image` so that `source` landmarks land on `destination` landmarks.
///
/// The spline is estimated in reverse (destination -> source): each output
/// pixel looks up where to read from in the input. Every channel is
/// resampled at the same coordinates.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip_all,
        fields(width = image.width(), height = image.height(), landmarks = source.len())
    )
)]
pub fn tps_warp<T: Pixel>(
    image: &ImageView<'_, T>,
    source: &[Point2<f64>],
    destination: &[Point2<f64>],
    params: &WarpParams,
) -> Result<Image<T>, TpsError> {
    let region = params
        .output_region
        .unwrap_or_else(|| OutputRegion::full(image.width(), image.height()));

    let inverse = ThinPlateSpline::estimate_with(destination, source, &params.solver)?;
    let grid = CoordinateGrid::evaluate(&inverse, &region, params.grid_scale)?;
    let (width, height) = (region.width(), region.height());
    debug!(
        "tps warp: {}x{} output, {}x{} grid nodes (scale {})",
        width,
        height,
        grid.nx(),
        grid.ny(),
        grid.scale()
    );

    let coords = if grid.scale() == 1 {
        grid.into_nodes()
    } else {
        grid.upsample(width, height)
    };

    Ok(map_coordinates(
        image,
        &coords,
        width,
        height,
        params.interpolation,
        params.fill,
    )?)
}

/// [`tps_warp`] on a raw row-major buffer of shape `[H, W]` or `[H, W, C]`.
pub fn tps_warp_array<T: Pixel>(
    shape: &[usize],
    data: &[T],
    source: &[Point2<f64>],
    destination: &[Point2<f64>],
    params: &WarpParams,
) -> Result<Image<T>, TpsError> {
    let view = ImageView::from_shape(shape, data)?;
    tps_warp(&view, source, destination, params)
}
