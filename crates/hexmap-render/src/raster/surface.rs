use hexmap_grid::Vec2;

use crate::ground::style::{Rgba, StrokeStyle};
use crate::ground::tracer::{SmoothPath, TracedRegion};

/// One painted path on the offscreen surface.
#[derive(Debug, Clone)]
pub struct SurfaceOp {
    pub path: SmoothPath,
    pub fill: Option<Rgba>,
    pub stroke: Option<StrokeStyle>,
}

/// Offscreen vector description of the whole ground, sized to the level's
/// maximum extents.
///
/// This is the value handed to the conversion service: a renderer-agnostic
/// recording, painted in order.
#[derive(Debug, Clone)]
pub struct VectorSurface {
    /// Surface size in world units; the bitmap backs it 1:1 before any
    /// downsampling.
    pub size: Vec2,
    pub ops: Vec<SurfaceOp>,
}

impl VectorSurface {
    /// Records traced regions onto a fresh surface.
    ///
    /// Regions are recorded as given; the tracer already ordered them
    /// background-first.
    pub fn from_regions(regions: &[TracedRegion], size: Vec2) -> Self {
        let ops = regions
            .iter()
            .map(|region| SurfaceOp {
                path: region.path.clone(),
                fill: region.style.fill,
                stroke: region.style.stroke,
            })
            .collect();
        Self { size, ops }
    }
}
