use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::error::ConvertError;
use crate::ground::tracer::SmoothPath;

use super::surface::VectorSurface;

/// Completion callback of a conversion request.
pub type ConvertDone = Box<dyn FnOnce(Result<Pixmap, ConvertError>)>;

/// Delegated vector-surface-to-bitmap conversion.
///
/// The service is opaque and asynchronous by contract: completion arrives
/// through the callback, possibly within `convert`, possibly later, or
/// never. A service that never calls back leaves the cache in its
/// building state until an external policy resets it.
pub trait SurfaceConverter {
    fn convert(&mut self, surface: VectorSurface, done: ConvertDone);
}

/// In-process converter that rasterizes with tiny-skia and completes
/// synchronously, before `convert` returns.
#[derive(Debug, Default)]
pub struct SoftwareRasterizer;

impl SurfaceConverter for SoftwareRasterizer {
    fn convert(&mut self, surface: VectorSurface, done: ConvertDone) {
        done(rasterize(&surface));
    }
}

fn rasterize(surface: &VectorSurface) -> Result<Pixmap, ConvertError> {
    let width = surface.size.x.ceil() as u32;
    let height = surface.size.y.ceil() as u32;
    let mut pixmap =
        Pixmap::new(width, height).ok_or(ConvertError::BadBitmapSize { width, height })?;

    for op in &surface.ops {
        // Degenerate paths (single-point regions) have nothing to fill.
        let Some(path) = build_path(&op.path) else {
            continue;
        };
        if let Some(fill) = op.fill {
            let mut paint = Paint::default();
            paint.set_color_rgba8(fill.r, fill.g, fill.b, fill.a);
            paint.anti_alias = true;
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
        if let Some(stroke) = op.stroke {
            let mut paint = Paint::default();
            paint.set_color_rgba8(stroke.color.r, stroke.color.g, stroke.color.b, stroke.color.a);
            paint.anti_alias = true;
            let params = Stroke { width: stroke.width, ..Stroke::default() };
            pixmap.stroke_path(&path, &paint, &params, Transform::identity(), None);
        }
    }

    Ok(pixmap)
}

fn build_path(path: &SmoothPath) -> Option<tiny_skia::Path> {
    if path.quads.is_empty() {
        return None;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(path.start.x, path.start.y);
    for (ctrl, to) in &path.quads {
        pb.quad_to(ctrl.x, ctrl.y, to.x, to.y);
    }
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexmap_grid::Vec2;

    use crate::ground::style::Rgba;
    use crate::raster::surface::SurfaceOp;

    /// Diamond around `center` with the given half-extent.
    fn diamond(center: Vec2, half: f32) -> SmoothPath {
        let points = [
            center + Vec2::new(0.0, -half),
            center + Vec2::new(half, 0.0),
            center + Vec2::new(0.0, half),
            center + Vec2::new(-half, 0.0),
            center + Vec2::new(0.0, -half),
            center + Vec2::new(half, 0.0),
        ];
        let start = points[0].midpoint(points[1]);
        let quads = (1..points.len() - 1)
            .map(|i| (points[i], points[i].midpoint(points[i + 1])))
            .collect();
        SmoothPath { start, quads }
    }

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let p = pixmap.pixel(x, y).unwrap();
        [p.red(), p.green(), p.blue(), p.alpha()]
    }

    #[test]
    fn fills_the_path_interior() {
        let surface = VectorSurface {
            size: Vec2::new(64.0, 64.0),
            ops: vec![SurfaceOp {
                path: diamond(Vec2::new(32.0, 32.0), 20.0),
                fill: Some(Rgba::opaque(255, 0, 0)),
                stroke: None,
            }],
        };
        let pixmap = rasterize(&surface).unwrap();
        assert_eq!(pixmap.width(), 64);
        assert_eq!(pixmap.height(), 64);
        // Interior is painted, far corners are untouched.
        assert_eq!(pixel(&pixmap, 32, 32), [255, 0, 0, 255]);
        assert_eq!(pixel(&pixmap, 2, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn degenerate_paths_are_skipped() {
        let surface = VectorSurface {
            size: Vec2::new(8.0, 8.0),
            ops: vec![SurfaceOp {
                path: SmoothPath { start: Vec2::new(4.0, 4.0), quads: Vec::new() },
                fill: Some(Rgba::opaque(255, 255, 255)),
                stroke: None,
            }],
        };
        let pixmap = rasterize(&surface).unwrap();
        assert_eq!(pixel(&pixmap, 4, 4), [0, 0, 0, 0]);
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        let surface = VectorSurface { size: Vec2::zero(), ops: Vec::new() };
        match rasterize(&surface) {
            Err(ConvertError::BadBitmapSize { width: 0, height: 0 }) => {}
            other => panic!("expected BadBitmapSize, got {other:?}"),
        }
    }
}
