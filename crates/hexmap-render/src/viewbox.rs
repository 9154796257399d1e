use hexmap_grid::Vec2;

use crate::reactive::DirtyProperty;

/// The scrollable, zoomable window onto the level.
///
/// Every field is a dirty property: the blitter reads them each frame, and
/// the ground renderer subscribes to `scale` as a cache-invalidation
/// trigger. Whoever reacts to a change cleans the flag.
#[derive(Debug)]
pub struct ViewBox {
    /// World-space top-left of the visible area.
    pub coordinates: DirtyProperty<Vec2>,
    /// Viewport size in world units at scale 1.0.
    pub size: DirtyProperty<Vec2>,
    /// Zoom factor; values above 1.0 show more of the level.
    pub scale: DirtyProperty<f32>,
}

impl ViewBox {
    pub fn new(size: Vec2) -> Self {
        Self {
            coordinates: DirtyProperty::new(Vec2::zero()),
            size: DirtyProperty::new(size),
            scale: DirtyProperty::new(1.0),
        }
    }
}
