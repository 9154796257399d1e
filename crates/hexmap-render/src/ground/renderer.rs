use std::cell::Cell;
use std::rc::Rc;

use hexmap_grid::{HexLayout, Rect, Vec2};
use tiny_skia::{FilterQuality, Paint, Pattern, Pixmap, SpreadMode, Transform};

use crate::raster::cache::{CacheEntry, RasterCache};
use crate::raster::convert::SurfaceConverter;
use crate::reactive::ListenerId;
use crate::viewbox::ViewBox;

use super::model::GroundModel;
use super::style::StyleTable;

/// Everything the ground renderer draws from: the tile model, the lattice,
/// and the style table.
#[derive(Debug)]
pub struct GroundScene {
    pub model: GroundModel,
    pub layout: HexLayout,
    pub styles: StyleTable,
}

/// Result of one frame's ground draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawOutcome {
    /// The cached bitmap was blitted onto the target.
    Blitted,
    /// No cache entry yet; a rebuild was requested or is in flight, and
    /// this frame drew nothing for the ground layer.
    Pending,
}

/// Blits the cached ground bitmap against the view box every frame and
/// owns the cache's invalidation wiring.
///
/// Tile-grid mutations, viewport resizes, and zoom changes rebuild the
/// bitmap; panning only changes the blit rectangle.
pub struct GroundRenderer {
    cache: RasterCache,
    revision_listener: Option<ListenerId>,
    size_listener: Option<ListenerId>,
    scale_listener: Option<ListenerId>,
}

impl Default for GroundRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GroundRenderer {
    pub fn new() -> Self {
        Self::with_cache(RasterCache::new())
    }

    pub fn with_cache(cache: RasterCache) -> Self {
        Self {
            cache,
            revision_listener: None,
            size_listener: None,
            scale_listener: None,
        }
    }

    pub fn cache(&self) -> &RasterCache {
        &self.cache
    }

    /// Subscribes the cache's invalidation triggers on the model revision
    /// and the view-box size and scale. Balanced by
    /// [`deactivate`](GroundRenderer::deactivate).
    pub fn activate(&mut self, scene: &mut GroundScene, view: &mut ViewBox) {
        let cache = self.cache.clone();
        self.revision_listener = Some(scene.model.revision.subscribe(move |_| cache.invalidate()));
        let cache = self.cache.clone();
        self.size_listener = Some(view.size.subscribe(move |_| cache.invalidate()));
        let cache = self.cache.clone();
        self.scale_listener = Some(view.scale.subscribe(move |_| cache.invalidate()));
    }

    /// Unsubscribes the listeners registered by `activate`.
    pub fn deactivate(&mut self, scene: &mut GroundScene, view: &mut ViewBox) {
        if let Some(id) = self.revision_listener.take() {
            scene.model.revision.unsubscribe(id);
        }
        if let Some(id) = self.size_listener.take() {
            view.size.unsubscribe(id);
        }
        if let Some(id) = self.scale_listener.take() {
            view.scale.unsubscribe(id);
        }
    }

    /// Drops the cached ground bitmap; the next draw rebuilds it.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// Draws the visible part of the ground onto `target`.
    ///
    /// With no cache entry this requests a rebuild and reports
    /// [`DrawOutcome::Pending`]. This is a one-shot retry, not a poll loop: a
    /// synchronous converter completes within the call and the blit happens
    /// right away, an asynchronous one leaves this frame blank and the next
    /// draw finds the entry.
    pub fn draw(
        &mut self,
        scene: &GroundScene,
        view: &ViewBox,
        converter: &mut dyn SurfaceConverter,
        target: &mut Pixmap,
    ) -> DrawOutcome {
        if !self.cache.is_ready() {
            let ready = Rc::new(Cell::new(false));
            let flag = Rc::clone(&ready);
            self.cache.ensure(
                &scene.model,
                &scene.layout,
                &scene.styles,
                converter,
                move || flag.set(true),
            );
            if !ready.get() {
                return DrawOutcome::Pending;
            }
        }

        let pos = *view.coordinates.get();
        let size = *view.size.get();
        let zoom = *view.scale.get();

        let blitted = self.cache.with_entry(|entry| {
            let src = source_rect(pos, size, zoom, entry.source_scale);
            blit(entry, src, size, target);
        });

        match blitted {
            Some(()) => DrawOutcome::Blitted,
            // The entry was invalidated between ensure and here (stale
            // build consumed by a listener); treat like a blank frame.
            None => DrawOutcome::Pending,
        }
    }
}

/// Source rectangle in cache-bitmap space for a viewport.
fn source_rect(pos: Vec2, size: Vec2, zoom: f32, source_scale: f32) -> Rect {
    Rect::new(
        pos.x * source_scale,
        pos.y * source_scale,
        size.x * zoom * source_scale,
        size.y * zoom * source_scale,
    )
}

/// Clears `target` and stretches `src` (bitmap space) over the whole
/// destination rectangle.
fn blit(entry: &CacheEntry, src: Rect, dest_size: Vec2, target: &mut Pixmap) {
    target.fill(tiny_skia::Color::TRANSPARENT);
    if src.is_empty() || dest_size.x <= 0.0 || dest_size.y <= 0.0 {
        return;
    }

    let sx = dest_size.x / src.w;
    let sy = dest_size.y / src.h;
    // Maps bitmap space onto the destination: src.origin lands at (0, 0)
    // and src stretches across dest_size.
    let transform = Transform::from_translate(-src.x, -src.y).post_scale(sx, sy);
    let pattern = Pattern::new(
        entry.bitmap.as_ref(),
        SpreadMode::Pad,
        FilterQuality::Bilinear,
        1.0,
        transform,
    );
    let mut paint = Paint::default();
    paint.shader = pattern;
    paint.anti_alias = false;

    let Some(dest) = tiny_skia::Rect::from_xywh(0.0, 0.0, dest_size.x, dest_size.y) else {
        return;
    };
    target.fill_rect(dest, &paint, Transform::identity(), None);
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::ground::style::{GroundStyle, Rgba, StyleTable, TerrainId};
    use crate::raster::convert::{ConvertDone, SoftwareRasterizer};
    use crate::raster::surface::VectorSurface;

    const GRASS: TerrainId = TerrainId(1);

    fn scene() -> GroundScene {
        let layout = HexLayout::new(6, 5, 40.0);
        let mut model = GroundModel::new();
        for col in 0..6 {
            for row in 0..5 {
                model.place(layout.axial_from_offset(col, row), GRASS);
            }
        }
        let styles = StyleTable::new().with(GRASS, GroundStyle::filled(Rgba::opaque(30, 180, 60)));
        GroundScene { model, layout, styles }
    }

    fn target_for(view: &ViewBox) -> Pixmap {
        let size = *view.size.get();
        Pixmap::new(size.x as u32, size.y as u32).unwrap()
    }

    /// Converter that parks requests until the test completes them.
    #[derive(Default)]
    struct DeferredConverter {
        pending: Vec<(VectorSurface, ConvertDone)>,
    }

    impl DeferredConverter {
        fn complete_next(&mut self) {
            let (surface, done) = self.pending.remove(0);
            SoftwareRasterizer.convert(surface, done);
        }
    }

    impl SurfaceConverter for DeferredConverter {
        fn convert(&mut self, surface: VectorSurface, done: ConvertDone) {
            self.pending.push((surface, done));
        }
    }

    // ── blit geometry ─────────────────────────────────────────────────────

    #[test]
    fn source_rect_applies_the_cache_scale() {
        let src = source_rect(Vec2::new(100.0, 100.0), Vec2::new(200.0, 200.0), 1.0, 0.5);
        assert_eq!(src, Rect::new(50.0, 50.0, 100.0, 100.0));
        assert_eq!(src.max(), Vec2::new(150.0, 150.0));
    }

    #[test]
    fn source_rect_grows_with_zoom() {
        let src = source_rect(Vec2::zero(), Vec2::new(100.0, 50.0), 2.0, 1.0);
        assert_eq!(src, Rect::new(0.0, 0.0, 200.0, 100.0));
    }

    // ── frame loop ────────────────────────────────────────────────────────

    #[test]
    fn synchronous_converter_blits_on_the_first_draw() {
        let scene = scene();
        let view = ViewBox::new(Vec2::new(160.0, 120.0));
        let mut renderer = GroundRenderer::new();
        let mut converter = SoftwareRasterizer;
        let mut target = target_for(&view);

        let outcome = renderer.draw(&scene, &view, &mut converter, &mut target);
        assert_eq!(outcome, DrawOutcome::Blitted);
        // The viewport looks at the top-left of a fully tiled level.
        let p = target.pixel(80, 60).unwrap();
        assert!(p.alpha() > 0, "viewport center should be painted");
    }

    #[test]
    fn asynchronous_converter_blits_on_the_next_draw() {
        let scene = scene();
        let view = ViewBox::new(Vec2::new(160.0, 120.0));
        let mut renderer = GroundRenderer::new();
        let mut converter = DeferredConverter::default();
        let mut target = target_for(&view);

        assert_eq!(
            renderer.draw(&scene, &view, &mut converter, &mut target),
            DrawOutcome::Pending
        );
        // A frame with a build in flight requests nothing new.
        assert_eq!(
            renderer.draw(&scene, &view, &mut converter, &mut target),
            DrawOutcome::Pending
        );
        assert_eq!(converter.pending.len(), 1);

        converter.complete_next();
        assert_eq!(
            renderer.draw(&scene, &view, &mut converter, &mut target),
            DrawOutcome::Blitted
        );
    }

    // ── invalidation wiring ───────────────────────────────────────────────

    #[test]
    fn tile_mutation_invalidates_through_the_revision_listener() {
        let mut scene = scene();
        let mut view = ViewBox::new(Vec2::new(160.0, 120.0));
        let mut renderer = GroundRenderer::new();
        let mut converter = SoftwareRasterizer;
        let mut target = target_for(&view);

        renderer.activate(&mut scene, &mut view);
        renderer.draw(&scene, &view, &mut converter, &mut target);
        assert!(renderer.cache().is_ready());

        scene.model.place(scene.layout.axial_from_offset(0, 0), GRASS);
        assert!(renderer.cache().is_empty(), "mutation must drop the cache");

        assert_eq!(
            renderer.draw(&scene, &view, &mut converter, &mut target),
            DrawOutcome::Blitted
        );
    }

    #[test]
    fn zoom_and_resize_invalidate_but_pan_does_not() {
        let mut scene = scene();
        let mut view = ViewBox::new(Vec2::new(160.0, 120.0));
        let mut renderer = GroundRenderer::new();
        let mut converter = SoftwareRasterizer;
        let mut target = target_for(&view);

        renderer.activate(&mut scene, &mut view);
        renderer.draw(&scene, &view, &mut converter, &mut target);

        view.coordinates.set(Vec2::new(40.0, 20.0));
        assert!(renderer.cache().is_ready(), "panning only re-blits");

        view.scale.set(1.5);
        assert!(renderer.cache().is_empty(), "zoom rebuilds the bitmap");

        renderer.draw(&scene, &view, &mut converter, &mut target);
        assert!(renderer.cache().is_ready());
        view.size.set(Vec2::new(320.0, 240.0));
        assert!(renderer.cache().is_empty(), "resize rebuilds the bitmap");
    }

    #[test]
    fn deactivate_unhooks_the_listeners() {
        let mut scene = scene();
        let mut view = ViewBox::new(Vec2::new(160.0, 120.0));
        let mut renderer = GroundRenderer::new();
        let mut converter = SoftwareRasterizer;
        let mut target = target_for(&view);

        renderer.activate(&mut scene, &mut view);
        renderer.draw(&scene, &view, &mut converter, &mut target);
        renderer.deactivate(&mut scene, &mut view);

        scene.model.place(scene.layout.axial_from_offset(1, 1), GRASS);
        view.scale.set(2.0);
        assert!(renderer.cache().is_ready(), "detached renderer keeps its entry");
    }
}
