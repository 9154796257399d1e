use core::fmt;
use std::cell::RefCell;
use std::rc::Rc;

use hexmap_grid::HexLayout;
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::ground::model::GroundModel;
use crate::ground::style::StyleTable;
use crate::ground::tracer;

use super::convert::SurfaceConverter;
use super::surface::VectorSurface;

/// Default bitmap caps, matching common canvas/texture limits.
pub const MAX_BITMAP_WIDTH: u32 = 8000;
pub const MAX_BITMAP_HEIGHT: u32 = 8000;

/// Finished raster entry: the ground bitmap plus the factor mapping source
/// path coordinates to bitmap pixels (≤ 1.0 when downsampled).
#[derive(Clone)]
pub struct CacheEntry {
    pub bitmap: Pixmap,
    pub source_scale: f32,
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("width", &self.bitmap.width())
            .field("height", &self.bitmap.height())
            .field("source_scale", &self.source_scale)
            .finish()
    }
}

enum CacheState {
    Empty,
    Building { build: u64 },
    Ready(CacheEntry),
}

struct CacheInner {
    state: CacheState,
    max_width: u32,
    max_height: u32,
    next_build: u64,
    /// Invalidation that arrived while a build was in flight. Applied after
    /// the build completes to `Ready` and its callback has run, so the next
    /// `ensure` starts a fresh build.
    pending_invalidate: bool,
}

impl CacheInner {
    fn is_current_build(&self, build: u64) -> bool {
        matches!(self.state, CacheState::Building { build: b } if b == build)
    }
}

/// Shared handle to the ground raster cache.
///
/// State machine: `Empty → Building → Ready`, and `Ready → Empty` on
/// invalidation. A build, once started, always completes to `Ready`. Its
/// result may be stale if the level changed meanwhile, in which case the
/// deferred invalidation empties the cache right after the ready callback
/// and the next [`ensure`](RasterCache::ensure) rebuilds. At most one build
/// is ever in flight.
#[derive(Clone)]
pub struct RasterCache {
    inner: Rc<RefCell<CacheInner>>,
}

impl fmt::Debug for RasterCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        let state = match &inner.state {
            CacheState::Empty => "Empty",
            CacheState::Building { .. } => "Building",
            CacheState::Ready(_) => "Ready",
        };
        f.debug_struct("RasterCache").field("state", &state).finish()
    }
}

impl Default for RasterCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterCache {
    pub fn new() -> Self {
        Self::with_limits(MAX_BITMAP_WIDTH, MAX_BITMAP_HEIGHT)
    }

    /// A cache that downsamples its bitmap to fit `max_width`×`max_height`.
    pub fn with_limits(max_width: u32, max_height: u32) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CacheInner {
                state: CacheState::Empty,
                max_width,
                max_height,
                next_build: 0,
                pending_invalidate: false,
            })),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.inner.borrow().state, CacheState::Ready(_))
    }

    pub fn is_building(&self) -> bool {
        matches!(self.inner.borrow().state, CacheState::Building { .. })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.inner.borrow().state, CacheState::Empty)
    }

    /// Drops the current entry so the next `ensure` rebuilds.
    ///
    /// While a build is in flight the drop is deferred: the build still
    /// completes to `Ready` (never `Building → Empty`), and the entry is
    /// emptied right after the ready callback has observed it.
    pub fn invalidate(&self) {
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            CacheState::Ready(_) => inner.state = CacheState::Empty,
            CacheState::Building { .. } => inner.pending_invalidate = true,
            CacheState::Empty => {}
        }
    }

    /// Forces the cache back to `Empty`, abandoning any in-flight build.
    ///
    /// The cache defines no conversion timeout; an external policy that
    /// decides a build is stuck calls this. A late completion from the
    /// abandoned build is discarded by its generation id.
    pub fn reset(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.state = CacheState::Empty;
        inner.pending_invalidate = false;
    }

    /// Borrows the current entry, if any.
    ///
    /// `f` must not call back into the cache; the internal borrow is held
    /// while it runs.
    pub fn with_entry<R>(&self, f: impl FnOnce(&CacheEntry) -> R) -> Option<R> {
        let inner = self.inner.borrow();
        match &inner.state {
            CacheState::Ready(entry) => Some(f(entry)),
            _ => None,
        }
    }

    pub fn source_scale(&self) -> Option<f32> {
        self.with_entry(|entry| entry.source_scale)
    }

    /// Guarantees a usable entry, eventually.
    ///
    /// - `Ready`: `on_ready` is called synchronously, nothing else happens.
    /// - `Building`: no-op; the in-flight build's own callback is
    ///   responsible for any pending redraw.
    /// - `Empty`: traces the ground, records the vector surface, and hands
    ///   it to `converter`; on completion the entry is replaced atomically
    ///   before `on_ready` runs.
    ///
    /// A trace configuration error aborts the rebuild and leaves the cache
    /// `Empty`; so does a conversion failure. Neither reaches the caller:
    /// both are operator-facing log events.
    pub fn ensure(
        &self,
        model: &GroundModel,
        layout: &HexLayout,
        styles: &StyleTable,
        converter: &mut dyn SurfaceConverter,
        on_ready: impl FnOnce() + 'static,
    ) {
        let build = {
            let mut inner = self.inner.borrow_mut();
            if matches!(inner.state, CacheState::Building { .. }) {
                return;
            }
            if matches!(inner.state, CacheState::Ready(_)) {
                drop(inner);
                on_ready();
                return;
            }
            let build = inner.next_build;
            inner.next_build += 1;
            inner.pending_invalidate = false;
            inner.state = CacheState::Building { build };
            build
        };

        log::debug!("rebuilding ground raster cache (build {build})");
        let regions = match tracer::trace_ground(model, layout, styles) {
            Ok(regions) => regions,
            Err(err) => {
                log::error!("ground trace failed: {err}");
                let mut inner = self.inner.borrow_mut();
                if inner.is_current_build(build) {
                    inner.state = CacheState::Empty;
                    inner.pending_invalidate = false;
                }
                return;
            }
        };
        let surface = VectorSurface::from_regions(&regions, layout.max_extents());

        let inner = Rc::clone(&self.inner);
        converter.convert(
            surface,
            Box::new(move |result| {
                let mut guard = inner.borrow_mut();
                if !guard.is_current_build(build) {
                    // A reset retired this build while the converter ran.
                    log::warn!("discarding conversion result of abandoned build {build}");
                    return;
                }
                match result {
                    Ok(bitmap) => {
                        let entry = downsampled(bitmap, guard.max_width, guard.max_height);
                        log::debug!(
                            "ground cache ready: {}x{} at scale {} (build {build})",
                            entry.bitmap.width(),
                            entry.bitmap.height(),
                            entry.source_scale
                        );
                        guard.state = CacheState::Ready(entry);
                        drop(guard);
                        on_ready();
                        // Level changed while building: the callback saw the
                        // stale entry, now drop it so the next ensure rebuilds.
                        let mut guard = inner.borrow_mut();
                        if guard.pending_invalidate {
                            guard.pending_invalidate = false;
                            if matches!(guard.state, CacheState::Ready(_)) {
                                guard.state = CacheState::Empty;
                            }
                        }
                    }
                    Err(err) => {
                        log::error!("ground surface conversion failed: {err}");
                        guard.pending_invalidate = false;
                        guard.state = CacheState::Empty;
                    }
                }
            }),
        );
    }
}

/// Fits `bitmap` under the caps, preserving aspect ratio.
///
/// The scale is chosen width-first: shrink to the width cap, and only if
/// the height still exceeds its cap recompute against the height, never
/// both independently, so aspect is preserved deterministically.
fn downsampled(bitmap: Pixmap, max_width: u32, max_height: u32) -> CacheEntry {
    let scale = downsample_scale(bitmap.width(), bitmap.height(), max_width, max_height);
    if scale >= 1.0 {
        return CacheEntry { bitmap, source_scale: 1.0 };
    }

    let width = ((bitmap.width() as f32 * scale) as u32).max(1);
    let height = ((bitmap.height() as f32 * scale) as u32).max(1);
    let Some(mut out) = Pixmap::new(width, height) else {
        // Unreachable for caps below the allocator's limits; keep the
        // oversized original rather than lose the build.
        log::error!("could not allocate {width}x{height} downsample target");
        return CacheEntry { bitmap, source_scale: 1.0 };
    };

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    out.draw_pixmap(
        0,
        0,
        bitmap.as_ref(),
        &paint,
        Transform::from_scale(scale, scale),
        None,
    );
    CacheEntry { bitmap: out, source_scale: scale }
}

fn downsample_scale(width: u32, height: u32, max_width: u32, max_height: u32) -> f32 {
    let mut scale = 1.0;
    if width > max_width {
        scale = max_width as f32 / width as f32;
    }
    if height as f32 * scale > max_height as f32 {
        scale = max_height as f32 / height as f32;
    }
    scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::ground::style::{GroundStyle, Rgba, StyleTable, TerrainId};
    use crate::raster::convert::{ConvertDone, SoftwareRasterizer};

    const GRASS: TerrainId = TerrainId(7);

    fn scene() -> (GroundModel, HexLayout, StyleTable) {
        let layout = HexLayout::new(4, 4, 10.0);
        let mut model = GroundModel::new();
        model.place(layout.axial_from_offset(1, 1), GRASS);
        model.place(layout.axial_from_offset(2, 1), GRASS);
        let styles = StyleTable::new().with(GRASS, GroundStyle::filled(Rgba::opaque(0, 200, 0)));
        (model, layout, styles)
    }

    /// Converter that parks requests until the test completes them.
    #[derive(Default)]
    struct DeferredConverter {
        pending: Vec<(VectorSurface, ConvertDone)>,
    }

    impl DeferredConverter {
        fn complete_next(&mut self) {
            let (surface, done) = self.pending.remove(0);
            let mut rasterizer = SoftwareRasterizer;
            rasterizer.convert(surface, done);
        }
    }

    impl SurfaceConverter for DeferredConverter {
        fn convert(&mut self, surface: VectorSurface, done: ConvertDone) {
            self.pending.push((surface, done));
        }
    }

    // ── state machine ─────────────────────────────────────────────────────

    #[test]
    fn synchronous_build_ends_ready() {
        let (model, layout, styles) = scene();
        let cache = RasterCache::new();
        let mut converter = SoftwareRasterizer;
        let ready = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ready);
        cache.ensure(&model, &layout, &styles, &mut converter, move || flag.set(true));
        assert!(ready.get());
        assert!(cache.is_ready());
        assert_eq!(cache.source_scale(), Some(1.0));
    }

    #[test]
    fn ensure_on_a_ready_cache_calls_back_immediately() {
        let (model, layout, styles) = scene();
        let cache = RasterCache::new();
        let mut converter = SoftwareRasterizer;
        cache.ensure(&model, &layout, &styles, &mut converter, || {});

        let called = Rc::new(Cell::new(false));
        let flag = Rc::clone(&called);
        cache.ensure(&model, &layout, &styles, &mut converter, move || flag.set(true));
        assert!(called.get());
    }

    #[test]
    fn at_most_one_build_in_flight() {
        let (model, layout, styles) = scene();
        let cache = RasterCache::new();
        let mut converter = DeferredConverter::default();

        cache.ensure(&model, &layout, &styles, &mut converter, || {});
        assert!(cache.is_building());
        // Second ensure while building is a no-op.
        cache.ensure(&model, &layout, &styles, &mut converter, || {});
        assert_eq!(converter.pending.len(), 1, "exactly one rebuild may execute");

        converter.complete_next();
        assert!(cache.is_ready());
    }

    #[test]
    fn invalidate_drops_a_ready_entry() {
        let (model, layout, styles) = scene();
        let cache = RasterCache::new();
        let mut converter = SoftwareRasterizer;
        cache.ensure(&model, &layout, &styles, &mut converter, || {});
        assert!(cache.is_ready());
        cache.invalidate();
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_during_build_yields_stale_then_empty() {
        let (model, layout, styles) = scene();
        let cache = RasterCache::new();
        let mut converter = DeferredConverter::default();

        let observed_ready = Rc::new(Cell::new(false));
        let flag = Rc::clone(&observed_ready);
        let probe = cache.clone();
        cache.ensure(&model, &layout, &styles, &mut converter, move || {
            // The build completes to Ready even though it was invalidated.
            flag.set(probe.is_ready());
        });

        cache.invalidate();
        assert!(cache.is_building(), "building never transitions to empty");

        converter.complete_next();
        assert!(observed_ready.get(), "callback observed the stale entry");
        assert!(cache.is_empty(), "deferred invalidation applied after the callback");
    }

    #[test]
    fn missing_style_leaves_the_cache_empty() {
        let (model, layout, _) = scene();
        let empty_styles = StyleTable::new();
        let cache = RasterCache::new();
        let mut converter = DeferredConverter::default();
        let called = Rc::new(Cell::new(false));
        let flag = Rc::clone(&called);
        cache.ensure(&model, &layout, &empty_styles, &mut converter, move || flag.set(true));
        assert!(cache.is_empty());
        assert!(!called.get());
        assert!(converter.pending.is_empty(), "no surface reaches the converter");
    }

    #[test]
    fn reset_abandons_a_stuck_build_and_discards_its_result() {
        let (model, layout, styles) = scene();
        let cache = RasterCache::new();
        let mut converter = DeferredConverter::default();

        cache.ensure(&model, &layout, &styles, &mut converter, || {});
        assert!(cache.is_building());
        cache.reset();
        assert!(cache.is_empty());

        // The stuck converter eventually wakes up; its result must not
        // resurrect the abandoned build.
        converter.complete_next();
        assert!(cache.is_empty());
    }

    // ── downsampling ──────────────────────────────────────────────────────

    #[test]
    fn scale_is_one_under_the_caps() {
        assert_eq!(downsample_scale(4000, 4000, 8000, 8000), 1.0);
    }

    #[test]
    fn width_overflow_scales_width_first() {
        assert_eq!(downsample_scale(16000, 4000, 8000, 8000), 0.5);
    }

    #[test]
    fn height_overflow_recomputes_against_height() {
        assert_eq!(downsample_scale(4000, 16000, 8000, 8000), 0.5);
        // Width fits after the width pass, height still does not.
        assert_eq!(downsample_scale(16000, 32000, 8000, 8000), 0.25);
    }

    #[test]
    fn downsample_preserves_aspect_within_rounding() {
        for (w, h) in [(16000, 4000), (9000, 8500), (8001, 24000), (20000, 10000)] {
            let scale = downsample_scale(w, h, 8000, 8000);
            let rw = (w as f32 * scale) as u32;
            let rh = (h as f32 * scale) as u32;
            assert!(rw <= 8000 && rh <= 8000, "{w}x{h} -> {rw}x{rh}");
            let before = w as f32 / h as f32;
            let after = rw as f32 / rh as f32;
            assert!((before - after).abs() / before < 0.01, "{w}x{h}: {before} vs {after}");
        }
    }

    #[test]
    fn downsampled_bitmap_reports_its_scale() {
        let bitmap = Pixmap::new(400, 100).unwrap();
        let entry = downsampled(bitmap, 100, 100);
        assert_eq!(entry.source_scale, 0.25);
        assert_eq!(entry.bitmap.width(), 100);
        assert_eq!(entry.bitmap.height(), 25);
    }
}
