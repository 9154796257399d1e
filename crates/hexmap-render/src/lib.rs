//! Boundary-traced, raster-cached hex tile map renderer.
//!
//! The ground of a level is a grid of typed hex tiles. Rather than
//! painting every tile each frame, the renderer merges clusters of
//! same-terrain tiles into smooth vector outlines, rasterizes the result
//! once into an offscreen bitmap, and serves every frame by cropping that
//! bitmap against the current view box.
//!
//! ```text
//!   tile mutation ──► DirtyProperty ──► RasterCache::invalidate()
//!                                             │
//!   GroundRenderer::draw() ──► ensure() ──► trace_ground() ──► VectorSurface
//!                                             │
//!                               SurfaceConverter (async) ──► bitmap + scale
//!                                             │
//!                               viewport crop-blit every frame
//! ```
//!
//! **[`reactive`]**: `DirtyProperty`, the observable value box driving
//! invalidation.
//!
//! **[`ground`]**: tile model, styles, the boundary tracer, and the
//! viewport renderer.
//!
//! **[`raster`]**: the offscreen vector surface, the delegated conversion
//! seam, and the bitmap cache state machine.
//!
//! **[`viewbox`]**: the scrollable, zoomable window the blitter reads.
//!
//! **[`logging`]**: idempotent `env_logger` setup for binaries.

pub mod error;
pub mod ground;
pub mod logging;
pub mod raster;
pub mod reactive;
pub mod viewbox;

pub use error::{ConvertError, GroundError};
pub use ground::{
    DrawOutcome, GroundModel, GroundRenderer, GroundScene, GroundStyle, Rgba, StyleTable,
    TerrainId,
};
pub use raster::{RasterCache, SoftwareRasterizer, SurfaceConverter};
pub use viewbox::ViewBox;
