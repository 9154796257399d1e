//! The ground layer: tile model, boundary tracing, and the cached
//! viewport renderer.

pub mod model;
pub mod renderer;
pub mod style;
pub mod tracer;

pub use model::{GroundModel, Tile, TileId};
pub use renderer::{DrawOutcome, GroundRenderer, GroundScene};
pub use style::{GroundStyle, Rgba, StrokeStyle, StyleTable, TerrainId};
pub use tracer::{SmoothPath, TracedRegion, trace_ground};
