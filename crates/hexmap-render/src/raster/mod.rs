//! Offscreen rasterization of traced boundaries: the vector surface, the
//! delegated conversion seam, and the bitmap cache.

pub mod cache;
pub mod convert;
pub mod surface;

pub use cache::{CacheEntry, RasterCache};
pub use convert::{ConvertDone, SoftwareRasterizer, SurfaceConverter};
pub use surface::{SurfaceOp, VectorSurface};
