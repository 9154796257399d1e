use thiserror::Error;

use crate::ground::style::TerrainId;

/// Failures surfaced at the boundary of a ground rebuild.
///
/// None of these cross into the per-frame blit path; a frame without a
/// cache entry simply draws nothing for the ground layer.
#[derive(Debug, Error)]
pub enum GroundError {
    /// A tile's terrain type has no entry in the style table. Fatal to the
    /// trace run: the rebuild is aborted and the cache stays empty.
    #[error("no ground style registered for terrain {0:?}")]
    MissingStyle(TerrainId),

    /// No exposed start tile although tiles remain. Geometrically
    /// unreachable for any real tile placement; kept as a defensive abort
    /// of the partition loop.
    #[error("no exposed boundary tile among {remaining} remaining tiles")]
    NoBoundaryTile { remaining: usize },
}

/// Failure of the delegated vector-surface-to-bitmap conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The requested surface size cannot back a bitmap (zero or past the
    /// allocator's limits).
    #[error("cannot allocate a {width}x{height} bitmap for the ground surface")]
    BadBitmapSize { width: u32, height: u32 },
}
