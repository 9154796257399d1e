use crate::{AxialCoord, Corner, Vec2};

const SQRT3: f32 = 1.732_050_8;

/// Axial displacement across each edge, clockwise from north.
///
/// Index `i` is the edge clockwise-adjacent to corner `i`: a hex corner sits
/// between two edges, and the walk always probes the edge that follows the
/// corner in clockwise order (UpperLeft→N, UpperRight→NE, Right→SE,
/// LowerRight→S, LowerLeft→SW, Left→NW).
const EDGE_OFFSETS: [(i32, i32); 6] = [
    (0, -1), // N
    (1, -1), // NE
    (1, 0),  // SE
    (0, 1),  // S
    (-1, 1), // SW
    (-1, 0), // NW
];

/// Flat-top hex lattice: static topology queries and world-space geometry.
///
/// `cols`/`rows` describe the level's extent in odd-q offset columns (odd
/// columns lean half a tile down); `radius` is the center-to-corner
/// distance in world units. Coordinate queries are pure; positions outside
/// the level are valid inputs and simply have no occupants.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HexLayout {
    cols: u32,
    rows: u32,
    radius: f32,
}

impl HexLayout {
    pub fn new(cols: u32, rows: u32, radius: f32) -> Self {
        debug_assert!(radius > 0.0, "tile radius must be positive");
        Self { cols, rows, radius }
    }

    #[inline]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// The neighbor across the edge clockwise-adjacent to `corner`.
    #[inline]
    pub fn neighbor_toward(&self, pos: AxialCoord, corner: Corner) -> AxialCoord {
        let (dq, dr) = EDGE_OFFSETS[corner.index() as usize];
        pos.offset_by(dq, dr)
    }

    /// All six neighbors in fixed clockwise order starting north.
    pub fn neighbors(&self, pos: AxialCoord) -> [AxialCoord; 6] {
        EDGE_OFFSETS.map(|(dq, dr)| pos.offset_by(dq, dr))
    }

    /// World-space center of a tile.
    pub fn tile_center(&self, pos: AxialCoord) -> Vec2 {
        let q = pos.q as f32;
        let r = pos.r as f32;
        Vec2::new(
            self.radius * (1.0 + 1.5 * q),
            SQRT3 * self.radius * (r + q * 0.5 + 0.5),
        )
    }

    /// World-space position of one corner of a tile.
    pub fn corner_point(&self, pos: AxialCoord, corner: Corner) -> Vec2 {
        // Corner 0 (UpperLeft) sits at 240° measured clockwise from +x in
        // y-down screen space; each further corner adds 60°.
        let theta = (240.0 + 60.0 * corner.index() as f32).to_radians();
        let center = self.tile_center(pos);
        center + Vec2::new(theta.cos(), theta.sin()) * self.radius
    }

    /// Pixel bounding box of the whole level.
    pub fn max_extents(&self) -> Vec2 {
        let cols = self.cols as f32;
        let rows = self.rows as f32;
        // Odd columns lean half a step down, stretching the box when the
        // level is more than one column wide.
        let lean = if self.cols > 1 { 0.5 } else { 0.0 };
        Vec2::new(
            self.radius * (1.5 * (cols - 1.0) + 2.0),
            SQRT3 * self.radius * (rows + lean),
        )
    }

    /// Axial coordinate of the cell at odd-q offset position `(col, row)`.
    ///
    /// Level data addresses tiles in offset columns; the renderer and the
    /// walk work in axial space where neighbor arithmetic is uniform.
    pub fn axial_from_offset(&self, col: i32, row: i32) -> AxialCoord {
        AxialCoord::new(col, row - col.div_euclid(2))
    }
}
