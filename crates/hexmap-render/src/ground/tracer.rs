//! Region partition and boundary tracing.
//!
//! The tracer consumes the tile collection, the chessboard, and the lattice
//! topology, and emits one closed smooth path per maximal same-terrain
//! region. Regions come out background-first, discovery order otherwise,
//! ready to paint onto the offscreen surface in order.

use std::collections::VecDeque;

use hexmap_grid::{AxialCoord, Corner, HexLayout, Vec2};

use crate::error::GroundError;

use super::model::{GroundModel, Tile, TileId};
use super::style::{GroundStyle, StyleTable, TerrainId};

/// Closed smooth boundary curve: a start anchor plus quadratic segments as
/// `(control, end-anchor)` pairs.
///
/// Anchors are midpoints of consecutive traced points and controls are the
/// traced points themselves, which rounds off hex facets without pulling
/// the curve away from the traced topology.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothPath {
    pub start: Vec2,
    pub quads: Vec<(Vec2, Vec2)>,
}

impl SmoothPath {
    /// True when the final anchor returns exactly to the start point.
    pub fn is_closed(&self) -> bool {
        self.quads.last().is_some_and(|(_, end)| *end == self.start)
    }
}

/// One maximal connected same-terrain region with its traced boundary.
#[derive(Debug, Clone)]
pub struct TracedRegion {
    pub terrain: TerrainId,
    pub style: GroundStyle,
    /// Tiles flood-erased into this region, in discovery order.
    pub tiles: Vec<TileId>,
    /// Sampled boundary points, closing points included.
    pub points: Vec<Vec2>,
    /// Midpoint-smoothed closed curve through `points`.
    pub path: SmoothPath,
}

/// Partitions the ground into maximal same-terrain regions and walks each
/// region's exposed boundary into a closed smooth path.
///
/// A missing style entry aborts the whole trace. A remaining set with no
/// exposed tile (geometrically unreachable for real placements) is logged
/// and stops the partition loop; regions traced so far are kept.
pub fn trace_ground(
    model: &GroundModel,
    layout: &HexLayout,
    styles: &StyleTable,
) -> Result<Vec<TracedRegion>, GroundError> {
    let mut remaining: Vec<(TileId, Tile)> = model.iter().map(|(id, t)| (id, *t)).collect();
    let mut regions: Vec<TracedRegion> = Vec::new();

    while !remaining.is_empty() {
        let Some((start_id, start_tile)) = select_start_tile(model, layout, &remaining) else {
            log::error!(
                "{}",
                GroundError::NoBoundaryTile { remaining: remaining.len() }
            );
            break;
        };

        let style = *styles.get(start_tile.terrain)?;
        let tiles = flood_erase(model, layout, &mut remaining, start_id, start_tile);

        let Some(start_corner) = exposed_corner(model, layout, start_tile) else {
            // Cannot happen: the start tile has an exposed edge by selection.
            log::error!(
                "tile at {:?} has an exposed edge but no exposed corner; skipping region",
                start_tile.position
            );
            continue;
        };

        let points = walk_boundary(model, layout, start_id, start_tile, start_corner, &style);
        let path = smooth_closed(&points);

        log::debug!(
            "traced region of terrain {:?}: {} tiles, {} boundary points",
            start_tile.terrain,
            tiles.len(),
            points.len()
        );

        regions.push(TracedRegion {
            terrain: start_tile.terrain,
            style,
            tiles,
            points,
            path,
        });
    }

    // Paint order: background regions first, discovery order otherwise.
    regions.sort_by_key(|r| !r.style.background);
    Ok(regions)
}

/// First tile in `remaining` with at least one exposed edge (fewer than six
/// same-terrain neighbors).
fn select_start_tile(
    model: &GroundModel,
    layout: &HexLayout,
    remaining: &[(TileId, Tile)],
) -> Option<(TileId, Tile)> {
    remaining
        .iter()
        .find(|(_, tile)| {
            layout
                .neighbors(tile.position)
                .iter()
                .any(|&n| model.terrain_occupants_at(n, tile.terrain).next().is_none())
        })
        .copied()
}

/// Breadth-first erases the same-terrain connected component containing
/// `start` from `remaining`, returning the erased ids in discovery order.
fn flood_erase(
    model: &GroundModel,
    layout: &HexLayout,
    remaining: &mut Vec<(TileId, Tile)>,
    start: TileId,
    start_tile: Tile,
) -> Vec<TileId> {
    let terrain = start_tile.terrain;
    let mut queue = VecDeque::from([start]);
    let mut region = Vec::new();

    while let Some(id) = queue.pop_front() {
        // Tiles already erased (or queued twice) fall through here.
        let Some(i) = remaining.iter().position(|(rid, _)| *rid == id) else {
            continue;
        };
        let (_, tile) = remaining.remove(i);
        region.push(id);

        for n in layout.neighbors(tile.position) {
            for nid in model.terrain_occupants_at(n, terrain) {
                if remaining.iter().any(|(rid, _)| *rid == nid) {
                    queue.push_back(nid);
                }
            }
        }
    }

    region
}

/// First corner (in fixed clockwise order) whose corner-adjacent cell holds
/// no same-terrain occupant. Exists whenever the tile has an exposed edge.
fn exposed_corner(model: &GroundModel, layout: &HexLayout, tile: Tile) -> Option<Corner> {
    Corner::ALL
        .into_iter()
        .find(|&c| occupant_across(model, layout, tile.position, c, tile.terrain).is_none())
}

#[inline]
fn occupant_across(
    model: &GroundModel,
    layout: &HexLayout,
    pos: AxialCoord,
    corner: Corner,
    terrain: TerrainId,
) -> Option<TileId> {
    model
        .terrain_occupants_at(layout.neighbor_toward(pos, corner), terrain)
        .next()
}

/// Walks the region perimeter as a bounded state machine over
/// `(tile, corner)`.
///
/// Each step either rotates the corner clockwise (the adjacent cell is
/// empty) or crosses into the found neighbor, resuming at `corner + 4` in
/// its frame. The walk terminates on return to the starting state, or when
/// a full rotation closes the loop without a crossing. Sampled points are
/// literal corners or tile centers depending on the style.
fn walk_boundary(
    model: &GroundModel,
    layout: &HexLayout,
    start_id: TileId,
    start_tile: Tile,
    start_corner: Corner,
    style: &GroundStyle,
) -> Vec<Vec2> {
    let terrain = start_tile.terrain;
    let sample_corners = style.render_corners;

    let mut points = Vec::new();
    points.push(if sample_corners {
        layout.corner_point(start_tile.position, start_corner)
    } else {
        layout.tile_center(start_tile.position)
    });

    let mut cur_id = start_id;
    let mut cur_pos = start_tile.position;
    let mut corner = start_corner;

    // Every iteration consumes at most five rotations plus one crossing, and
    // the walk revisits no `(tile, corner)` state before closing; the cap
    // only guards against a corrupted spatial index.
    let max_steps = model.len() * 6 + 6;

    for _ in 0..max_steps {
        // Probe across the current corner's edge; rotate clockwise until an
        // occupant appears, the rotation runs out of corners, or the walk
        // is back at its starting state.
        let rotation_end = corner.offset(5);
        let mut found = occupant_across(model, layout, cur_pos, corner, terrain);
        let mut closed_by_rotation = false;

        while found.is_none() && corner != rotation_end {
            corner = corner.clockwise();
            if cur_id == start_id && corner == start_corner {
                closed_by_rotation = true;
                break;
            }
            found = occupant_across(model, layout, cur_pos, corner, terrain);
            if sample_corners {
                points.push(layout.corner_point(cur_pos, corner));
            }
        }

        let at_start = cur_id == start_id && corner == start_corner;
        let Some(next_id) = found.filter(|_| !at_start && !closed_by_rotation) else {
            // Perimeter closed along the current tile without crossing.
            break;
        };

        // Cross the edge: the corner just left maps to `corner + 4` in the
        // neighbor's frame.
        let Some(next_tile) = model.tile(next_id) else {
            log::error!("chessboard points at a destroyed tile; aborting walk");
            break;
        };
        cur_id = next_id;
        cur_pos = next_tile.position;
        corner = corner.offset(4);

        if !sample_corners && cur_id != start_id {
            points.push(layout.tile_center(cur_pos));
        }

        if cur_id == start_id && corner == start_corner {
            break;
        }
    }

    // Close the loop: corner sampling may already have landed back on the
    // first point; repeat the first two points so the smoothing pass wraps.
    let first = points[0];
    if !sample_corners || points.last() != Some(&first) {
        points.push(first);
    }
    let second = points[1];
    points.push(second);

    points
}

/// Converts the closed point sequence into a smooth curve: anchors at the
/// midpoint of each consecutive pair, the first point of the pair as the
/// quadratic control.
fn smooth_closed(points: &[Vec2]) -> SmoothPath {
    if points.len() < 2 {
        return SmoothPath {
            start: points.first().copied().unwrap_or(Vec2::zero()),
            quads: Vec::new(),
        };
    }
    let start = points[0].midpoint(points[1]);
    let mut quads = Vec::with_capacity(points.len() - 2);
    for i in 1..points.len() - 1 {
        quads.push((points[i], points[i].midpoint(points[i + 1])));
    }
    SmoothPath { start, quads }
}
