use hexmap_grid::{AxialCoord, Chessboard};

use crate::reactive::DirtyProperty;

use super::style::TerrainId;

/// Stable handle of one placed tile. Ids are never reused, so iteration
/// order over live tiles matches placement order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TileId(u32);

/// One hex ground tile: a lattice position and a terrain type, immutable
/// once placed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Tile {
    pub position: AxialCoord,
    pub terrain: TerrainId,
}

/// The ground's tile collection plus its spatial index.
///
/// Placement and removal are level-lifecycle operations; the tracer only
/// reads. Every mutation bumps `revision`, the dirty signal renderers
/// subscribe to for cache invalidation.
#[derive(Debug)]
pub struct GroundModel {
    tiles: Vec<Option<Tile>>,
    board: Chessboard<TileId>,
    live: usize,
    /// Bumped on every place/remove.
    pub revision: DirtyProperty<u64>,
}

impl Default for GroundModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GroundModel {
    pub fn new() -> Self {
        Self {
            tiles: Vec::new(),
            board: Chessboard::new(),
            live: 0,
            revision: DirtyProperty::new(0),
        }
    }

    /// Places a tile and registers it on the chessboard.
    pub fn place(&mut self, position: AxialCoord, terrain: TerrainId) -> TileId {
        let id = TileId(self.tiles.len() as u32);
        self.tiles.push(Some(Tile { position, terrain }));
        self.board.insert(position, id);
        self.live += 1;
        self.bump_revision();
        id
    }

    /// Removes a tile; the id becomes permanently dead.
    pub fn remove(&mut self, id: TileId) -> bool {
        let Some(slot) = self.tiles.get_mut(id.0 as usize) else {
            return false;
        };
        let Some(tile) = slot.take() else {
            return false;
        };
        self.board.remove(tile.position, &id);
        self.live -= 1;
        self.bump_revision();
        true
    }

    #[inline]
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0 as usize).and_then(Option::as_ref)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live tiles in placement order.
    pub fn iter(&self) -> impl Iterator<Item = (TileId, &Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|t| (TileId(i as u32), t)))
    }

    /// Tiles standing on `pos`, in placement order.
    pub fn tiles_at(&self, pos: AxialCoord) -> impl Iterator<Item = (TileId, &Tile)> + '_ {
        self.board
            .occupants(pos)
            .iter()
            .filter_map(|&id| self.tile(id).map(|t| (id, t)))
    }

    /// Tiles of `terrain` standing on `pos`, in placement order.
    pub fn terrain_occupants_at(
        &self,
        pos: AxialCoord,
        terrain: TerrainId,
    ) -> impl Iterator<Item = TileId> + '_ {
        self.tiles_at(pos)
            .filter(move |(_, t)| t.terrain == terrain)
            .map(|(id, _)| id)
    }

    fn bump_revision(&mut self) {
        let next = *self.revision.get() + 1;
        self.revision.set(next);
    }
}
