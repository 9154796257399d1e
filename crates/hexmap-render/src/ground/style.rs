use std::collections::HashMap;

use crate::error::GroundError;

/// Terrain type identifier, assigned by the level format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TerrainId(pub u32);

/// Straight (non-premultiplied) 8-bit RGBA color.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

/// Outline paint of a region boundary.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgba,
    pub width: f32,
}

/// How regions of one terrain type are traced and painted.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GroundStyle {
    /// Sample literal corner points while walking the boundary (`true`) or
    /// tile centers (`false`). Corner sampling hugs the tile outline;
    /// center sampling produces a slimmer blob inside it.
    pub render_corners: bool,
    /// Paint behind all non-background regions.
    pub background: bool,
    pub fill: Option<Rgba>,
    pub stroke: Option<StrokeStyle>,
}

impl GroundStyle {
    pub const fn filled(fill: Rgba) -> Self {
        Self {
            render_corners: true,
            background: false,
            fill: Some(fill),
            stroke: None,
        }
    }
}

/// Terrain-id → style lookup table.
///
/// A missing entry is a configuration error surfaced as
/// [`GroundError::MissingStyle`], never a silent skip.
#[derive(Debug, Default, Clone)]
pub struct StyleTable {
    styles: HashMap<TerrainId, GroundStyle>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, terrain: TerrainId, style: GroundStyle) {
        self.styles.insert(terrain, style);
    }

    /// Builder-style registration for static tables.
    pub fn with(mut self, terrain: TerrainId, style: GroundStyle) -> Self {
        self.insert(terrain, style);
        self
    }

    pub fn get(&self, terrain: TerrainId) -> Result<&GroundStyle, GroundError> {
        self.styles
            .get(&terrain)
            .ok_or(GroundError::MissingStyle(terrain))
    }
}
