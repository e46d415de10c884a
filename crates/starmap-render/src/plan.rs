//! Draw plan types handed to the presentation layer.

use serde::Serialize;

use crate::asset::ImageHandle;

/// Tile cell size in pixels.
pub const TILE_PIXELS: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u8,
    pub height: u8,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u8, height: u8) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// How a blit is composited onto the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    Normal,
    /// Background layer: drawn at half opacity to darken it uniformly.
    Darken,
}

impl BlendMode {
    pub fn alpha(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Darken => 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlitKind {
    /// Full-tile sprite of the tile's own material.
    Base,
    /// 4x4 quadrant piece of a neighbor bleeding over this tile.
    Edge,
    /// Matmod overlay on the tile.
    Modifier,
    /// Top slice of the matmod of the tile below.
    Overflow,
}

/// One sprite copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Blit {
    /// Logical tile column in the region.
    pub tile_x: u8,
    /// Logical tile row, counted from the top of the region.
    pub tile_y: u8,
    pub image: ImageHandle,
    pub source: Rect,
    /// Offset of the destination within the tile's 8x8 cell.
    pub dest_x: u8,
    pub dest_y: u8,
    pub mode: BlendMode,
    pub kind: BlitKind,
}

impl Blit {
    /// Destination pixel position within the region.
    pub fn region_position(&self) -> (u32, u32) {
        (
            self.tile_x as u32 * TILE_PIXELS as u32 + self.dest_x as u32,
            self.tile_y as u32 * TILE_PIXELS as u32 + self.dest_y as u32,
        )
    }
}

/// Ordered blits for one layer of one region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DrawPlan {
    blits: Vec<Blit>,
}

impl DrawPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            blits: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, blit: Blit) {
        self.blits.push(blit);
    }

    pub fn blits(&self) -> &[Blit] {
        &self.blits
    }

    pub fn len(&self) -> usize {
        self.blits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blits.is_empty()
    }

    pub fn count(&self, kind: BlitKind) -> usize {
        self.blits.iter().filter(|b| b.kind == kind).count()
    }

    /// Blits drawn on tile `(x, y)`, in order.
    pub fn tile(&self, x: u8, y: u8) -> impl Iterator<Item = &Blit> {
        self.blits
            .iter()
            .filter(move |b| b.tile_x == x && b.tile_y == y)
    }
}
