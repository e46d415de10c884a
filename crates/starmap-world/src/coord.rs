//! Region grid coordinates and world geometry.

use serde::{Deserialize, Serialize};

use crate::layout::{TILES_X, TILES_Y};

/// Position of a region in the region grid. Region Y grows northward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionCoord {
    pub x: i32,
    pub y: i32,
}

impl RegionCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World X of the region's leftmost tile column.
    pub const fn tile_origin_x(self) -> i32 {
        self.x * TILES_X as i32
    }

    /// World Y of the region's bottom tile row.
    pub const fn tile_origin_y(self) -> i32 {
        self.y * TILES_Y as i32
    }

    /// World tile coordinate of logical tile `(x, y)`, where `y` counts down
    /// from the top of the region and world Y counts up.
    pub const fn world_tile(self, x: usize, y: usize) -> (i32, i32) {
        (
            self.tile_origin_x() + x as i32,
            self.tile_origin_y() + (TILES_Y - 1 - y) as i32,
        )
    }
}

impl std::fmt::Display for RegionCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Region grid offset for this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }
}

/// World size in tiles. X wraps around, Y does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldGeometry {
    pub tiles_x: u32,
    pub tiles_y: u32,
}

impl WorldGeometry {
    pub const fn new(tiles_x: u32, tiles_y: u32) -> Self {
        Self { tiles_x, tiles_y }
    }

    /// Some world widths are not multiples of 32; the partial region counts.
    pub const fn regions_x(&self) -> i32 {
        self.tiles_x.div_ceil(TILES_X as u32) as i32
    }

    pub const fn regions_y(&self) -> i32 {
        self.tiles_y.div_ceil(TILES_Y as u32) as i32
    }

    /// Wrap X into the grid. Returns `None` past the top or bottom edge.
    pub fn normalize(&self, x: i32, y: i32) -> Option<RegionCoord> {
        let regions_x = self.regions_x();
        if regions_x == 0 || y < 0 || y >= self.regions_y() {
            return None;
        }
        Some(RegionCoord::new(x.rem_euclid(regions_x), y))
    }

    pub fn neighbor(&self, coord: RegionCoord, direction: Direction) -> Option<RegionCoord> {
        let (dx, dy) = direction.offset();
        self.normalize(coord.x + dx, coord.y + dy)
    }
}
