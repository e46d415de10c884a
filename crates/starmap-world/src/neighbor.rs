//! Orthogonal neighbor lookup across region boundaries.
//!
//! [`resolve`] answers a single query. The region compositor visits all 1024
//! tiles per layer, so it uses [`RegionWindow`] instead: the four adjacent
//! regions are looked up once per region, row edges once per row, and each
//! column is plain offset arithmetic.

use crate::coord::{Direction, RegionCoord};
use crate::layout::{tile_offset, Layer, BYTES_PER_ROW, BYTES_PER_TILE, TILES_X, TILES_Y};
use crate::region::{Region, TileLayer};
use crate::store::RegionStore;

/// Layer fields of the four orthogonal neighbors. `None` means no neighbor:
/// past the top or bottom of the world, or the adjacent region is not ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub north: Option<TileLayer>,
    pub east: Option<TileLayer>,
    pub south: Option<TileLayer>,
    pub west: Option<TileLayer>,
}

impl Neighbors {
    pub fn get(&self, direction: Direction) -> Option<TileLayer> {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }
}

/// Neighbors of logical tile `(x, y)` in the region at `coord`.
pub fn resolve(
    store: &RegionStore,
    coord: RegionCoord,
    x: usize,
    y: usize,
    layer: Layer,
) -> Option<Neighbors> {
    let window = RegionWindow::new(store, coord)?;
    Some(window.row(y).neighbors(x, layer))
}

/// A ready region plus its ready orthogonal neighbors.
#[derive(Debug, Clone, Copy)]
pub struct RegionWindow<'a> {
    center: &'a Region,
    north: Option<&'a Region>,
    east: Option<&'a Region>,
    south: Option<&'a Region>,
    west: Option<&'a Region>,
}

impl<'a> RegionWindow<'a> {
    /// `None` unless the region at `coord` is ready.
    pub fn new(store: &'a RegionStore, coord: RegionCoord) -> Option<Self> {
        Some(Self {
            center: store.region(coord)?,
            north: store.neighbor_region(coord, Direction::North),
            east: store.neighbor_region(coord, Direction::East),
            south: store.neighbor_region(coord, Direction::South),
            west: store.neighbor_region(coord, Direction::West),
        })
    }

    pub fn region(&self) -> &'a Region {
        self.center
    }

    /// Cursor over logical row `y`.
    pub fn row(&self, y: usize) -> RowCursor<'a> {
        debug_assert!(y < TILES_Y);
        let record = tile_offset(0, y);

        // Rows are stored bottom-to-top: the row above is one row later in the buffer.
        let north = if y > 0 {
            Some((self.center, record + BYTES_PER_ROW))
        } else {
            self.north.map(|r| (r, tile_offset(0, TILES_Y - 1)))
        };
        let south = if y + 1 < TILES_Y {
            Some((self.center, record - BYTES_PER_ROW))
        } else {
            self.south.map(|r| (r, tile_offset(0, 0)))
        };

        RowCursor {
            region: self.center,
            record,
            north,
            south,
            east_edge: self.east.map(|r| (r, tile_offset(0, y))),
            west_edge: self.west.map(|r| (r, tile_offset(TILES_X - 1, y))),
        }
    }
}

/// Precomputed offsets for one row. Column `x` adds `x * BYTES_PER_TILE`.
#[derive(Debug, Clone, Copy)]
pub struct RowCursor<'a> {
    region: &'a Region,
    /// Offset of tile `(0, y)`.
    record: usize,
    /// Region and offset of the tile above column 0.
    north: Option<(&'a Region, usize)>,
    south: Option<(&'a Region, usize)>,
    /// Tile east of column 31.
    east_edge: Option<(&'a Region, usize)>,
    /// Tile west of column 0.
    west_edge: Option<(&'a Region, usize)>,
}

impl<'a> RowCursor<'a> {
    /// Layer fields of tile `(x, y)` itself.
    #[inline]
    pub fn center(&self, x: usize, layer: Layer) -> TileLayer {
        self.region
            .layer_at_offset(self.record + x * BYTES_PER_TILE, layer)
    }

    #[inline]
    pub fn neighbors(&self, x: usize, layer: Layer) -> Neighbors {
        debug_assert!(x < TILES_X);
        let column = x * BYTES_PER_TILE;
        let here = self.record + column;

        let east = if x + 1 < TILES_X {
            Some(self.region.layer_at_offset(here + BYTES_PER_TILE, layer))
        } else {
            self.east_edge.map(|(r, o)| r.layer_at_offset(o, layer))
        };
        let west = if x > 0 {
            Some(self.region.layer_at_offset(here - BYTES_PER_TILE, layer))
        } else {
            self.west_edge.map(|(r, o)| r.layer_at_offset(o, layer))
        };

        Neighbors {
            north: self.north.map(|(r, o)| r.layer_at_offset(o + column, layer)),
            east,
            south: self.south.map(|(r, o)| r.layer_at_offset(o + column, layer)),
            west,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::WorldGeometry;
    use crate::region::{RegionBuilder, RegionData};

    const FG: Layer = Layer::Foreground;

    /// A world `regions_x` wide and 2 tall where every region is ready.
    fn loaded_store(regions_x: u32, build: impl Fn(RegionCoord) -> RegionData) -> RegionStore {
        let mut store = RegionStore::new(WorldGeometry::new(32 * regions_x, 64));
        for y in 0..2 {
            for x in 0..regions_x as i32 {
                let coord = store.begin_fetch(x, y).unwrap();
                store.complete_fetch(coord, Ok(build(coord)));
            }
        }
        store
    }

    /// Material id encodes region and tile: region.x * 10000 + region.y * 5000 + y * 32 + x.
    fn tagged(coord: RegionCoord) -> RegionData {
        let mut builder = RegionBuilder::new();
        for y in 0..TILES_Y {
            for x in 0..TILES_X {
                let id = coord.x * 10_000 + coord.y * 5_000 + (y * 32 + x) as i32;
                builder.set_material(x, y, FG, id as i16);
            }
        }
        builder.into_data()
    }

    fn id(n: Option<TileLayer>) -> Option<i16> {
        n.map(|t| t.material)
    }

    #[test]
    fn interior_neighbors() {
        let store = loaded_store(2, tagged);
        let n = resolve(&store, RegionCoord::new(0, 0), 5, 5, FG).unwrap();
        assert_eq!(id(n.north), Some((4 * 32 + 5) as i16));
        assert_eq!(id(n.south), Some((6 * 32 + 5) as i16));
        assert_eq!(id(n.east), Some((5 * 32 + 6) as i16));
        assert_eq!(id(n.west), Some((5 * 32 + 4) as i16));
    }

    #[test]
    fn vertical_edges_cross_into_adjacent_rows() {
        let store = loaded_store(2, tagged);
        // Top row of the lower region reads the bottom row of the region to its north.
        let n = resolve(&store, RegionCoord::new(1, 0), 7, 0, FG).unwrap();
        assert_eq!(id(n.north), Some((10_000 + 5_000 + 31 * 32 + 7) as i16));
        // Bottom row of the upper region reads the top row of the region to its south.
        let n = resolve(&store, RegionCoord::new(1, 1), 7, 31, FG).unwrap();
        assert_eq!(id(n.south), Some((10_000 + 7) as i16));
    }

    #[test]
    fn y_axis_does_not_wrap() {
        let store = loaded_store(2, tagged);
        let top = resolve(&store, RegionCoord::new(0, 1), 3, 0, FG).unwrap();
        assert_eq!(top.north, None);
        let bottom = resolve(&store, RegionCoord::new(0, 0), 3, 31, FG).unwrap();
        assert_eq!(bottom.south, None);
    }

    #[test]
    fn x_axis_wraps() {
        let store = loaded_store(3, tagged);
        let east_edge = resolve(&store, RegionCoord::new(2, 0), 31, 12, FG).unwrap();
        let westmost = store.region(RegionCoord::new(0, 0)).unwrap();
        assert_eq!(id(east_edge.east), Some(westmost.layer(0, 12, FG).material));

        let west_edge = resolve(&store, RegionCoord::new(0, 1), 0, 4, FG).unwrap();
        let eastmost = store.region(RegionCoord::new(2, 1)).unwrap();
        assert_eq!(id(west_edge.west), Some(eastmost.layer(31, 4, FG).material));
    }

    #[test]
    fn unloaded_neighbor_region_is_absent() {
        let mut store = RegionStore::new(WorldGeometry::new(32 * 3, 32));
        let coord = store.begin_fetch(1, 0).unwrap();
        store.complete_fetch(coord, Ok(tagged(coord)));
        let n = resolve(&store, coord, 31, 0, FG).unwrap();
        assert_eq!(n.east, None);
        let n = resolve(&store, coord, 0, 0, FG).unwrap();
        assert_eq!(n.west, None);
        assert!(resolve(&store, RegionCoord::new(2, 0), 0, 0, FG).is_none());
    }

    #[test]
    fn cursor_matches_random_access() {
        let store = loaded_store(2, tagged);
        let window = RegionWindow::new(&store, RegionCoord::new(1, 1)).unwrap();
        for y in [0, 1, 15, 30, 31] {
            let row = window.row(y);
            for x in [0, 1, 16, 30, 31] {
                let expected = resolve(&store, RegionCoord::new(1, 1), x, y, FG).unwrap();
                assert_eq!(row.neighbors(x, FG), expected, "({x}, {y})");
                assert_eq!(row.center(x, FG), window.region().layer(x, y, FG));
            }
        }
    }

    #[test]
    fn layers_are_read_independently() {
        let store = loaded_store(1, |_| {
            let mut builder = RegionBuilder::new();
            builder.set_material(4, 4, Layer::Background, 77);
            builder.into_data()
        });
        let n = resolve(&store, RegionCoord::new(0, 0), 4, 5, Layer::Background).unwrap();
        assert_eq!(id(n.north), Some(77));
        let n = resolve(&store, RegionCoord::new(0, 0), 4, 5, FG).unwrap();
        assert_eq!(id(n.north), Some(0));
    }
}
