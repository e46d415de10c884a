//! Region arena keyed by grid coordinate.
//!
//! Regions refer to their neighbors by coordinate only; every lookup goes
//! through the store, so a slot can be evicted without dangling links.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::coord::{Direction, RegionCoord, WorldGeometry};
use crate::error::FetchError;
use crate::region::{Region, RegionData};

/// Lifecycle of a region slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionState {
    Uninitialized,
    Loading,
    Ready,
    Error,
}

/// Per-layer flags. Used both for "needs re-render" and for "layers to render".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerDirty {
    pub background: bool,
    pub foreground: bool,
}

impl LayerDirty {
    pub const NONE: Self = Self {
        background: false,
        foreground: false,
    };
    pub const BOTH: Self = Self {
        background: true,
        foreground: true,
    };

    pub fn any(self) -> bool {
        self.background || self.foreground
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            background: self.background || other.background,
            foreground: self.foreground || other.foreground,
        }
    }
}

/// One region's entry in the store.
#[derive(Debug)]
pub struct RegionSlot {
    coord: RegionCoord,
    state: RegionState,
    region: Option<Region>,
    /// Indexed by [`Direction::index`]. `None` past the top or bottom of the world.
    neighbors: [Option<RegionCoord>; 4],
    dirty: LayerDirty,
}

impl RegionSlot {
    fn new(coord: RegionCoord, geometry: &WorldGeometry) -> Self {
        let mut neighbors = [None; 4];
        for direction in Direction::ALL {
            neighbors[direction.index()] = geometry.neighbor(coord, direction);
        }
        Self {
            coord,
            state: RegionState::Uninitialized,
            region: None,
            neighbors,
            dirty: LayerDirty::NONE,
        }
    }

    pub fn coord(&self) -> RegionCoord {
        self.coord
    }

    pub fn state(&self) -> RegionState {
        self.state
    }

    /// Decoded data, present only in the `Ready` state.
    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    pub fn neighbor(&self, direction: Direction) -> Option<RegionCoord> {
        self.neighbors[direction.index()]
    }

    pub fn dirty(&self) -> LayerDirty {
        self.dirty
    }
}

/// Owns every region slot of one world.
#[derive(Debug)]
pub struct RegionStore {
    geometry: WorldGeometry,
    slots: HashMap<RegionCoord, RegionSlot>,
}

impl RegionStore {
    pub fn new(geometry: WorldGeometry) -> Self {
        Self {
            geometry,
            slots: HashMap::new(),
        }
    }

    pub fn geometry(&self) -> &WorldGeometry {
        &self.geometry
    }

    /// Get or create the slot for `(x, y)`, wrapping X. `None` past the Y edges.
    pub fn slot(&mut self, x: i32, y: i32) -> Option<&RegionSlot> {
        let coord = self.geometry.normalize(x, y)?;
        let geometry = self.geometry;
        Some(
            self.slots
                .entry(coord)
                .or_insert_with(|| RegionSlot::new(coord, &geometry)),
        )
    }

    pub fn get(&self, coord: RegionCoord) -> Option<&RegionSlot> {
        self.slots.get(&coord)
    }

    /// Decoded region at `coord`, if it is `Ready`.
    pub fn region(&self, coord: RegionCoord) -> Option<&Region> {
        self.slots.get(&coord).and_then(RegionSlot::region)
    }

    /// Ready neighbor of `coord` in `direction`, if any.
    pub fn neighbor_region(&self, coord: RegionCoord, direction: Direction) -> Option<&Region> {
        let neighbor = self.slots.get(&coord)?.neighbor(direction)?;
        self.region(neighbor)
    }

    /// Move `(x, y)` from `Uninitialized` to `Loading`.
    ///
    /// Returns the normalized coordinate when the caller should issue a fetch,
    /// `None` if the region is outside the world or a fetch already happened.
    pub fn begin_fetch(&mut self, x: i32, y: i32) -> Option<RegionCoord> {
        let coord = self.geometry.normalize(x, y)?;
        self.slot(x, y)?;
        let slot = self.slots.get_mut(&coord)?;
        if slot.state != RegionState::Uninitialized {
            return None;
        }
        slot.state = RegionState::Loading;
        debug!("Fetching region {coord}");
        Some(coord)
    }

    /// Apply the result of a fetch issued by [`begin_fetch`](Self::begin_fetch).
    pub fn complete_fetch(
        &mut self,
        coord: RegionCoord,
        result: Result<RegionData, FetchError>,
    ) -> RegionState {
        let decoded = result.and_then(|data| Region::decode(data).map_err(FetchError::from));

        let Some(slot) = self.slots.get_mut(&coord) else {
            debug!("Dropping fetch result for evicted region {coord}");
            return RegionState::Uninitialized;
        };

        match decoded {
            Ok(region) => {
                slot.region = Some(region);
                slot.state = RegionState::Ready;
                slot.dirty = LayerDirty::BOTH;
            }
            Err(FetchError::NotFound) => {
                debug!("Region {coord} not found");
                slot.state = RegionState::Error;
                return slot.state;
            }
            Err(FetchError::Decode(e)) => {
                warn!("Corrupted region {coord}: {e}");
                slot.state = RegionState::Error;
                return slot.state;
            }
            Err(e) => {
                warn!("Failed to fetch region {coord}: {e}");
                slot.state = RegionState::Error;
                return slot.state;
            }
        }

        // Edge tiles of adjacent regions depend on this one.
        let neighbors = slot.neighbors;
        for neighbor in neighbors.into_iter().flatten() {
            if let Some(other) = self.slots.get_mut(&neighbor) {
                if other.state == RegionState::Ready {
                    other.dirty = LayerDirty::BOTH;
                }
            }
        }
        debug!("Region {coord} ready");
        RegionState::Ready
    }

    pub fn mark_dirty(&mut self, coord: RegionCoord, layers: LayerDirty) {
        if let Some(slot) = self.slots.get_mut(&coord) {
            slot.dirty = slot.dirty.union(layers);
        }
    }

    /// Mark every ready region dirty, e.g. after new assets arrive.
    pub fn mark_all_dirty(&mut self) {
        for slot in self.slots.values_mut() {
            if slot.state == RegionState::Ready {
                slot.dirty = LayerDirty::BOTH;
            }
        }
    }

    /// Clear and return the dirty flags of `coord`.
    pub fn take_dirty(&mut self, coord: RegionCoord) -> LayerDirty {
        self.slots
            .get_mut(&coord)
            .map(|slot| std::mem::take(&mut slot.dirty))
            .unwrap_or_default()
    }

    /// Ready regions with at least one dirty layer, in coordinate order.
    pub fn dirty_regions(&self) -> Vec<RegionCoord> {
        let mut coords: Vec<_> = self
            .slots
            .values()
            .filter(|slot| slot.state == RegionState::Ready && slot.dirty.any())
            .map(RegionSlot::coord)
            .collect();
        coords.sort();
        coords
    }

    /// Drop a slot. A later access recreates it as `Uninitialized`.
    pub fn evict(&mut self, coord: RegionCoord) -> Option<RegionSlot> {
        self.slots.remove(&coord)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
