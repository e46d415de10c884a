//! World data: region buffers, tile layout, neighbor lookup, and the region arena.

pub mod coord;
pub mod error;
pub mod layout;
pub mod neighbor;
pub mod region;
pub mod store;
pub mod variant;

pub use coord::{Direction, RegionCoord, WorldGeometry};
pub use error::{DecodeError, FetchError};
pub use layout::{Layer, TileField};
pub use neighbor::{resolve as resolve_neighbors, Neighbors, RegionWindow, RowCursor};
pub use region::{Region, RegionBuilder, RegionData, ResourceIds, TileLayer, TileMetadata};
pub use store::{LayerDirty, RegionSlot, RegionState, RegionStore};
pub use variant::{variant, VariantSeeds};
