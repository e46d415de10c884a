//! Autotile compositing: turns decoded regions into ordered draw plans.
//!
//! The compositor never touches pixels. It decides which sprite rectangles to
//! blit, in which order, and reports which layers must be redrawn once missing
//! assets arrive.

pub mod asset;
pub mod atlas;
pub mod error;
pub mod material;
pub mod plan;
pub mod region;
pub mod tile;

pub use asset::{AssetLookup, ImageHandle, MaterialDescriptor, TextureId};
pub use error::MaterialError;
pub use material::{MaterialFile, MaterialRegistry, ModFile, RenderParameters};
pub use plan::{BlendMode, Blit, BlitKind, DrawPlan, Rect};
pub use region::{composite_region, render_dirty, render_regions, RegionRender};
pub use tile::{Missing, TileCompositor, TileInput, TileStatus};
