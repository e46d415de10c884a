//! Per-tile autotile compositing.
//!
//! Higher material ids draw over lower ones. For every tile the compositor
//! emits the tile's own sprite, then 4x4 corner pieces of each lower-id
//! neighbor that bleeds into it, then the tile's matmod, then the overflow of
//! the matmod below when the tile itself is empty.

use starmap_world::{Neighbors, TileLayer};

use crate::asset::{AssetLookup, ImageHandle, MaterialDescriptor};
use crate::atlas::{self, PlatformPiece, Quadrant};
use crate::plan::{BlendMode, Blit, BlitKind, DrawPlan, Rect};

/// Everything the compositor reads for one tile of one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileInput {
    pub center: TileLayer,
    pub neighbors: Neighbors,
    /// Variant hash of this tile.
    pub variant: u32,
    /// Variant hash of the tile below, for matmod overflow.
    pub below_variant: u32,
}

/// Asset that stopped a tile from completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// No descriptor for a material id.
    Material(i16),
    /// No descriptor for a matmod id.
    Modifier(i16),
    /// Descriptor known, sprite sheet not loaded yet.
    Image(i16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileStatus {
    Complete,
    /// Blits emitted before the missing asset stay in the plan; the rest of
    /// the tile was skipped and the layer must be redrawn later.
    NeedsRetry(Missing),
}

impl TileStatus {
    pub fn needs_retry(self) -> bool {
        matches!(self, Self::NeedsRetry(_))
    }
}

/// A neighbor whose edge bleeds into the current tile.
#[derive(Debug, Clone, Copy)]
struct Edge {
    material: i16,
    image: ImageHandle,
    index: u32,
}

/// Composites tiles of one layer.
pub struct TileCompositor<'a, A> {
    assets: &'a A,
    mode: BlendMode,
}

impl<'a, A: AssetLookup> TileCompositor<'a, A> {
    pub fn new(assets: &'a A, mode: BlendMode) -> Self {
        Self { assets, mode }
    }

    /// Append the blits for tile `(x, y)` to `plan`.
    pub fn composite(&self, x: u8, y: u8, input: &TileInput, plan: &mut DrawPlan) -> TileStatus {
        let mut out = Emitter {
            plan,
            x,
            y,
            mode: self.mode,
        };
        match self.try_composite(input, &mut out) {
            Ok(()) => TileStatus::Complete,
            Err(missing) => TileStatus::NeedsRetry(missing),
        }
    }

    fn try_composite(&self, input: &TileInput, out: &mut Emitter<'_>) -> Result<(), Missing> {
        let center = input.center;
        let neighbors = &input.neighbors;

        let mut center_platform = false;
        if center.has_material() {
            let desc = self.material(center.material)?;
            let image = self.image(desc, center.hue_shift)?;
            let index = desc.variant_index(input.variant);
            let source = if desc.platform {
                center_platform = true;
                let differs =
                    |n: Option<TileLayer>| n.is_some_and(|t| t.material != center.material);
                let piece = PlatformPiece::select(differs(neighbors.west), differs(neighbors.east));
                atlas::platform(index, piece)
            } else {
                atlas::base(index)
            };
            out.push(image, source, (0, 0), BlitKind::Base);
        }

        if !center_platform {
            // The upper corners are drawn before the bottom neighbor is
            // resolved, so a missing bottom image keeps them in the plan.
            let right = self.edge(&center, neighbors.east, input.variant)?;
            let left = self.edge(&center, neighbors.west, input.variant)?;
            let top = self.edge(&center, neighbors.north, input.variant)?;
            corner(out, Quadrant::TopLeft, top, left);
            corner(out, Quadrant::TopRight, top, right);

            let bottom = self.edge(&center, neighbors.south, input.variant)?;
            corner(out, Quadrant::BottomRight, bottom, right);
            corner(out, Quadrant::BottomLeft, bottom, left);
        }

        if center.has_modifier() {
            let desc = self.matmod(center.modifier)?;
            let image = self.image(desc, center.modifier_hue_shift)?;
            let index = desc.variant_index(input.variant);
            out.push(image, atlas::modifier(index), (0, 0), BlitKind::Modifier);
        }

        if !center.has_material() {
            if let Some(below) = neighbors.south.filter(TileLayer::has_modifier) {
                let desc = self.matmod(below.modifier)?;
                if desc.overflows_up {
                    let image = self.image(desc, below.modifier_hue_shift)?;
                    let index = desc.variant_index(input.below_variant);
                    out.push(image, atlas::overflow(index), (0, 4), BlitKind::Overflow);
                }
            }
        }

        Ok(())
    }

    /// Resolve a neighbor that bleeds into `center`, if any.
    fn edge(
        &self,
        center: &TileLayer,
        neighbor: Option<TileLayer>,
        variant: u32,
    ) -> Result<Option<Edge>, Missing> {
        let Some(neighbor) = neighbor.filter(TileLayer::has_material) else {
            return Ok(None);
        };
        if center.has_material() && center.material <= neighbor.material {
            return Ok(None);
        }
        let desc = self.material(neighbor.material)?;
        if desc.platform {
            return Ok(None);
        }
        let image = self.image(desc, neighbor.hue_shift)?;
        Ok(Some(Edge {
            material: neighbor.material,
            image,
            index: desc.variant_index(variant),
        }))
    }

    fn material(&self, id: i16) -> Result<&'a MaterialDescriptor, Missing> {
        self.assets.material(id).ok_or(Missing::Material(id))
    }

    fn matmod(&self, id: i16) -> Result<&'a MaterialDescriptor, Missing> {
        self.assets.matmod(id).ok_or(Missing::Modifier(id))
    }

    fn image(&self, desc: &MaterialDescriptor, hue_shift: u8) -> Result<ImageHandle, Missing> {
        self.assets
            .image(desc, hue_shift)
            .ok_or(Missing::Image(desc.id))
    }
}

/// Draw up to two edge pieces into one quadrant. The lower id goes first so
/// the higher id ends up on top.
fn corner(
    out: &mut Emitter<'_>,
    quadrant: Quadrant,
    vertical: Option<Edge>,
    horizontal: Option<Edge>,
) {
    let dest = quadrant.dest();
    match (vertical, horizontal) {
        (Some(v), Some(h)) if v.material == h.material => {
            out.push(v.image, quadrant.shared_corner(v.index), dest, BlitKind::Edge);
        }
        (Some(v), Some(h)) => {
            let v_piece = (v.image, quadrant.vertical_piece(v.index));
            let h_piece = (h.image, quadrant.horizontal_piece(h.index));
            let (first, second) = if v.material < h.material {
                (v_piece, h_piece)
            } else {
                (h_piece, v_piece)
            };
            out.push(first.0, first.1, dest, BlitKind::Edge);
            out.push(second.0, second.1, dest, BlitKind::Edge);
        }
        (Some(v), None) => {
            out.push(v.image, quadrant.vertical_piece(v.index), dest, BlitKind::Edge);
        }
        (None, Some(h)) => {
            out.push(h.image, quadrant.horizontal_piece(h.index), dest, BlitKind::Edge);
        }
        (None, None) => {}
    }
}

struct Emitter<'p> {
    plan: &'p mut DrawPlan,
    x: u8,
    y: u8,
    mode: BlendMode,
}

impl Emitter<'_> {
    fn push(&mut self, image: ImageHandle, source: Rect, dest: (u8, u8), kind: BlitKind) {
        self.plan.push(Blit {
            tile_x: self.x,
            tile_y: self.y,
            image,
            source,
            dest_x: dest.0,
            dest_y: dest.1,
            mode: self.mode,
            kind,
        });
    }
}
