//! Asset lookup boundary between the compositor and whatever loads images.

use serde::Serialize;

/// Opaque handle to a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TextureId(pub u32);

/// A loaded sprite sheet with a hue shift applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ImageHandle {
    pub texture: TextureId,
    pub hue_shift: u8,
}

/// What the compositor needs to know about a material or matmod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialDescriptor {
    pub id: i16,
    pub name: String,
    /// Number of sprite variants in the sheet. Zero is treated as one.
    pub variants: u32,
    /// The background stays visible behind this material.
    pub transparent: bool,
    /// Platforms do not blend with their neighbors and use a platform sheet.
    pub platform: bool,
    /// Matmod sprites that extend into the tile above (grass and the like).
    pub overflows_up: bool,
    pub texture: TextureId,
}

impl MaterialDescriptor {
    /// Reduce a variant hash to a sprite column index.
    pub fn variant_index(&self, hash: u32) -> u32 {
        hash % self.variants.max(1)
    }
}

/// Synchronous descriptor and image lookup.
///
/// `None` from any method means "not available yet"; the compositor turns it
/// into a retry request instead of failing.
pub trait AssetLookup {
    fn material(&self, id: i16) -> Option<&MaterialDescriptor>;

    fn matmod(&self, id: i16) -> Option<&MaterialDescriptor>;

    fn image(&self, descriptor: &MaterialDescriptor, hue_shift: u8) -> Option<ImageHandle>;
}
