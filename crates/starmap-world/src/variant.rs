//! Deterministic per-tile variant selection.
//!
//! The variant of a tile is an FNV-1a 32-bit hash of its world position and a
//! layer-specific seed, so the same tile always picks the same sprite no
//! matter when or in which order it is rendered. Reduce the result modulo a
//! material's variant count at the call site.

use crate::layout::Layer;

/// FNV-1a 32-bit offset basis.
const FNV1_32_INIT: u32 = 0x811c_9dc5;
/// FNV-1a 32-bit prime.
const FNV1_32_PRIME: u32 = 0x0100_0193;

/// Seed mixed into background-layer variants.
pub const BACKGROUND_VARIANT_SEED: u32 = 455_934_271;
/// Seed mixed into foreground-layer variants.
pub const FOREGROUND_VARIANT_SEED: u32 = 786_571_541;

/// Compute FNV-1a 32-bit hash of a byte slice.
pub fn fnv1a_32(data: &[u8]) -> u32 {
    let mut hash = FNV1_32_INIT;
    for &byte in data {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV1_32_PRIME);
    }
    hash
}

impl Layer {
    pub const fn variant_seed(self) -> u32 {
        match self {
            Self::Background => BACKGROUND_VARIANT_SEED,
            Self::Foreground => FOREGROUND_VARIANT_SEED,
        }
    }
}

/// Combine a world seed with a layer seed into the last 4 hashed bytes.
#[inline]
fn combined_seed(world_seed: u64, layer_seed: u32) -> u32 {
    (world_seed as u32).wrapping_add(layer_seed)
}

#[inline]
fn hash_position(seed: u32, tile_x: i32, tile_y: i32) -> u32 {
    let mut buf = [0u8; 12];
    buf[0..4].copy_from_slice(&tile_x.to_be_bytes());
    buf[4..8].copy_from_slice(&tile_y.to_be_bytes());
    buf[8..12].copy_from_slice(&seed.to_be_bytes());
    fnv1a_32(&buf)
}

/// Variant hash of a tile at world coordinate `(tile_x, tile_y)`.
pub fn variant(world_seed: u64, layer_seed: u32, tile_x: i32, tile_y: i32) -> u32 {
    hash_position(combined_seed(world_seed, layer_seed), tile_x, tile_y)
}

/// Per-world seeds for both layers, combined once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSeeds {
    background: u32,
    foreground: u32,
}

impl VariantSeeds {
    pub fn new(world_seed: u64) -> Self {
        Self {
            background: combined_seed(world_seed, Layer::Background.variant_seed()),
            foreground: combined_seed(world_seed, Layer::Foreground.variant_seed()),
        }
    }

    /// Same value as [`variant`] with the layer's seed.
    #[inline]
    pub fn variant(&self, layer: Layer, tile_x: i32, tile_y: i32) -> u32 {
        let seed = match layer {
            Layer::Background => self.background,
            Layer::Foreground => self.foreground,
        };
        hash_position(seed, tile_x, tile_y)
    }
}
