//! Binary layout of a region buffer.
//!
//! A region is a 3-byte header followed by 1024 fixed-size tile records.
//! Records are row-major, but rows are stored bottom-to-top: logical row 0
//! (the top of the region) is the last row in the buffer. All multi-byte
//! fields are big-endian.

/// Tiles per region along X.
pub const TILES_X: usize = 32;
/// Tiles per region along Y.
pub const TILES_Y: usize = 32;
/// Tiles per region.
pub const TILES_PER_REGION: usize = TILES_X * TILES_Y;

/// Leading bytes not interpreted by this crate.
pub const HEADER_BYTES: usize = 3;
/// Size of one tile record.
pub const BYTES_PER_TILE: usize = 23;
pub const BYTES_PER_ROW: usize = BYTES_PER_TILE * TILES_X;
/// Size of all tile records, excluding the header.
pub const BYTES_PER_REGION: usize = BYTES_PER_TILE * TILES_PER_REGION;
/// Exact length of a valid region buffer.
pub const REGION_LEN: usize = HEADER_BYTES + BYTES_PER_REGION;

/// Byte offset of the record for logical tile `(x, y)`.
///
/// `y` counts down from the top of the region, so `y = 0` resolves to the
/// last row of the buffer.
#[inline]
pub const fn tile_offset(x: usize, y: usize) -> usize {
    HEADER_BYTES + BYTES_PER_REGION - BYTES_PER_ROW * (y + 1) + BYTES_PER_TILE * x
}

/// Field width inside a tile record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    I16,
    U16,
    U8,
}

/// Every field of a tile record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileField {
    ForegroundMaterial,
    ForegroundHueShift,
    ForegroundVariant,
    ForegroundMod,
    ForegroundModHueShift,
    BackgroundMaterial,
    BackgroundHueShift,
    BackgroundVariant,
    BackgroundMod,
    BackgroundModHueShift,
    Liquid,
    LiquidPressure,
    Collision,
    Reserved,
    BiomePrimary,
    BiomeSecondary,
    Indestructible,
}

impl TileField {
    /// Offset of the field from the start of its record.
    pub const fn offset(self) -> usize {
        match self {
            Self::ForegroundMaterial => 0,
            Self::ForegroundHueShift => 2,
            Self::ForegroundVariant => 3,
            Self::ForegroundMod => 4,
            Self::ForegroundModHueShift => 6,
            Self::BackgroundMaterial => 7,
            Self::BackgroundHueShift => 9,
            Self::BackgroundVariant => 10,
            Self::BackgroundMod => 11,
            Self::BackgroundModHueShift => 13,
            Self::Liquid => 14,
            Self::LiquidPressure => 15,
            Self::Collision => 17,
            Self::Reserved => 18,
            Self::BiomePrimary => 20,
            Self::BiomeSecondary => 21,
            Self::Indestructible => 22,
        }
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            Self::ForegroundMaterial
            | Self::ForegroundMod
            | Self::BackgroundMaterial
            | Self::BackgroundMod
            | Self::Reserved => FieldKind::I16,
            Self::LiquidPressure => FieldKind::U16,
            _ => FieldKind::U8,
        }
    }
}

/// One of the two drawable tile layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Background,
    Foreground,
}

impl Layer {
    /// Offset of this layer's material id; the remaining layer fields follow it.
    pub const fn base_offset(self) -> usize {
        match self {
            Self::Foreground => TileField::ForegroundMaterial.offset(),
            Self::Background => TileField::BackgroundMaterial.offset(),
        }
    }

    pub const fn material(self) -> TileField {
        match self {
            Self::Foreground => TileField::ForegroundMaterial,
            Self::Background => TileField::BackgroundMaterial,
        }
    }
}

/// Relative offsets of the per-layer fields from [`Layer::base_offset`].
pub(crate) const LAYER_HUE: usize = 2;
pub(crate) const LAYER_VARIANT: usize = 3;
pub(crate) const LAYER_MOD: usize = 4;
pub(crate) const LAYER_MOD_HUE: usize = 6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_len_is_fixed() {
        assert_eq!(REGION_LEN, 23_555);
    }

    #[test]
    fn top_row_is_last_in_buffer() {
        assert_eq!(tile_offset(0, 0), HEADER_BYTES + BYTES_PER_ROW * (TILES_Y - 1));
        assert_eq!(tile_offset(0, TILES_Y - 1), HEADER_BYTES);
        assert_eq!(tile_offset(31, 0) + BYTES_PER_TILE, REGION_LEN);
    }

    #[test]
    fn layer_offsets_match_fields() {
        let bg = Layer::Background.base_offset();
        assert_eq!(bg + LAYER_HUE, TileField::BackgroundHueShift.offset());
        assert_eq!(bg + LAYER_VARIANT, TileField::BackgroundVariant.offset());
        assert_eq!(bg + LAYER_MOD, TileField::BackgroundMod.offset());
        assert_eq!(bg + LAYER_MOD_HUE, TileField::BackgroundModHueShift.offset());
        let fg = Layer::Foreground.base_offset();
        assert_eq!(fg + LAYER_MOD_HUE, TileField::ForegroundModHueShift.offset());
    }

    #[test]
    fn record_fields_fit_in_record() {
        assert_eq!(TileField::Indestructible.offset(), BYTES_PER_TILE - 1);
        assert_eq!(TileField::Reserved.kind(), FieldKind::I16);
        assert_eq!(TileField::LiquidPressure.kind(), FieldKind::U16);
    }
}
