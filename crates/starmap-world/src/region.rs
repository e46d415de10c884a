//! Decoded region buffers and typed field access.

use bytes::Bytes;
use serde_json::Value;

use crate::error::DecodeError;
use crate::layout::{
    tile_offset, FieldKind, Layer, TileField, BYTES_PER_TILE, HEADER_BYTES, LAYER_HUE, LAYER_MOD,
    LAYER_MOD_HUE, LAYER_VARIANT, REGION_LEN, TILES_X, TILES_Y,
};

/// Raw region payload as delivered by a region source.
#[derive(Debug, Clone, Default)]
pub struct RegionData {
    pub bytes: Bytes,
    /// Entity records. Opaque to this crate.
    pub entities: Vec<Value>,
}

/// A validated region buffer. Tile records are read in place on every access.
#[derive(Debug, Clone)]
pub struct Region {
    bytes: Bytes,
    entities: Vec<Value>,
}

/// The five fields of one layer of a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileLayer {
    /// `<= 0` means empty.
    pub material: i16,
    pub hue_shift: u8,
    /// Legacy per-tile variant. Rendering uses the variant hash instead.
    pub variant: u8,
    /// Overlay material ("matmod"). `<= 0` means none.
    pub modifier: i16,
    pub modifier_hue_shift: u8,
}

impl TileLayer {
    pub fn has_material(&self) -> bool {
        self.material > 0
    }

    pub fn has_modifier(&self) -> bool {
        self.modifier > 0
    }
}

/// Non-visual tile fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileMetadata {
    pub liquid: u8,
    pub liquid_pressure: u16,
    pub collision: u8,
    /// Unmapped field, carried opaquely.
    pub reserved: i16,
    pub biome_primary: u8,
    pub biome_secondary: u8,
    pub indestructible: bool,
}

/// Distinct positive ids referenced by a region, in first-seen buffer order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceIds {
    pub materials: Vec<i16>,
    pub matmods: Vec<i16>,
}

impl Region {
    /// Validate a fetched buffer. The length must match exactly.
    pub fn decode(data: RegionData) -> Result<Self, DecodeError> {
        if data.bytes.len() != REGION_LEN {
            return Err(DecodeError::LengthMismatch {
                expected: REGION_LEN,
                actual: data.bytes.len(),
            });
        }
        Ok(Self {
            bytes: data.bytes,
            entities: data.entities,
        })
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn entities(&self) -> &[Value] {
        &self.entities
    }

    /// Read any record field of logical tile `(x, y)`, widened to `i32`.
    pub fn field_at(&self, x: usize, y: usize, field: TileField) -> i32 {
        debug_assert!(x < TILES_X && y < TILES_Y);
        let offset = tile_offset(x, y) + field.offset();
        match field.kind() {
            FieldKind::I16 => self.i16_at(offset) as i32,
            FieldKind::U16 => self.u16_at(offset) as i32,
            FieldKind::U8 => self.u8_at(offset) as i32,
        }
    }

    /// Read one layer of logical tile `(x, y)`.
    pub fn layer(&self, x: usize, y: usize, layer: Layer) -> TileLayer {
        debug_assert!(x < TILES_X && y < TILES_Y);
        self.layer_at_offset(tile_offset(x, y), layer)
    }

    /// Read one layer of the record starting at `record` (a buffer offset).
    pub(crate) fn layer_at_offset(&self, record: usize, layer: Layer) -> TileLayer {
        let base = record + layer.base_offset();
        TileLayer {
            material: self.i16_at(base),
            hue_shift: self.u8_at(base + LAYER_HUE),
            variant: self.u8_at(base + LAYER_VARIANT),
            modifier: self.i16_at(base + LAYER_MOD),
            modifier_hue_shift: self.u8_at(base + LAYER_MOD_HUE),
        }
    }

    pub fn metadata(&self, x: usize, y: usize) -> TileMetadata {
        let record = tile_offset(x, y);
        TileMetadata {
            liquid: self.u8_at(record + TileField::Liquid.offset()),
            liquid_pressure: self.u16_at(record + TileField::LiquidPressure.offset()),
            collision: self.u8_at(record + TileField::Collision.offset()),
            reserved: self.i16_at(record + TileField::Reserved.offset()),
            biome_primary: self.u8_at(record + TileField::BiomePrimary.offset()),
            biome_secondary: self.u8_at(record + TileField::BiomeSecondary.offset()),
            indestructible: self.u8_at(record + TileField::Indestructible.offset()) != 0,
        }
    }

    /// Collect the material and mod ids used on either layer.
    pub fn resource_ids(&self) -> ResourceIds {
        let mut ids = ResourceIds::default();
        let mut record = HEADER_BYTES;
        while record < REGION_LEN {
            for layer in [Layer::Foreground, Layer::Background] {
                let tile = self.layer_at_offset(record, layer);
                push_unique(&mut ids.materials, tile.material);
                push_unique(&mut ids.matmods, tile.modifier);
            }
            record += BYTES_PER_TILE;
        }
        ids
    }

    #[inline]
    fn u8_at(&self, offset: usize) -> u8 {
        self.bytes[offset]
    }

    #[inline]
    fn u16_at(&self, offset: usize) -> u16 {
        u16::from_be_bytes([self.bytes[offset], self.bytes[offset + 1]])
    }

    #[inline]
    fn i16_at(&self, offset: usize) -> i16 {
        i16::from_be_bytes([self.bytes[offset], self.bytes[offset + 1]])
    }
}

fn push_unique(ids: &mut Vec<i16>, id: i16) {
    if id > 0 && !ids.contains(&id) {
        ids.push(id);
    }
}

/// Builds region buffers in memory, mainly for fixtures and tooling.
#[derive(Debug, Clone)]
pub struct RegionBuilder {
    bytes: Vec<u8>,
}

impl Default for RegionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionBuilder {
    /// An all-empty region.
    pub fn new() -> Self {
        Self {
            bytes: vec![0; REGION_LEN],
        }
    }

    /// Fill one layer of every tile.
    pub fn fill(mut self, layer: Layer, tile: TileLayer) -> Self {
        for y in 0..TILES_Y {
            for x in 0..TILES_X {
                self.set_layer(x, y, layer, tile);
            }
        }
        self
    }

    pub fn set_layer(&mut self, x: usize, y: usize, layer: Layer, tile: TileLayer) -> &mut Self {
        let base = tile_offset(x, y) + layer.base_offset();
        self.bytes[base..base + 2].copy_from_slice(&tile.material.to_be_bytes());
        self.bytes[base + LAYER_HUE] = tile.hue_shift;
        self.bytes[base + LAYER_VARIANT] = tile.variant;
        self.bytes[base + LAYER_MOD..base + LAYER_MOD + 2]
            .copy_from_slice(&tile.modifier.to_be_bytes());
        self.bytes[base + LAYER_MOD_HUE] = tile.modifier_hue_shift;
        self
    }

    /// Set a single layer's material, leaving the other fields untouched.
    pub fn set_material(&mut self, x: usize, y: usize, layer: Layer, material: i16) -> &mut Self {
        self.set_field(x, y, layer.material(), material as i32)
    }

    /// Write any record field. The value is truncated to the field width.
    pub fn set_field(&mut self, x: usize, y: usize, field: TileField, value: i32) -> &mut Self {
        let offset = tile_offset(x, y) + field.offset();
        match field.kind() {
            FieldKind::I16 => {
                self.bytes[offset..offset + 2].copy_from_slice(&(value as i16).to_be_bytes())
            }
            FieldKind::U16 => {
                self.bytes[offset..offset + 2].copy_from_slice(&(value as u16).to_be_bytes())
            }
            FieldKind::U8 => self.bytes[offset] = value as u8,
        }
        self
    }

    pub fn into_data(self) -> RegionData {
        RegionData {
            bytes: Bytes::from(self.bytes),
            entities: Vec::new(),
        }
    }

    pub fn build(self) -> Region {
        Region {
            bytes: Bytes::from(self.bytes),
            entities: Vec::new(),
        }
    }
}
