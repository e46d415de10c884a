//! Whole-region compositing driver.

use starmap_world::layout::{TILES_PER_REGION, TILES_X, TILES_Y};
use starmap_world::{Layer, LayerDirty, RegionCoord, RegionStore, RegionWindow, VariantSeeds};
use tracing::debug;

use crate::asset::AssetLookup;
use crate::plan::{BlendMode, DrawPlan};
use crate::tile::{TileCompositor, TileInput, TileStatus};

/// Draw plans for the layers of one region that were composited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRender {
    pub coord: RegionCoord,
    /// Layers that were composited in this pass.
    pub rendered: LayerDirty,
    pub background: DrawPlan,
    pub foreground: DrawPlan,
    /// Layers that hit a missing asset and must be composited again.
    pub dirty: LayerDirty,
}

impl RegionRender {
    pub fn is_complete(&self) -> bool {
        !self.dirty.any()
    }
}

/// Composite the requested `layers` of the region at `coord`.
///
/// Tiles are visited in buffer order, bottom row first. The background of a
/// tile is drawn only where its foreground is empty or transparent. Returns
/// `None` if the region is not ready.
pub fn composite_region<A: AssetLookup>(
    store: &RegionStore,
    coord: RegionCoord,
    seeds: &VariantSeeds,
    assets: &A,
    layers: LayerDirty,
) -> Option<RegionRender> {
    let window = RegionWindow::new(store, coord)?;
    let background_pass = TileCompositor::new(assets, BlendMode::Darken);
    let foreground_pass = TileCompositor::new(assets, BlendMode::Normal);

    let mut render = RegionRender {
        coord,
        rendered: layers,
        background: DrawPlan::with_capacity(if layers.background { TILES_PER_REGION } else { 0 }),
        foreground: DrawPlan::with_capacity(if layers.foreground { TILES_PER_REGION } else { 0 }),
        dirty: LayerDirty::NONE,
    };
    let mut retry_tiles = 0usize;

    for y in (0..TILES_Y).rev() {
        let row = window.row(y);
        for x in 0..TILES_X {
            let (world_x, world_y) = coord.world_tile(x, y);
            let foreground = row.center(x, Layer::Foreground);

            if layers.background {
                let visible = !foreground.has_material()
                    || assets
                        .material(foreground.material)
                        .map_or(true, |desc| desc.transparent);
                if visible {
                    let input = tile_input(&row, x, Layer::Background, seeds, world_x, world_y);
                    let status =
                        background_pass.composite(x as u8, y as u8, &input, &mut render.background);
                    if let TileStatus::NeedsRetry(missing) = status {
                        debug!("Background ({x}, {y}) of region {coord} waiting on {missing:?}");
                        render.dirty.background = true;
                        retry_tiles += 1;
                    }
                }
            }

            if layers.foreground {
                let input = tile_input(&row, x, Layer::Foreground, seeds, world_x, world_y);
                let status =
                    foreground_pass.composite(x as u8, y as u8, &input, &mut render.foreground);
                if let TileStatus::NeedsRetry(missing) = status {
                    debug!("Foreground ({x}, {y}) of region {coord} waiting on {missing:?}");
                    render.dirty.foreground = true;
                    retry_tiles += 1;
                }
            }
        }
    }

    debug!(
        "Composited region {coord}: {} background blits, {} foreground blits, \
         {retry_tiles} tile(s) to retry",
        render.background.len(),
        render.foreground.len(),
    );
    Some(render)
}

fn tile_input(
    row: &starmap_world::RowCursor<'_>,
    x: usize,
    layer: Layer,
    seeds: &VariantSeeds,
    world_x: i32,
    world_y: i32,
) -> TileInput {
    TileInput {
        center: row.center(x, layer),
        neighbors: row.neighbors(x, layer),
        variant: seeds.variant(layer, world_x, world_y),
        below_variant: seeds.variant(layer, world_x, world_y - 1),
    }
}

/// Composite the dirty layers of every ready region and record which layers
/// still need another pass.
pub fn render_dirty<A: AssetLookup>(
    store: &mut RegionStore,
    seeds: &VariantSeeds,
    assets: &A,
) -> Vec<RegionRender> {
    let coords = store.dirty_regions();
    render_regions(store, &coords, seeds, assets)
}

/// Like [`render_dirty`], restricted to `coords`. Other dirty regions, such as
/// neighbors loaded only for their edge tiles, keep their flags untouched.
pub fn render_regions<A: AssetLookup>(
    store: &mut RegionStore,
    coords: &[RegionCoord],
    seeds: &VariantSeeds,
    assets: &A,
) -> Vec<RegionRender> {
    let mut renders = Vec::with_capacity(coords.len());
    for &coord in coords {
        if store.region(coord).is_none() {
            continue;
        }
        let layers = store.take_dirty(coord);
        if !layers.any() {
            continue;
        }
        if let Some(render) = composite_region(store, coord, seeds, assets, layers) {
            store.mark_dirty(coord, render.dirty);
            renders.push(render);
        }
    }
    renders
}
