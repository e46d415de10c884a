//! Fetch and render loop of the viewer.

use std::collections::BTreeSet;
use std::path::Path;

use starmap_render::{render_regions, MaterialRegistry, TextureId};
use starmap_world::{Direction, RegionCoord, RegionState, RegionStore, VariantSeeds};
use tracing::{debug, info, warn};

use crate::output::PlanSet;
use crate::source;
use crate::textures;

/// Fetch `wanted` and their orthogonal neighbors concurrently.
///
/// Neighbors are needed for the edge tiles of the wanted regions even though
/// they are not part of the output.
pub async fn fetch_regions(store: &mut RegionStore, dir: &Path, wanted: &[RegionCoord]) -> usize {
    let geometry = *store.geometry();
    let mut coords = BTreeSet::new();
    for &coord in wanted {
        coords.insert(coord);
        coords.extend(
            Direction::ALL
                .into_iter()
                .filter_map(|direction| geometry.neighbor(coord, direction)),
        );
    }

    let mut handles = Vec::with_capacity(coords.len());
    for coord in coords {
        let Some(coord) = store.begin_fetch(coord.x, coord.y) else {
            continue;
        };
        let dir = dir.to_path_buf();
        handles.push(tokio::spawn(async move {
            let result = source::fetch_region(&dir, coord).await;
            (coord, result)
        }));
    }

    let mut ready = 0;
    for handle in handles {
        match handle.await {
            Ok((coord, result)) => {
                if store.complete_fetch(coord, result) == RegionState::Ready {
                    ready += 1;
                }
            }
            Err(e) => warn!("Region fetch task failed: {e}"),
        }
    }
    info!("{ready} region(s) loaded from {}", dir.display());
    ready
}

/// Textures still missing for the dirty regions and their neighbors.
fn pending_textures(
    store: &RegionStore,
    registry: &MaterialRegistry,
    dirty: &[RegionCoord],
) -> Vec<TextureId> {
    let mut coords = BTreeSet::new();
    for &coord in dirty {
        coords.insert(coord);
        if let Some(slot) = store.get(coord) {
            coords.extend(Direction::ALL.into_iter().filter_map(|d| slot.neighbor(d)));
        }
    }

    let mut pending = BTreeSet::new();
    for coord in coords {
        if let Some(region) = store.region(coord) {
            pending.extend(registry.pending_textures(&region.resource_ids()));
        }
    }
    pending.into_iter().collect()
}

/// Requested regions that still have a dirty layer. Neighbors fetched only
/// for their edge tiles are never composited.
fn wanted_dirty(store: &RegionStore, plans: &PlanSet) -> Vec<RegionCoord> {
    store
        .dirty_regions()
        .into_iter()
        .filter(|&coord| plans.wants(coord))
        .collect()
}

/// Render the requested dirty regions, loading the textures they wait on
/// between passes, until nothing is dirty, no more textures can be loaded, or
/// `max_passes` is used up. Returns the number of passes run.
pub async fn render_passes(
    store: &mut RegionStore,
    registry: &mut MaterialRegistry,
    seeds: &VariantSeeds,
    textures_root: &Path,
    max_passes: u32,
    plans: &mut PlanSet,
) -> u32 {
    let mut passes = 0;
    while passes < max_passes.max(1) {
        let dirty = wanted_dirty(store, plans);
        if dirty.is_empty() {
            break;
        }
        passes += 1;
        let renders = render_regions(store, &dirty, seeds, &*registry);
        debug!("Pass {passes}: composited {} region(s)", renders.len());
        for render in renders {
            plans.apply(render);
        }

        let dirty = wanted_dirty(store, plans);
        if dirty.is_empty() {
            break;
        }
        let pending = pending_textures(store, registry, &dirty);
        if pending.is_empty() {
            debug!("No textures left to load for {} dirty region(s)", dirty.len());
            break;
        }
        if textures::load_textures(registry, textures_root, &pending).await == 0 {
            break;
        }
    }

    let remaining = wanted_dirty(store, plans);
    if remaining.is_empty() {
        info!("Rendering finished after {passes} pass(es)");
    } else {
        warn!(
            "{} region(s) still incomplete after {passes} pass(es)",
            remaining.len()
        );
    }
    passes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use starmap_render::BlitKind;
    use starmap_world::{Layer, LayerDirty, RegionBuilder, RegionData, TileLayer, WorldGeometry};

    struct Fixture {
        root: PathBuf,
        store: RegionStore,
        registry: MaterialRegistry,
    }

    impl Fixture {
        /// Two regions wide, one tall. Only region (0, 0) exists on disk.
        async fn new(name: &str, textures: &[&str]) -> Self {
            Self::with_east(name, textures, None).await
        }

        /// Like [`Fixture::new`], optionally writing region (1, 0) as well.
        async fn with_east(name: &str, textures: &[&str], east: Option<RegionData>) -> Self {
            let root = std::env::temp_dir().join(format!(
                "starmap_driver_{}_{}",
                name,
                std::process::id()
            ));
            for sub in ["world", "materials", "textures"] {
                std::fs::create_dir_all(root.join(sub)).unwrap();
            }

            let mut builder = RegionBuilder::new().fill(
                Layer::Foreground,
                TileLayer {
                    material: 5,
                    ..TileLayer::default()
                },
            );
            builder.set_material(3, 3, Layer::Foreground, 10);
            let data = builder.into_data();
            std::fs::write(
                source::region_path(&root.join("world"), RegionCoord::new(0, 0)),
                &data.bytes,
            )
            .unwrap();
            let expected_ready = 1 + usize::from(east.is_some());
            if let Some(east) = east {
                std::fs::write(
                    source::region_path(&root.join("world"), RegionCoord::new(1, 0)),
                    &east.bytes,
                )
                .unwrap();
            }

            for (id, texture) in [(5, "dirt.png"), (10, "stone.png")] {
                std::fs::write(
                    root.join("materials").join(format!("{texture}.material")),
                    format!(
                        r#"{{"materialId": {id}, "materialName": "{texture}",
                            "renderParameters": {{"texture": "{texture}", "variants": 2}}}}"#
                    ),
                )
                .unwrap();
            }
            for texture in textures {
                std::fs::write(root.join("textures").join(texture), b"png").unwrap();
            }

            let mut registry = MaterialRegistry::new();
            registry.load_materials(&root.join("materials")).unwrap();

            let mut store = RegionStore::new(WorldGeometry::new(64, 32));
            let wanted = [RegionCoord::new(0, 0)];
            let ready = fetch_regions(&mut store, &root.join("world"), &wanted).await;
            assert_eq!(ready, expected_ready);

            Self {
                root,
                store,
                registry,
            }
        }

        async fn render(&mut self, plans: &mut PlanSet) -> u32 {
            render_passes(
                &mut self.store,
                &mut self.registry,
                &VariantSeeds::new(42),
                &self.root.join("textures"),
                8,
                plans,
            )
            .await
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.root).ok();
        }
    }

    #[tokio::test]
    async fn neighbors_are_fetched_too() {
        let fixture = Fixture::new("neighbors", &[]).await;
        let east = RegionCoord::new(1, 0);
        assert_eq!(
            fixture.store.get(east).map(|slot| slot.state()),
            Some(RegionState::Error)
        );
        assert_eq!(
            fixture.store.get(RegionCoord::new(0, 0)).map(|slot| slot.state()),
            Some(RegionState::Ready)
        );
    }

    #[tokio::test]
    async fn converges_once_textures_arrive() {
        let mut fixture = Fixture::new("converge", &["dirt.png", "stone.png"]).await;
        let coord = RegionCoord::new(0, 0);
        let mut plans = PlanSet::new([coord]);

        // The first pass runs without textures; the second one completes.
        assert_eq!(fixture.render(&mut plans).await, 2);
        let region = plans.get(coord).unwrap();
        assert!(region.complete);
        assert_eq!(region.foreground.count(BlitKind::Base), 1024);
        assert!(region.foreground.count(BlitKind::Edge) > 0);
        assert!(region.background.is_empty());
        assert!(fixture.store.dirty_regions().is_empty());
    }

    #[tokio::test]
    async fn stops_when_a_texture_cannot_be_loaded() {
        let mut fixture = Fixture::new("stuck", &["dirt.png"]).await;
        let coord = RegionCoord::new(0, 0);
        let mut plans = PlanSet::new([coord]);

        assert_eq!(fixture.render(&mut plans).await, 2);
        assert!(!plans.get(coord).unwrap().complete);
        assert_eq!(fixture.store.dirty_regions(), vec![coord]);
    }

    #[tokio::test]
    async fn edge_only_neighbors_are_not_composited() {
        // Material 99 has no descriptor, so this region could never finish.
        let east = RegionBuilder::new()
            .fill(
                Layer::Foreground,
                TileLayer {
                    material: 99,
                    ..TileLayer::default()
                },
            )
            .into_data();
        let mut fixture =
            Fixture::with_east("edge_only", &["dirt.png", "stone.png"], Some(east)).await;
        let coord = RegionCoord::new(0, 0);
        let east = RegionCoord::new(1, 0);
        let mut plans = PlanSet::new([coord]);

        assert_eq!(fixture.render(&mut plans).await, 2);
        assert!(plans.get(coord).unwrap().complete);
        assert_eq!(
            fixture.store.get(east).map(|slot| slot.dirty()),
            Some(LayerDirty::BOTH)
        );
        assert_eq!(fixture.store.dirty_regions(), vec![east]);
    }
}
