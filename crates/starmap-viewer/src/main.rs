mod config;
mod driver;
mod output;
mod source;
mod textures;

use std::path::Path;

use config::ViewerConfig;
use output::PlanSet;
use starmap_render::MaterialRegistry;
use starmap_world::{RegionStore, VariantSeeds, WorldGeometry};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = match ViewerConfig::load("starmap.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load starmap.toml: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "Starmap viewer v{} (world {}x{} tiles, seed {})",
        env!("CARGO_PKG_VERSION"),
        config.world.tiles_x,
        config.world.tiles_y,
        config.world.seed
    );

    if let Err(e) = run(&config).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(config: &ViewerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let geometry = WorldGeometry::new(config.world.tiles_x, config.world.tiles_y);
    info!(
        "World is {}x{} regions",
        geometry.regions_x(),
        geometry.regions_y()
    );

    let mut wanted = Vec::new();
    for &[x, y] in &config.render.regions {
        match geometry.normalize(x, y) {
            Some(coord) => wanted.push(coord),
            None => warn!("Region ({x}, {y}) is outside the world, skipping"),
        }
    }
    wanted.sort();
    wanted.dedup();
    if wanted.is_empty() {
        warn!("No regions to render");
    }

    let mut registry = MaterialRegistry::new();
    registry.load_materials(Path::new(&config.assets.materials))?;
    registry.load_matmods(Path::new(&config.assets.matmods))?;

    let mut store = RegionStore::new(geometry);
    driver::fetch_regions(&mut store, Path::new(&config.world.directory), &wanted).await;

    let mut plans = PlanSet::new(wanted.iter().copied());
    driver::render_passes(
        &mut store,
        &mut registry,
        &VariantSeeds::new(config.world.seed),
        Path::new(&config.assets.textures),
        config.render.max_passes,
        &mut plans,
    )
    .await;

    for coord in plans.missing() {
        warn!("Region {coord} produced no plan");
    }
    for &coord in &wanted {
        if plans.get(coord).is_some_and(|region| !region.complete) {
            warn!("Region {coord} is missing assets, its plan is partial");
        }
    }

    tokio::fs::write(&config.render.output, plans.to_json()?).await?;
    info!(
        "Wrote {} region plan(s) to {}",
        plans.len(),
        config.render.output
    );
    Ok(())
}
