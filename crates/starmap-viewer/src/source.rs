//! Region files on disk.
//!
//! Each region lives in `region_{x}_{y}.bin` with an optional
//! `region_{x}_{y}.entities.json` next to it holding a JSON array.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde_json::Value;
use starmap_world::{FetchError, RegionCoord, RegionData};

pub fn region_path(dir: &Path, coord: RegionCoord) -> PathBuf {
    dir.join(format!("region_{}_{}.bin", coord.x, coord.y))
}

pub fn entities_path(dir: &Path, coord: RegionCoord) -> PathBuf {
    dir.join(format!("region_{}_{}.entities.json", coord.x, coord.y))
}

/// Read the raw bytes and entity list of one region.
///
/// A missing region file is [`FetchError::NotFound`]; a missing entity file
/// just means the region has no entities.
pub async fn fetch_region(dir: &Path, coord: RegionCoord) -> Result<RegionData, FetchError> {
    let bytes = match tokio::fs::read(region_path(dir, coord)).await {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(FetchError::NotFound),
        Err(e) => return Err(e.into()),
    };

    let entities = match tokio::fs::read(entities_path(dir, coord)).await {
        Ok(raw) => serde_json::from_slice::<Vec<Value>>(&raw)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    Ok(RegionData { bytes, entities })
}
