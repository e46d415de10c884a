//! Asynchronous sprite sheet loading.

use std::path::{Path, PathBuf};

use starmap_render::{MaterialRegistry, TextureId};
use tracing::{debug, warn};

/// Read the sprite sheets `ids` from under `root` concurrently and mark the
/// ones that could be read as loaded. Returns how many became available.
pub async fn load_textures(
    registry: &mut MaterialRegistry,
    root: &Path,
    ids: &[TextureId],
) -> usize {
    let mut handles = Vec::with_capacity(ids.len());
    for &id in ids {
        let Some(relative) = registry.texture_path(id) else {
            continue;
        };
        let path: PathBuf = root.join(relative);
        handles.push(tokio::spawn(async move {
            let result = tokio::fs::read(&path).await.map(|bytes| bytes.len());
            (id, path, result)
        }));
    }

    let mut loaded = 0;
    for handle in handles {
        match handle.await {
            Ok((id, path, Ok(size))) => {
                debug!("Loaded texture {} ({size} bytes)", path.display());
                if registry.mark_loaded(id) {
                    loaded += 1;
                }
            }
            Ok((_, path, Err(e))) => warn!("Failed to load texture {}: {e}", path.display()),
            Err(e) => warn!("Texture task failed: {e}"),
        }
    }
    loaded
}
