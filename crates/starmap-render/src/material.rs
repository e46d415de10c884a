//! Material and matmod descriptors loaded from JSON files.
//!
//! Descriptor files look like:
//!
//! ```json
//! { "materialId": 5, "materialName": "dirt", "transparent": false,
//!   "renderParameters": { "texture": "dirt.png", "variants": 5 } }
//! ```
//!
//! Matmods use `modId` / `modName` and may set `overflowsUp`.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use starmap_world::ResourceIds;
use tracing::{info, warn};

use crate::asset::{AssetLookup, ImageHandle, MaterialDescriptor, TextureId};
use crate::error::MaterialError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderParameters {
    pub texture: String,
    #[serde(default = "default_variants")]
    pub variants: u32,
}

fn default_variants() -> u32 {
    1
}

/// Raw `*.material` file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialFile {
    pub material_id: i16,
    pub material_name: String,
    #[serde(default)]
    pub transparent: bool,
    #[serde(default)]
    pub platform: bool,
    pub render_parameters: RenderParameters,
}

/// Raw `*.matmod` file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModFile {
    pub mod_id: i16,
    pub mod_name: String,
    #[serde(default)]
    pub overflows_up: bool,
    pub render_parameters: RenderParameters,
}

/// Descriptor registry plus the set of sprite sheets loaded so far.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: HashMap<i16, MaterialDescriptor>,
    matmods: HashMap<i16, MaterialDescriptor>,
    textures: Vec<String>,
    texture_ids: HashMap<String, TextureId>,
    loaded: HashSet<TextureId>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern_texture(&mut self, path: &str) -> TextureId {
        if let Some(&id) = self.texture_ids.get(path) {
            return id;
        }
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(path.to_string());
        self.texture_ids.insert(path.to_string(), id);
        id
    }

    pub fn insert_material(&mut self, file: MaterialFile) -> Result<(), MaterialError> {
        if self.materials.contains_key(&file.material_id) {
            return Err(MaterialError::DuplicateMaterial(file.material_id));
        }
        let texture = self.intern_texture(&file.render_parameters.texture);
        self.materials.insert(
            file.material_id,
            MaterialDescriptor {
                id: file.material_id,
                name: file.material_name,
                variants: file.render_parameters.variants,
                transparent: file.transparent,
                platform: file.platform,
                overflows_up: false,
                texture,
            },
        );
        Ok(())
    }

    pub fn insert_matmod(&mut self, file: ModFile) -> Result<(), MaterialError> {
        if self.matmods.contains_key(&file.mod_id) {
            return Err(MaterialError::DuplicateMod(file.mod_id));
        }
        let texture = self.intern_texture(&file.render_parameters.texture);
        self.matmods.insert(
            file.mod_id,
            MaterialDescriptor {
                id: file.mod_id,
                name: file.mod_name,
                variants: file.render_parameters.variants,
                transparent: false,
                platform: false,
                overflows_up: file.overflows_up,
                texture,
            },
        );
        Ok(())
    }

    /// Load every `*.material` file in `dir`. Unreadable files are skipped.
    pub fn load_materials(&mut self, dir: &Path) -> Result<usize, MaterialError> {
        let files: Vec<MaterialFile> = load_and_parse(dir, "material")?;
        let mut count = 0;
        for file in files {
            match self.insert_material(file) {
                Ok(()) => count += 1,
                Err(e) => warn!("Skipping material in {}: {e}", dir.display()),
            }
        }
        info!("Loaded {count} material(s) from {}", dir.display());
        Ok(count)
    }

    /// Load every `*.matmod` file in `dir`. Unreadable files are skipped.
    pub fn load_matmods(&mut self, dir: &Path) -> Result<usize, MaterialError> {
        let files: Vec<ModFile> = load_and_parse(dir, "matmod")?;
        let mut count = 0;
        for file in files {
            match self.insert_matmod(file) {
                Ok(()) => count += 1,
                Err(e) => warn!("Skipping matmod in {}: {e}", dir.display()),
            }
        }
        info!("Loaded {count} matmod(s) from {}", dir.display());
        Ok(count)
    }

    pub fn texture_path(&self, id: TextureId) -> Option<&str> {
        self.textures.get(id.0 as usize).map(String::as_str)
    }

    pub fn textures(&self) -> impl Iterator<Item = (TextureId, &str)> {
        self.textures
            .iter()
            .enumerate()
            .map(|(i, path)| (TextureId(i as u32), path.as_str()))
    }

    /// Record a sprite sheet as available. Returns `false` if it already was.
    pub fn mark_loaded(&mut self, id: TextureId) -> bool {
        self.loaded.insert(id)
    }

    pub fn mark_unloaded(&mut self, id: TextureId) -> bool {
        self.loaded.remove(&id)
    }

    pub fn is_loaded(&self, id: TextureId) -> bool {
        self.loaded.contains(&id)
    }

    /// Sprite sheets a region needs that are not loaded yet.
    pub fn pending_textures(&self, ids: &ResourceIds) -> Vec<TextureId> {
        let materials = ids.materials.iter().filter_map(|id| self.materials.get(id));
        let matmods = ids.matmods.iter().filter_map(|id| self.matmods.get(id));
        let mut pending: Vec<TextureId> = materials
            .chain(matmods)
            .map(|desc| desc.texture)
            .filter(|texture| !self.loaded.contains(texture))
            .collect();
        pending.sort();
        pending.dedup();
        pending
    }
}

impl AssetLookup for MaterialRegistry {
    fn material(&self, id: i16) -> Option<&MaterialDescriptor> {
        self.materials.get(&id)
    }

    fn matmod(&self, id: i16) -> Option<&MaterialDescriptor> {
        self.matmods.get(&id)
    }

    fn image(&self, descriptor: &MaterialDescriptor, hue_shift: u8) -> Option<ImageHandle> {
        self.loaded.contains(&descriptor.texture).then_some(ImageHandle {
            texture: descriptor.texture,
            hue_shift,
        })
    }
}

/// Load all files with `extension` from `dir` and deserialize them.
fn load_and_parse<T: serde::de::DeserializeOwned>(
    dir: &Path,
    extension: &str,
) -> Result<Vec<T>, MaterialError> {
    let mut results = Vec::new();
    for entry in std::fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.extension().map(|e| e == extension).unwrap_or(false) {
            match std::fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<T>(&content) {
                    Ok(parsed) => results.push(parsed),
                    Err(e) => warn!("Failed to parse {}: {e}", path.display()),
                },
                Err(e) => warn!("Failed to read {}: {e}", path.display()),
            }
        }
    }
    Ok(results)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("starmap-material-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parse_material_json() {
        let json = r#"{
            "materialId": 12,
            "materialName": "glass",
            "transparent": true,
            "renderParameters": { "texture": "glass.png", "variants": 3 }
        }"#;
        let file: MaterialFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.material_id, 12);
        assert!(file.transparent);
        assert!(!file.platform);
        assert_eq!(file.render_parameters.variants, 3);
    }

    #[test]
    fn parse_matmod_defaults() {
        let json = r#"{
            "modId": 2,
            "modName": "grass",
            "renderParameters": { "texture": "grass.png" }
        }"#;
        let file: ModFile = serde_json::from_str(json).unwrap();
        assert!(!file.overflows_up);
        assert_eq!(file.render_parameters.variants, 1);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut reg = MaterialRegistry::new();
        reg.insert_material(fixtures::material(3, 1)).unwrap();
        assert!(matches!(
            reg.insert_material(fixtures::material(3, 2)),
            Err(MaterialError::DuplicateMaterial(3))
        ));
        reg.insert_matmod(fixtures::matmod(3, 1, false)).unwrap();
        assert!(matches!(
            reg.insert_matmod(fixtures::matmod(3, 1, false)),
            Err(MaterialError::DuplicateMod(3))
        ));
    }

    #[test]
    fn shared_textures_are_interned() {
        let mut reg = MaterialRegistry::new();
        reg.insert_material(fixtures::material(3, 1)).unwrap();
        let mut other = fixtures::material(4, 1);
        other.render_parameters.texture = "tiles/3.png".into();
        reg.insert_material(other).unwrap();
        assert_eq!(reg.textures().count(), 1);
        assert_eq!(reg.material(3).unwrap().texture, reg.material(4).unwrap().texture);
    }

    #[test]
    fn image_requires_loaded_texture() {
        let mut reg = MaterialRegistry::new();
        reg.insert_material(fixtures::material(5, 1)).unwrap();
        let desc = reg.material(5).unwrap().clone();
        assert!(reg.image(&desc, 0).is_none());
        assert!(reg.mark_loaded(desc.texture));
        assert!(!reg.mark_loaded(desc.texture));
        assert_eq!(
            reg.image(&desc, 30),
            Some(ImageHandle {
                texture: desc.texture,
                hue_shift: 30
            })
        );
    }

    #[test]
    fn pending_textures_for_region() {
        let mut reg = MaterialRegistry::new();
        reg.insert_material(fixtures::material(5, 1)).unwrap();
        reg.insert_material(fixtures::material(6, 1)).unwrap();
        reg.insert_matmod(fixtures::matmod(2, 1, true)).unwrap();
        let ids = ResourceIds {
            materials: vec![5, 6, 99],
            matmods: vec![2],
        };
        assert_eq!(reg.pending_textures(&ids).len(), 3);
        let six = reg.material(6).unwrap().texture;
        reg.mark_loaded(six);
        let pending = reg.pending_textures(&ids);
        assert_eq!(pending.len(), 2);
        assert!(!pending.contains(&six));
        assert_eq!(reg.texture_path(six), Some("tiles/6.png"));
    }

    #[test]
    fn load_from_directory_skips_bad_files() {
        let dir = temp_dir("load");
        std::fs::write(
            dir.join("dirt.material"),
            r#"{"materialId": 5, "materialName": "dirt",
                "renderParameters": {"texture": "dirt.png", "variants": 5}}"#,
        )
        .unwrap();
        std::fs::write(dir.join("broken.material"), "{ not json").unwrap();
        std::fs::write(
            dir.join("grass.matmod"),
            r#"{"modId": 2, "modName": "grass", "overflowsUp": true,
                "renderParameters": {"texture": "grass.png", "variants": 3}}"#,
        )
        .unwrap();
        std::fs::write(dir.join("readme.txt"), "ignored").unwrap();

        let mut reg = MaterialRegistry::new();
        assert_eq!(reg.load_materials(&dir).unwrap(), 1);
        assert_eq!(reg.load_matmods(&dir).unwrap(), 1);
        assert_eq!(reg.material(5).unwrap().variants, 5);
        assert!(reg.matmod(2).unwrap().overflows_up);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let mut reg = MaterialRegistry::new();
        let missing = std::env::temp_dir().join("starmap-material-does-not-exist");
        assert!(matches!(
            reg.load_materials(&missing),
            Err(MaterialError::Io(_))
        ));
    }
}
