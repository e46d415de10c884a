use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct ViewerConfig {
    pub world: WorldSection,
    pub assets: AssetsSection,
    #[serde(default)]
    pub render: RenderSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct WorldSection {
    /// Directory holding `region_{x}_{y}.bin` files.
    pub directory: String,
    pub seed: u64,
    pub tiles_x: u32,
    pub tiles_y: u32,
}

#[derive(Debug, Deserialize)]
pub struct AssetsSection {
    pub materials: String,
    pub matmods: String,
    #[serde(default = "default_textures_directory")]
    pub textures: String,
}

fn default_textures_directory() -> String {
    "textures".into()
}

#[derive(Debug, Deserialize)]
pub struct RenderSection {
    /// Region coordinates to composite, as `[x, y]` pairs.
    #[serde(default)]
    pub regions: Vec<[i32; 2]>,
    #[serde(default = "default_output")]
    pub output: String,
    /// Upper bound on render passes while assets are still arriving.
    #[serde(default = "default_max_passes")]
    pub max_passes: u32,
}

fn default_output() -> String {
    "drawplan.json".into()
}

fn default_max_passes() -> u32 {
    8
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            regions: Vec::new(),
            output: default_output(),
            max_passes: default_max_passes(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

impl ViewerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}
