//! World generation configuration with RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_biome::{BiomeCatalog, BiomeDefinition};
use strata_carve::StructureSettings;
use strata_coords::ChunkExtents;
use strata_field::FieldSettings;
use strata_scatter::ScatterSettings;
use strata_world::SchedulerSettings;
use tracing::{info, warn};

use crate::error::ConfigError;

/// Seed and session settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldSection {
    pub seed: u64,
    /// Replace the seed with a random one at startup.
    pub randomize_seed: bool,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            seed: 0,
            randomize_seed: false,
            log_level: "info".to_string(),
        }
    }
}

/// Top-level world generation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldGenConfig {
    pub world: WorldSection,
    pub extents: ChunkExtents,
    /// Density field pipeline settings.
    pub field: FieldSettings,
    /// Structure placement settings.
    pub structures: StructureSettings,
    /// Scatter object settings.
    pub scatter: ScatterSettings,
    /// Chunk scheduler settings.
    pub scheduler: SchedulerSettings,
    /// Biome catalog; at least one entry is required, a fallback is
    /// substituted otherwise.
    pub biomes: Vec<BiomeDefinition>,
}

impl WorldGenConfig {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("worldgen.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let mut config: WorldGenConfig =
                ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate();
            info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let mut config = WorldGenConfig::default();
            config.validate();
            config.save(config_dir)?;
            info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `worldgen.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("worldgen.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("worldgen.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let mut new_config: WorldGenConfig =
            ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate();

        if &new_config != self {
            info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Repairs invalid sections in place.
    pub fn validate(&mut self) {
        if self.biomes.is_empty() {
            warn!("no biomes configured, substituting the fallback biome");
            self.biomes.push(BiomeDefinition::fallback());
        }
        if self.structures.check_stride < 1 {
            warn!(
                stride = self.structures.check_stride,
                "structure check stride below 1, clamping"
            );
            self.structures.check_stride = 1;
        }
    }

    /// The seed to run with, honoring `randomize_seed`.
    pub fn effective_seed(&self) -> u64 {
        if self.world.randomize_seed {
            rand::random::<u64>()
        } else {
            self.world.seed
        }
    }

    pub fn catalog(&self) -> BiomeCatalog {
        BiomeCatalog::new(self.biomes.clone())
    }
}
