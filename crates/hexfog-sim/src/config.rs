//! Simulation scripts.

use hexfog_core::{BiomeTable, GridConfig, OffsetCoord, PathOptions, Terrain, TerrainMap};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid simulation config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where the terrain of the simulated map comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerrainSource {
    /// Plains everywhere
    #[default]
    AllLand,
    /// Random heights, `land_ratio` of them above water
    Random { land_ratio: f32 },
    /// Row-major height field classified with the default biome table
    Heights { values: Vec<f32> },
}

/// Highest height classified as water by the default biome table
const WATER_LINE: f32 = 0.40;
/// Highest height classified as walkable land below the mountains
const TREE_LINE: f32 = 0.85;

impl TerrainSource {
    pub fn build<R: Rng>(&self, width: usize, height: usize, rng: &mut R) -> TerrainMap {
        let biomes = BiomeTable::default();
        match self {
            TerrainSource::AllLand => TerrainMap::filled(width, height, Terrain::Plains),
            TerrainSource::Random { land_ratio } => {
                let land_ratio = land_ratio.clamp(0.0, 1.0);
                let heights: Vec<f32> = (0..width * height)
                    .map(|_| {
                        if rng.gen::<f32>() < land_ratio {
                            rng.gen_range(WATER_LINE + 0.01..=TREE_LINE)
                        } else {
                            rng.gen_range(0.0..=WATER_LINE)
                        }
                    })
                    .collect();
                TerrainMap::from_heights(width, height, &heights, &biomes)
            }
            TerrainSource::Heights { values } => {
                TerrainMap::from_heights(width, height, values, &biomes)
            }
        }
    }
}

/// A scripted stimulus, given by name so unknown ones can be exercised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedInteraction {
    pub coord: OffsetCoord,
    pub stimulus: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathQuery {
    pub from: OffsetCoord,
    pub to: OffsetCoord,
}

/// Everything one simulation run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub grid: GridConfig,
    pub terrain: TerrainSource,
    /// Starting units per player, home cell included
    pub units_per_player: usize,
    pub interactions: Vec<ScriptedInteraction>,
    /// Paths to search; empty means from the first home to the second
    pub path_queries: Vec<PathQuery>,
    pub path_options: PathOptions,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            terrain: TerrainSource::default(),
            units_per_player: 2,
            interactions: Vec::new(),
            path_queries: Vec::new(),
            path_options: PathOptions::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_script() {
        let config = SimConfig::from_json(
            r#"{
                "grid": {"width": 16, "height": 12, "seed": 3},
                "terrain": {"kind": "random", "land_ratio": 0.7},
                "interactions": [{"coord": {"col": 2, "row": 3}, "stimulus": "select"}],
                "path_queries": [{"from": {"col": 0, "row": 0}, "to": {"col": 5, "row": 5}}],
                "path_options": {"max_cost": 100}
            }"#,
        )
        .unwrap();

        assert_eq!(config.grid.width, 16);
        assert_eq!(config.grid.batch_size, GridConfig::default().batch_size);
        assert_eq!(config.terrain, TerrainSource::Random { land_ratio: 0.7 });
        assert_eq!(config.interactions[0].coord, OffsetCoord::new(2, 3));
        assert_eq!(config.path_queries.len(), 1);
        assert_eq!(config.path_options.max_cost, Some(100));
        assert_eq!(config.units_per_player, 2);
    }

    #[test]
    fn test_empty_script_is_default() {
        assert_eq!(SimConfig::from_json("{}").unwrap(), SimConfig::default());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            SimConfig::from_json(r#"{"terrain": {"kind": "lava"}}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("hexfog-sim-missing-config.json");
        assert!(matches!(
            SimConfig::load(&path),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("hexfog-sim-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"units_per_player": 4}"#).unwrap();
        let config = SimConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.units_per_player, 4);
    }

    #[test]
    fn test_random_terrain_ratio() {
        let mut rng = StdRng::seed_from_u64(12);
        let all_land = TerrainSource::Random { land_ratio: 1.0 }.build(10, 10, &mut rng);
        let all_water = TerrainSource::Random { land_ratio: 0.0 }.build(10, 10, &mut rng);

        for row in 0..10 {
            for col in 0..10 {
                assert!(all_land.get(col, row).is_some_and(|t| t.is_land()));
                assert!(all_water.get(col, row).is_some_and(|t| !t.is_land()));
            }
        }
    }

    #[test]
    fn test_height_field_terrain() {
        let mut rng = StdRng::seed_from_u64(0);
        let map = TerrainSource::Heights {
            values: vec![0.1, 0.5, 0.9, 0.99],
        }
        .build(2, 2, &mut rng);
        assert_eq!(map.get(0, 0), Some(Terrain::Ocean));
        assert_eq!(map.get(1, 0), Some(Terrain::Plains));
        assert_eq!(map.get(0, 1), Some(Terrain::Mountain));
        assert_eq!(map.get(1, 1), Some(Terrain::Snow));
    }
}
