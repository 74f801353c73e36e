//! Terrain classification.
//!
//! The grid does not generate terrain itself. Callers hand it a `TerrainMap`, one
//! optional `Terrain` per offset coordinate. A missing entry means the classifier
//! produced nothing for that cell; the cell still exists but cannot be materialized.
//!
//! `BiomeTable` maps an externally produced height field onto terrain kinds using
//! ascending height thresholds.

use serde::{Deserialize, Serialize};

/// Kind of terrain on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    /// Deep water
    Ocean,
    /// Shallow water along the shore
    Coast,
    Beach,
    Plains,
    Grassland,
    Forest,
    Hills,
    /// Impassable peaks
    Mountain,
    Snow,
}

impl Terrain {
    /// All terrain kinds, lowest to highest
    pub const ALL: [Terrain; 9] = [
        Terrain::Ocean,
        Terrain::Coast,
        Terrain::Beach,
        Terrain::Plains,
        Terrain::Grassland,
        Terrain::Forest,
        Terrain::Hills,
        Terrain::Mountain,
        Terrain::Snow,
    ];

    /// Whether units can stand on this terrain
    pub fn is_land(&self) -> bool {
        !matches!(self, Terrain::Ocean | Terrain::Coast | Terrain::Mountain)
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Terrain::Ocean => "Ocean",
            Terrain::Coast => "Coast",
            Terrain::Beach => "Beach",
            Terrain::Plains => "Plains",
            Terrain::Grassland => "Grassland",
            Terrain::Forest => "Forest",
            Terrain::Hills => "Hills",
            Terrain::Mountain => "Mountain",
            Terrain::Snow => "Snow",
        }
    }
}

/// Terrain per cell, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainMap {
    width: usize,
    height: usize,
    tiles: Vec<Option<Terrain>>,
}

impl TerrainMap {
    /// Create a map with no terrain assigned anywhere
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![None; width * height],
        }
    }

    /// Create a map where every cell has the same terrain
    pub fn filled(width: usize, height: usize, terrain: Terrain) -> Self {
        Self {
            width,
            height,
            tiles: vec![Some(terrain); width * height],
        }
    }

    /// Create a map by classifying every (col, row)
    pub fn from_fn<F>(width: usize, height: usize, mut classify: F) -> Self
    where
        F: FnMut(usize, usize) -> Option<Terrain>,
    {
        let mut tiles = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                tiles.push(classify(col, row));
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    /// Classify a row-major height field with a biome table.
    ///
    /// Missing heights (a field shorter than `width * height`) leave cells unclassified.
    pub fn from_heights(width: usize, height: usize, heights: &[f32], biomes: &BiomeTable) -> Self {
        Self::from_fn(width, height, |col, row| {
            heights
                .get(row * width + col)
                .and_then(|h| biomes.classify(*h))
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Terrain at a coordinate, `None` when unclassified or out of bounds
    pub fn get(&self, col: i32, row: i32) -> Option<Terrain> {
        self.index(col, row).and_then(|i| self.tiles[i])
    }

    /// Assign terrain at a coordinate. Out-of-bounds writes are ignored.
    pub fn set(&mut self, col: i32, row: i32, terrain: Option<Terrain>) {
        if let Some(i) = self.index(col, row) {
            self.tiles[i] = terrain;
        }
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        let col = usize::try_from(col).ok()?;
        let row = usize::try_from(row).ok()?;
        (col < self.width && row < self.height).then_some(row * self.width + col)
    }
}

/// One height band of a biome table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Biome {
    /// Inclusive upper bound of the band
    pub max_height: f32,
    pub terrain: Terrain,
}

/// Height thresholds, checked in ascending order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeTable {
    bands: Vec<Biome>,
}

impl BiomeTable {
    /// Build a table, sorting the bands by height
    pub fn new(mut bands: Vec<Biome>) -> Self {
        bands.sort_by(|a, b| a.max_height.total_cmp(&b.max_height));
        Self { bands }
    }

    /// The first band whose upper bound is at or above `height`
    pub fn classify(&self, height: f32) -> Option<Terrain> {
        self.bands
            .iter()
            .find(|band| height <= band.max_height)
            .map(|band| band.terrain)
    }

    pub fn bands(&self) -> &[Biome] {
        &self.bands
    }
}

impl Default for BiomeTable {
    /// Bands for heights normalized to 0..=1
    fn default() -> Self {
        let band = |max_height, terrain| Biome {
            max_height,
            terrain,
        };
        Self::new(vec![
            band(0.30, Terrain::Ocean),
            band(0.40, Terrain::Coast),
            band(0.45, Terrain::Beach),
            band(0.55, Terrain::Plains),
            band(0.65, Terrain::Grassland),
            band(0.75, Terrain::Forest),
            band(0.85, Terrain::Hills),
            band(0.95, Terrain::Mountain),
            band(1.00, Terrain::Snow),
        ])
    }
}
