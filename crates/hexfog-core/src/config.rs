//! Grid configuration.

use crate::cell::TransitionRules;
use crate::hex::{HexMetrics, OffsetCoord, Orientation};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Settings for building and playing on a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Columns
    pub width: i32,
    /// Rows
    pub height: i32,
    /// Center-to-corner distance of a hex in world units
    pub hex_size: f64,
    pub orientation: Orientation,
    /// Cells materialized per batch
    pub batch_size: usize,
    /// Cells revealed when the map is first shown
    pub default_visible_cells: Vec<OffsetCoord>,
    /// Discovery radius around the default cells and each home
    pub default_visible_radius: u32,
    pub player_count: usize,
    /// Minimum hex distance between homes; 0 derives it from the grid size
    pub player_min_distance: u32,
    /// Whether focusing a selected cell locks the camera on it
    pub focus_from_selected: bool,
    /// Seed for spawn placement; random when absent
    pub seed: Option<u64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            hex_size: 1.0,
            orientation: Orientation::FlatTop,
            batch_size: 32,
            default_visible_cells: vec![OffsetCoord::new(0, 0)],
            default_visible_radius: 1,
            player_count: 2,
            player_min_distance: 0,
            focus_from_selected: true,
            seed: None,
        }
    }
}

impl GridConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Clamp every field to its smallest usable value, logging each correction
    pub fn validated(mut self) -> Self {
        if self.width < 1 {
            warn!("Grid width {} is invalid, using 1", self.width);
            self.width = 1;
        }
        if self.height < 1 {
            warn!("Grid height {} is invalid, using 1", self.height);
            self.height = 1;
        }
        if !(self.hex_size.is_finite() && self.hex_size > 0.0) {
            warn!("Hex size {} is invalid, using 1.0", self.hex_size);
            self.hex_size = 1.0;
        }
        if self.batch_size == 0 {
            warn!("Batch size 0 is invalid, using 1");
            self.batch_size = 1;
        }
        if self.player_count == 0 {
            warn!("Player count 0 is invalid, using 1");
            self.player_count = 1;
        }
        self
    }

    pub fn metrics(&self) -> HexMetrics {
        HexMetrics::new(self.hex_size, self.orientation)
    }

    pub fn rules(&self) -> TransitionRules {
        TransitionRules {
            focus_from_selected: self.focus_from_selected,
        }
    }

    /// Number of cells the grid will hold
    pub fn cell_count(&self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }

    /// Minimum home spacing, derived from the grid size when configured as 0
    pub fn spawn_min_distance(&self) -> u32 {
        if self.player_min_distance > 0 {
            return self.player_min_distance;
        }
        let average_side = ((self.width.max(1) + self.height.max(1)) / 2) as u32;
        let players = self.player_count.max(1) as u32;
        average_side.div_ceil(2 * players).max(1)
    }
}
