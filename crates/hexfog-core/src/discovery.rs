//! Fog of war: breadth-first discovery around seed cells.

use crate::grid::{Grid, GridError};
use crate::hex::OffsetCoord;
use std::collections::HashSet;
use tracing::{debug, warn};

impl Grid {
    /// Cells within `radius` steps of the seeds, one layer per distance.
    ///
    /// Layer 0 holds the seeds themselves. No cell appears twice. Seeds that are
    /// not on the grid are skipped.
    pub fn discovery_layers(
        &self,
        seeds: &[OffsetCoord],
        radius: u32,
    ) -> Result<Vec<Vec<OffsetCoord>>, GridError> {
        self.ensure_ready()?;

        let mut visited = HashSet::new();
        let mut frontier = Vec::new();
        for seed in seeds {
            if !self.cells.contains_key(seed) {
                warn!("Discovery seed {} is not on the grid", seed);
                continue;
            }
            if visited.insert(*seed) {
                frontier.push(*seed);
            }
        }

        let mut layers = Vec::new();
        for _ in 0..=radius {
            if frontier.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for coord in &frontier {
                let Some(cell) = self.cells.get(coord) else {
                    continue;
                };
                for neighbor in cell.neighbors() {
                    if visited.insert(*neighbor) {
                        next.push(*neighbor);
                    }
                }
            }
            layers.push(std::mem::replace(&mut frontier, next));
        }
        Ok(layers)
    }

    /// Reveal every cell within `radius` of the seeds. Returns the number of cells
    /// in the area.
    pub fn discover_area(
        &mut self,
        seeds: &[OffsetCoord],
        radius: u32,
    ) -> Result<usize, GridError> {
        let layers = self.discovery_layers(seeds, radius)?;
        let mut count = 0;
        for coord in layers.iter().flatten() {
            if let Some(cell) = self.cells.get_mut(coord) {
                cell.discover(&mut self.observers);
                count += 1;
            }
        }
        debug!("Discovered {} cells around {} seeds", count, seeds.len());
        Ok(count)
    }

    /// Cells within `radius` of a home cell, without changing any state
    pub fn starting_area(
        &self,
        home: OffsetCoord,
        radius: u32,
    ) -> Result<Vec<OffsetCoord>, GridError> {
        self.ensure_ready()?;
        self.cell_or_err(home)?;
        let layers = self.discovery_layers(&[home], radius)?;
        Ok(layers.into_iter().flatten().collect())
    }

    /// Reveal the configured default cells
    pub fn discover_defaults(&mut self) -> Result<usize, GridError> {
        let seeds = self.config.default_visible_cells.clone();
        let radius = self.config.default_visible_radius;
        self.discover_area(&seeds, radius)
    }
}

#[cfg(test)]
mod tests {
    use crate::cell::CellState;
    use crate::config::GridConfig;
    use crate::grid::{Grid, GridError};
    use crate::hex::{OffsetCoord, Orientation};
    use crate::terrain::{Terrain, TerrainMap};

    fn grid(width: i32, height: i32, orientation: Orientation) -> Grid {
        let mut grid = Grid::new(GridConfig {
            width,
            height,
            orientation,
            seed: Some(3),
            ..GridConfig::default()
        });
        grid.generate(&TerrainMap::filled(
            width as usize,
            height as usize,
            Terrain::Plains,
        ))
        .unwrap();
        grid
    }

    #[test]
    fn test_layers_match_distance() {
        for orientation in [Orientation::FlatTop, Orientation::PointyTop] {
            let grid = grid(12, 12, orientation);
            let seed = OffsetCoord::new(5, 6);
            let layers = grid.discovery_layers(&[seed], 4).unwrap();

            assert_eq!(layers.len(), 5);
            for (depth, layer) in layers.iter().enumerate() {
                assert_eq!(layer.len(), if depth == 0 { 1 } else { 6 * depth });
                for coord in layer {
                    assert_eq!(seed.distance_to(*coord, orientation), depth as u32);
                }
            }
        }
    }

    #[test]
    fn test_discover_area_reveals_exactly_radius() {
        let mut grid = grid(10, 10, Orientation::FlatTop);
        let seed = OffsetCoord::new(4, 4);

        assert_eq!(grid.discover_area(&[seed], 2), Ok(19));
        for cell in grid.cells() {
            let near = seed.distance_to(cell.offset(), Orientation::FlatTop) <= 2;
            assert_eq!(cell.state() == CellState::Visible, near, "{}", cell.offset());
        }
    }

    #[test]
    fn test_overlapping_seeds_not_repeated() {
        let grid = grid(10, 10, Orientation::PointyTop);
        let seeds = [
            OffsetCoord::new(3, 3),
            OffsetCoord::new(4, 3),
            OffsetCoord::new(3, 3),
        ];
        let area: Vec<_> = grid
            .discovery_layers(&seeds, 2)
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        let unique: std::collections::HashSet<_> = area.iter().collect();
        assert_eq!(area.len(), unique.len());
    }

    #[test]
    fn test_corner_is_clipped_by_edges() {
        let grid = grid(10, 10, Orientation::FlatTop);
        let area = grid.starting_area(OffsetCoord::new(0, 0), 1).unwrap();
        assert_eq!(area.len(), 3);
        assert!(grid.cells().all(|c| c.state() == CellState::Hidden));
    }

    #[test]
    fn test_unknown_seed_skipped() {
        let mut grid = grid(5, 5, Orientation::FlatTop);
        assert_eq!(grid.discover_area(&[OffsetCoord::new(50, 50)], 3), Ok(0));
        assert_eq!(
            grid.starting_area(OffsetCoord::new(50, 50), 1),
            Err(GridError::UnknownCell(OffsetCoord::new(50, 50)))
        );
    }

    #[test]
    fn test_discover_defaults() {
        let mut grid = grid(10, 10, Orientation::FlatTop);
        // (0,0) with radius 1 on a flat-top grid: itself, (1,0) and (0,1)
        assert_eq!(grid.discover_defaults(), Ok(3));
        assert_eq!(grid.count_in_state(CellState::Visible), 3);
    }

    #[test]
    fn test_discovery_needs_generation() {
        let grid = Grid::new(GridConfig::default());
        assert_eq!(
            grid.discovery_layers(&[OffsetCoord::new(0, 0)], 1),
            Err(GridError::NotReady)
        );
    }
}
