//! Best-first path search over grid cells.
//!
//! Each step into a cell costs 1 on land and `PathOptions::non_land_cost` elsewhere,
//! so water and mountains are avoided rather than forbidden. Candidates are ranked by
//! accumulated cost plus their hex distance to both the origin and the destination;
//! ties go to the candidate closer to the destination.

use crate::grid::{Grid, GridError};
use crate::hex::OffsetCoord;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::debug;

/// Default cost of stepping into a cell that is not land
pub const NON_LAND_COST: u64 = 999_999;

/// Search settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathOptions {
    /// Cost of stepping into water or mountains
    pub non_land_cost: u64,
    /// Candidates whose accumulated cost exceeds this are dropped
    pub max_cost: Option<u64>,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            non_land_cost: NON_LAND_COST,
            max_cost: None,
        }
    }
}

/// A found path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    /// Origin first, destination last
    pub cells: Vec<OffsetCoord>,
    /// Sum of step costs, the origin excluded
    pub cost: u64,
}

impl Path {
    /// Number of cells, both ends included
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Frontier entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathNode {
    coord: OffsetCoord,
    /// Accumulated step cost from the origin
    cost: u64,
    to_destination: u32,
    total: u64,
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total
            .cmp(&other.total)
            .then(self.to_destination.cmp(&other.to_destination))
            .then_with(|| self.coord.cmp(&other.coord))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Searches paths on a borrowed grid
pub struct Pathfinder<'g> {
    grid: &'g Grid,
    options: PathOptions,
}

impl<'g> Pathfinder<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        Self::with_options(grid, PathOptions::default())
    }

    pub fn with_options(grid: &'g Grid, options: PathOptions) -> Self {
        Self { grid, options }
    }

    pub fn options(&self) -> PathOptions {
        self.options
    }

    /// Find a path from `origin` to `destination`.
    ///
    /// Fails with `GridError::NoPath` when every candidate has been evaluated or
    /// pruned by the cost ceiling without reaching the destination.
    pub fn find_path(
        &self,
        origin: OffsetCoord,
        destination: OffsetCoord,
    ) -> Result<Path, GridError> {
        self.grid.ensure_ready()?;
        let origin_cell = self.grid.cell_or_err(origin)?;
        let destination_cell = self.grid.cell_or_err(destination)?;

        let mut frontier = BinaryHeap::new();
        let mut evaluated = HashSet::new();
        let mut best_cost: HashMap<OffsetCoord, u64> = HashMap::new();
        let mut parents: HashMap<OffsetCoord, OffsetCoord> = HashMap::new();

        let to_destination = origin_cell.distance_to(destination_cell);
        best_cost.insert(origin, 0);
        frontier.push(Reverse(PathNode {
            coord: origin,
            cost: 0,
            to_destination,
            total: to_destination as u64,
        }));

        while let Some(Reverse(current)) = frontier.pop() {
            if !evaluated.insert(current.coord) {
                continue;
            }
            if current.coord == destination {
                let cells = reconstruct(&parents, destination);
                debug!(
                    "Path {} -> {}: {} cells, cost {} ({} evaluated)",
                    origin,
                    destination,
                    cells.len(),
                    current.cost,
                    evaluated.len()
                );
                return Ok(Path {
                    cells,
                    cost: current.cost,
                });
            }

            let Some(cell) = self.grid.cell(current.coord) else {
                continue;
            };
            for neighbor in cell.neighbors() {
                if evaluated.contains(neighbor) {
                    continue;
                }
                let Some(next) = self.grid.cell(*neighbor) else {
                    continue;
                };

                let step = if next.is_land() {
                    1
                } else {
                    self.options.non_land_cost
                };
                let cost = current.cost.saturating_add(step);
                if self.options.max_cost.is_some_and(|max| cost > max) {
                    continue;
                }
                if best_cost.get(neighbor).is_some_and(|&known| cost >= known) {
                    continue;
                }

                best_cost.insert(*neighbor, cost);
                parents.insert(*neighbor, current.coord);
                let to_destination = next.distance_to(destination_cell);
                let from_origin = next.distance_to(origin_cell);
                frontier.push(Reverse(PathNode {
                    coord: *neighbor,
                    cost,
                    to_destination,
                    total: cost
                        .saturating_add(from_origin as u64)
                        .saturating_add(to_destination as u64),
                }));
            }
        }

        debug!(
            "No path {} -> {} after evaluating {} cells",
            origin,
            destination,
            evaluated.len()
        );
        Err(GridError::NoPath {
            origin,
            destination,
        })
    }
}

fn reconstruct(
    parents: &HashMap<OffsetCoord, OffsetCoord>,
    destination: OffsetCoord,
) -> Vec<OffsetCoord> {
    let mut cells = vec![destination];
    let mut current = destination;
    while let Some(&parent) = parents.get(&current) {
        current = parent;
        cells.push(current);
    }
    cells.reverse();
    cells
}

impl Grid {
    /// A pathfinder with default options over this grid
    pub fn pathfinder(&self) -> Pathfinder<'_> {
        Pathfinder::new(self)
    }

    /// Shortest path between two cells with default options
    pub fn find_path(
        &self,
        origin: OffsetCoord,
        destination: OffsetCoord,
    ) -> Result<Path, GridError> {
        self.pathfinder().find_path(origin, destination)
    }
}
