//! Home cell placement and player initialization.
//!
//! Each player draws its home from a region of the grid that depends on its index:
//! player 0 from a box around the centre, players 1 to 4 from the four quadrants
//! (inset from the outer edges), later players share the last quadrant. A home must
//! be land, unclaimed, and at least the minimum spawn distance from every earlier
//! home.
//!
//! Placement samples random cells in the region a bounded number of times, then
//! scans the whole region, then gives up with `GridError::NoValidSpawn`. Candidates
//! that still leave every later player a valid cell are preferred. Dispatching all
//! players plans every home before claiming any, retrying the plan when a later
//! player is boxed in.

use crate::events::{GridEvent, GridObserver};
use crate::grid::{Grid, GridError};
use crate::hex::OffsetCoord;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, info, warn};

/// Random samples tried before scanning the whole region
pub const MAX_SPAWN_ATTEMPTS: usize = 256;

/// Whole-dispatch plans tried before giving up
pub const MAX_DISPATCH_ATTEMPTS: usize = 16;

/// Inclusive rectangle of offset coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRegion {
    pub min_col: i32,
    pub max_col: i32,
    pub min_row: i32,
    pub max_row: i32,
}

impl SpawnRegion {
    pub fn contains(&self, coord: OffsetCoord) -> bool {
        (self.min_col..=self.max_col).contains(&coord.col)
            && (self.min_row..=self.max_row).contains(&coord.row)
    }

    pub fn is_empty(&self) -> bool {
        self.min_col > self.max_col || self.min_row > self.max_row
    }

    /// Every coordinate in the region, row-major
    pub fn coords(&self) -> impl Iterator<Item = OffsetCoord> + '_ {
        (self.min_row..=self.max_row).flat_map(move |row| {
            (self.min_col..=self.max_col).map(move |col| OffsetCoord::new(col, row))
        })
    }

    /// A uniformly random coordinate in the region
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<OffsetCoord> {
        if self.is_empty() {
            return None;
        }
        Some(OffsetCoord::new(
            rng.gen_range(self.min_col..=self.max_col),
            rng.gen_range(self.min_row..=self.max_row),
        ))
    }
}

/// What a player starts the game with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStart {
    pub index: usize,
    pub home: OffsetCoord,
    /// Cells revealed around the home
    pub area: Vec<OffsetCoord>,
    /// Cells holding the player's starting units, home first
    pub units: Vec<OffsetCoord>,
}

/// Region a player's home is drawn from on a `width` x `height` grid
pub fn spawn_region(player: usize, width: i32, height: i32, min_distance: u32) -> SpawnRegion {
    let margin = min_distance as i32;
    let last_col = width - 1;
    let last_row = height - 1;

    if player == 0 {
        let (center_col, center_row) = (width / 2, height / 2);
        return SpawnRegion {
            min_col: (center_col - margin).max(0),
            max_col: (center_col + margin).min(last_col),
            min_row: (center_row - margin).max(0),
            max_row: (center_row + margin).min(last_row),
        };
    }

    let (half_col, half_row) = (width / 2, height / 2);
    let inset_col = margin.min((half_col - 1) / 2).max(0);
    let inset_row = margin.min((half_row - 1) / 2).max(0);
    let west = (inset_col, (half_col - 1).max(0));
    let east = (half_col.min(last_col), last_col - inset_col);
    let north = (inset_row, (half_row - 1).max(0));
    let south = (half_row.min(last_row), last_row - inset_row);

    let ((min_col, max_col), (min_row, max_row)) = match player {
        1 => (west, north),
        2 => (east, north),
        3 => (west, south),
        _ => (east, south),
    };
    SpawnRegion {
        min_col,
        max_col,
        min_row,
        max_row,
    }
}

impl Grid {
    /// Region player `player` draws its home from on this grid
    pub fn spawn_region(&self, player: usize) -> SpawnRegion {
        spawn_region(
            player,
            self.config.width,
            self.config.height,
            self.config.spawn_min_distance(),
        )
    }

    fn is_valid_spawn(&self, coord: OffsetCoord, homes: &[OffsetCoord], min_distance: u32) -> bool {
        let Some(cell) = self.cells.get(&coord) else {
            return false;
        };
        cell.is_land()
            && !homes.contains(&coord)
            && homes.iter().all(|home| {
                self.cells
                    .get(home)
                    .map_or(true, |home| home.distance_to(cell) >= min_distance)
            })
    }

    /// Whether every player in `later` still has a valid cell once `coord` is claimed
    fn leaves_room(
        &self,
        coord: OffsetCoord,
        homes: &[OffsetCoord],
        later: Range<usize>,
        min_distance: u32,
    ) -> bool {
        let mut claimed = homes.to_vec();
        claimed.push(coord);
        later.into_iter().all(|player| {
            self.spawn_region(player)
                .coords()
                .any(|candidate| self.is_valid_spawn(candidate, &claimed, min_distance))
        })
    }

    /// Pick a home for `player` given the homes already taken.
    ///
    /// Cells that leave room for the players after it, up to `player_count`, are
    /// preferred over cells that are merely valid.
    fn pick_home<R: Rng>(
        &self,
        player: usize,
        homes: &[OffsetCoord],
        player_count: usize,
        rng: &mut R,
    ) -> Result<OffsetCoord, GridError> {
        let min_distance = self.config.spawn_min_distance();
        let region = self.spawn_region(player);
        let later = player + 1..player_count.max(player + 1);
        let fits = |coord: OffsetCoord| {
            self.is_valid_spawn(coord, homes, min_distance)
                && self.leaves_room(coord, homes, later.clone(), min_distance)
        };

        for _ in 0..MAX_SPAWN_ATTEMPTS {
            match region.sample(rng) {
                Some(coord) if fits(coord) => return Ok(coord),
                Some(_) => continue,
                None => break,
            }
        }

        debug!(
            "No spawn for player {} after {} samples, scanning region",
            player, MAX_SPAWN_ATTEMPTS
        );
        let valid: Vec<OffsetCoord> = region
            .coords()
            .filter(|coord| self.is_valid_spawn(*coord, homes, min_distance))
            .collect();
        let roomy: Vec<OffsetCoord> = valid
            .iter()
            .copied()
            .filter(|coord| self.leaves_room(*coord, homes, later.clone(), min_distance))
            .collect();
        roomy
            .choose(rng)
            .or_else(|| valid.choose(rng))
            .copied()
            .ok_or_else(|| {
                debug!("No valid spawn cell for player {} in {:?}", player, region);
                GridError::NoValidSpawn { player }
            })
    }

    /// Pick a home for `player` without claiming it
    pub fn choose_spawn_with_rng<R: Rng>(
        &self,
        player: usize,
        rng: &mut R,
    ) -> Result<OffsetCoord, GridError> {
        self.ensure_ready()?;
        self.pick_home(player, &self.homes, self.config.player_count, rng)
    }

    /// Claim a home for the next player with the grid's own RNG
    pub fn place_player(&mut self) -> Result<OffsetCoord, GridError> {
        let mut rng = self.rng.clone();
        let result = self.place_player_with_rng(&mut rng);
        self.rng = rng;
        result
    }

    /// Claim a home for the next player and reveal it
    pub fn place_player_with_rng<R: Rng>(
        &mut self,
        rng: &mut R,
    ) -> Result<OffsetCoord, GridError> {
        let player = self.homes.len();
        let home = self.choose_spawn_with_rng(player, rng)?;
        self.claim_home(player, home);
        Ok(home)
    }

    fn claim_home(&mut self, player: usize, home: OffsetCoord) {
        self.homes.push(home);
        if let Some(cell) = self.cells.get_mut(&home) {
            cell.discover(&mut self.observers);
        }
        info!("Player {} spawns at {}", player, home);
        self.observers
            .notify(&GridEvent::HomeAssigned { player, coord: home });
    }

    /// One home per configured player, nothing claimed
    fn plan_homes<R: Rng>(&self, rng: &mut R) -> Result<Vec<OffsetCoord>, GridError> {
        let player_count = self.config.player_count;
        let mut homes = Vec::with_capacity(player_count);
        for player in 0..player_count {
            let home = self.pick_home(player, &homes, player_count, rng)?;
            homes.push(home);
        }
        Ok(homes)
    }

    /// Assign a home to every configured player, replacing earlier assignments.
    ///
    /// Homes are planned as a whole and only claimed once every player has one. A
    /// failed plan is retried up to `MAX_DISPATCH_ATTEMPTS` times; if all fail, the
    /// grid keeps its previous homes and no cell is revealed.
    pub fn dispatch_players(&mut self) -> Result<Vec<OffsetCoord>, GridError> {
        self.ensure_ready()?;
        let mut rng = self.rng.clone();
        let planned = self.dispatch_plan(&mut rng);
        self.rng = rng;
        let homes = planned?;

        self.homes.clear();
        for (player, home) in homes.iter().enumerate() {
            self.claim_home(player, *home);
        }
        Ok(homes)
    }

    fn dispatch_plan<R: Rng>(&self, rng: &mut R) -> Result<Vec<OffsetCoord>, GridError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.plan_homes(rng) {
                Ok(homes) => return Ok(homes),
                // The first player's candidates do not depend on earlier draws
                Err(GridError::NoValidSpawn { player: 0 }) => {
                    warn!("No valid spawn cell for player 0");
                    return Err(GridError::NoValidSpawn { player: 0 });
                }
                Err(e) if attempt >= MAX_DISPATCH_ATTEMPTS => {
                    warn!("Dispatch failed after {} attempts: {}", attempt, e);
                    return Err(e);
                }
                Err(e) => debug!("Dispatch attempt {} failed: {}", attempt, e),
            }
        }
    }

    /// Up to `count` distinct land cells around a home, nearest first, home included
    pub fn starting_unit_cells(
        &self,
        home: OffsetCoord,
        count: usize,
    ) -> Result<Vec<OffsetCoord>, GridError> {
        let radius = self.config.default_visible_radius;
        Ok(self
            .starting_area(home, radius)?
            .into_iter()
            .filter(|coord| self.cells.get(coord).is_some_and(|c| c.is_land()))
            .take(count)
            .collect())
    }

    /// Dispatch every player, reveal their starting areas and place `units_per_player`
    /// starting units each.
    pub fn init_players(
        &mut self,
        units_per_player: usize,
    ) -> Result<Vec<PlayerStart>, GridError> {
        let homes = self.dispatch_players()?;
        let radius = self.config.default_visible_radius;

        let mut starts = Vec::with_capacity(homes.len());
        for (index, home) in homes.into_iter().enumerate() {
            let area = self.starting_area(home, radius)?;
            self.discover_area(&[home], radius)?;
            let units = self.starting_unit_cells(home, units_per_player)?;
            if units.len() < units_per_player {
                warn!(
                    "Player {} has room for {} of {} starting units",
                    index,
                    units.len(),
                    units_per_player
                );
            }
            starts.push(PlayerStart {
                index,
                home,
                area,
                units,
            });
        }
        Ok(starts)
    }
}
