//! The grid: owner of every cell.
//!
//! A grid goes through three phases. Generation builds the cell data, either inline
//! or on a worker thread. Materialization creates the visible artifacts in batches.
//! After generation, the grid answers gameplay queries: stimuli, hover, discovery,
//! spawning and pathfinding. Every gameplay operation fails with
//! `GridError::NotReady` until generated cells have been handed over.

use crate::cell::{Cell, CellState, Stimulus, TransitionRules, UnknownStimulus};
use crate::config::GridConfig;
use crate::events::{GridEvent, GridObserver, Observers};
use crate::generation::{build_cells, GeneratedCells, GenerationError, GenerationHandle};
use crate::hex::{HexMetrics, OffsetCoord};
use crate::materialize::{ArtifactFactory, MaterializeCursor, MaterializeStep};
use crate::terrain::TerrainMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors returned by grid operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("Grid has no generated cells yet")]
    NotReady,

    #[error("No cell at {0}")]
    UnknownCell(OffsetCoord),

    #[error("No path from {origin} to {destination}")]
    NoPath {
        origin: OffsetCoord,
        destination: OffsetCoord,
    },

    #[error("No valid spawn cell for player {player}")]
    NoValidSpawn { player: usize },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    UnknownStimulus(#[from] UnknownStimulus),
}

/// Lifecycle phase of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridStatus {
    /// No cells and nothing in flight
    Empty,
    /// A background generation has not handed its cells over yet
    Generating,
    /// Cells are installed
    Ready,
}

pub struct Grid {
    pub(crate) config: GridConfig,
    metrics: HexMetrics,
    rules: TransitionRules,
    pub(crate) cells: HashMap<OffsetCoord, Cell>,
    /// Row-major coordinates, the materialization order
    order: Vec<OffsetCoord>,
    pending: Option<GenerationHandle>,
    cursor: MaterializeCursor,
    pub(crate) homes: Vec<OffsetCoord>,
    /// Cell under the pointer
    hovered: Option<OffsetCoord>,
    pub(crate) observers: Observers,
    pub(crate) rng: StdRng,
}

impl Grid {
    /// Create an empty grid. The configuration is clamped to valid values first.
    pub fn new(config: GridConfig) -> Self {
        let config = config.validated();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            metrics: config.metrics(),
            rules: config.rules(),
            config,
            cells: HashMap::new(),
            order: Vec::new(),
            pending: None,
            cursor: MaterializeCursor::default(),
            homes: Vec::new(),
            hovered: None,
            observers: Observers::default(),
            rng,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn metrics(&self) -> HexMetrics {
        self.metrics
    }

    /// Register an observer for every event the grid and its cells raise
    pub fn subscribe<O>(&mut self, observer: O)
    where
        O: GridObserver + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    // ==================== Generation ====================

    /// Build the cells inline, replacing any previous ones
    pub fn generate(&mut self, terrain: &TerrainMap) -> Result<usize, GridError> {
        self.reset();
        let generated = build_cells(
            self.config.width,
            self.config.height,
            self.config.orientation,
            terrain,
            &AtomicBool::new(false),
        )?;
        Ok(self.install(generated))
    }

    /// Start building the cells on a worker thread, replacing any previous ones.
    ///
    /// The grid reports `GridStatus::Generating` until `poll_generation` or
    /// `wait_for_generation` picks up the result.
    pub fn generate_in_background(&mut self, terrain: TerrainMap) {
        self.reset();
        info!(
            "Generating {}x{} grid in the background",
            self.config.width, self.config.height
        );
        self.pending = Some(GenerationHandle::spawn(
            self.config.width,
            self.config.height,
            self.config.orientation,
            terrain,
        ));
    }

    /// Install the background result if it has arrived. Returns whether the grid is ready.
    pub fn poll_generation(&mut self) -> Result<bool, GridError> {
        let Some(handle) = &self.pending else {
            return Ok(self.is_ready());
        };
        match handle.try_take() {
            None => Ok(false),
            Some(result) => {
                self.pending = None;
                let generated = result?;
                self.install(generated);
                Ok(true)
            }
        }
    }

    /// Block until the background generation hands its cells over
    pub fn wait_for_generation(&mut self) -> Result<(), GridError> {
        match self.pending.take() {
            Some(handle) => {
                let generated = handle.wait()?;
                self.install(generated);
                Ok(())
            }
            None if self.is_ready() => Ok(()),
            None => Err(GridError::NotReady),
        }
    }

    pub fn status(&self) -> GridStatus {
        if self.pending.is_some() {
            GridStatus::Generating
        } else if self.order.is_empty() {
            GridStatus::Empty
        } else {
            GridStatus::Ready
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status() == GridStatus::Ready
    }

    pub(crate) fn ensure_ready(&self) -> Result<(), GridError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(GridError::NotReady)
        }
    }

    fn install(&mut self, generated: GeneratedCells) -> usize {
        let count = generated.len();
        self.cells = generated.cells;
        self.order = generated.order;
        self.cursor = MaterializeCursor::default();
        info!("Grid ready with {} cells", count);
        self.observers
            .notify(&GridEvent::GenerationComplete { cells: count });
        count
    }

    /// Drop cells, homes and hover, cancelling any generation in flight
    fn reset(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.cancel();
            debug!("Cancelled in-flight generation");
        }
        self.cells.clear();
        self.order.clear();
        self.cursor = MaterializeCursor::default();
        self.homes.clear();
        self.hovered = None;
    }

    /// Release every cell and artifact. Safe in any phase.
    pub fn clear(&mut self) {
        let count = self.cells.len();
        self.reset();
        info!("Cleared {} cells", count);
        self.observers.notify(&GridEvent::Cleared { cells: count });
    }

    // ==================== Materialization ====================

    /// Materialize the next batch of `batch_size` cells
    pub fn materialize_next_batch(
        &mut self,
        factory: &mut dyn ArtifactFactory,
    ) -> Result<MaterializeStep, GridError> {
        self.ensure_ready()?;
        Ok(self.cursor.step(
            &mut self.cells,
            &self.order,
            self.config.batch_size,
            &self.metrics,
            factory,
            &mut self.observers,
        ))
    }

    /// Run every remaining batch. Returns (materialized, failed).
    pub fn materialize_all(
        &mut self,
        factory: &mut dyn ArtifactFactory,
    ) -> Result<(usize, usize), GridError> {
        loop {
            if let MaterializeStep::Complete {
                materialized,
                failed,
            } = self.materialize_next_batch(factory)?
            {
                return Ok((materialized, failed));
            }
        }
    }

    pub fn is_materialized(&self) -> bool {
        self.cursor.is_complete()
    }

    /// Cells whose artifact could not be created so far
    pub fn materialize_failures(&self) -> usize {
        self.cursor.failed()
    }

    // ==================== Lookup ====================

    pub fn cell(&self, coord: OffsetCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    pub(crate) fn cell_or_err(&self, coord: OffsetCoord) -> Result<&Cell, GridError> {
        self.cells.get(&coord).ok_or(GridError::UnknownCell(coord))
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.order.iter().filter_map(|coord| self.cells.get(coord))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn land_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells().filter(|cell| cell.is_land())
    }

    pub fn count_in_state(&self, state: CellState) -> usize {
        self.cells.values().filter(|c| c.state() == state).count()
    }

    /// The cell containing a world-space point on the x/z plane
    pub fn cell_at_point(&self, x: f64, z: f64) -> Option<&Cell> {
        self.cells.get(&self.metrics.offset_at(x, z))
    }

    /// The cell currently under the pointer
    pub fn hovered(&self) -> Option<OffsetCoord> {
        self.hovered
    }

    /// Home cells in player order
    pub fn homes(&self) -> &[OffsetCoord] {
        &self.homes
    }

    // ==================== Interaction ====================

    /// Feed a stimulus to one cell. Returns whether its state changed.
    pub fn apply(&mut self, coord: OffsetCoord, stimulus: Stimulus) -> Result<bool, GridError> {
        self.ensure_ready()?;
        let cell = self
            .cells
            .get_mut(&coord)
            .ok_or(GridError::UnknownCell(coord))?;
        self.observers
            .notify(&GridEvent::Interaction { coord, stimulus });
        Ok(cell.apply(stimulus, self.rules, &mut self.observers))
    }

    /// Feed a stimulus given by name, e.g. `"mouse-enter"`.
    ///
    /// Unknown names are rejected and the cell keeps its state.
    pub fn apply_named(&mut self, coord: OffsetCoord, name: &str) -> Result<bool, GridError> {
        match name.parse::<Stimulus>() {
            Ok(stimulus) => self.apply(coord, stimulus),
            Err(e) => {
                warn!("Rejected stimulus for {}: {}", coord, e);
                Err(e.into())
            }
        }
    }

    /// Move the pointer to a world-space point.
    ///
    /// Leaving a cell sends it `MouseExit`, entering one sends `MouseEnter`. While
    /// any cell is focused the camera is locked and hover is ignored.
    pub fn hover_at(&mut self, x: f64, z: f64) -> Result<Option<OffsetCoord>, GridError> {
        self.ensure_ready()?;
        if self.count_in_state(CellState::Focused) > 0 {
            debug!("Hover ignored while a cell is focused");
            return Ok(self.hovered);
        }

        let target = self.cell_at_point(x, z).map(|cell| cell.offset());
        if target == self.hovered {
            return Ok(target);
        }
        if let Some(previous) = self.hovered.take() {
            self.apply(previous, Stimulus::MouseExit)?;
        }
        self.hovered = target;
        if let Some(coord) = target {
            self.apply(coord, Stimulus::MouseEnter)?;
        }
        Ok(target)
    }

    /// Force one cell out of the fog
    pub fn discover(&mut self, coord: OffsetCoord) -> Result<bool, GridError> {
        self.ensure_ready()?;
        let cell = self
            .cells
            .get_mut(&coord)
            .ok_or(GridError::UnknownCell(coord))?;
        Ok(cell.discover(&mut self.observers))
    }
}
