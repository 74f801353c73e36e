//! Building cell data off the main timeline.
//!
//! `build_cells` is pure: it only reads the terrain map and never touches observers,
//! artifacts or the live grid, so it can run on a worker thread. `GenerationHandle`
//! runs it on one and hands the finished cells back through a one-shot channel.

use crate::cell::Cell;
use crate::hex::{OffsetCoord, Orientation};
use crate::terrain::TerrainMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a generation produced no cells
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Generation was cancelled")]
    Cancelled,

    #[error("Generation worker stopped without a result")]
    WorkerLost,
}

/// Output of a finished generation
#[derive(Debug, Clone)]
pub struct GeneratedCells {
    pub(crate) cells: HashMap<OffsetCoord, Cell>,
    /// Row-major order, used for materialization batches
    pub(crate) order: Vec<OffsetCoord>,
    /// Cells the terrain map had no classification for
    pub(crate) unclassified: usize,
}

impl GeneratedCells {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn unclassified(&self) -> usize {
        self.unclassified
    }
}

/// Build one hidden cell per coordinate, then link every cell to its neighbors.
///
/// The cancel flag is checked once per row.
pub fn build_cells(
    width: i32,
    height: i32,
    orientation: Orientation,
    terrain: &TerrainMap,
    cancel: &AtomicBool,
) -> Result<GeneratedCells, GenerationError> {
    let capacity = (width.max(0) * height.max(0)) as usize;
    let mut cells = HashMap::with_capacity(capacity);
    let mut order = Vec::with_capacity(capacity);
    let mut unclassified = 0;

    for row in 0..height {
        if cancel.load(Ordering::Relaxed) {
            return Err(GenerationError::Cancelled);
        }
        for col in 0..width {
            let coord = OffsetCoord::new(col, row);
            let cell_terrain = terrain.get(col, row);
            if cell_terrain.is_none() {
                unclassified += 1;
            }
            cells.insert(coord, Cell::new(coord, orientation, cell_terrain));
            order.push(coord);
        }
    }

    if unclassified > 0 {
        warn!("{} cells have no terrain classification", unclassified);
    }

    link_neighbors(&mut cells, orientation);
    debug!("Generated {} cells", order.len());

    Ok(GeneratedCells {
        cells,
        order,
        unclassified,
    })
}

/// Populate each cell's neighbor list with the adjacent coordinates that exist.
/// Adjacency of offset coordinates is symmetric, so the lists are too.
fn link_neighbors(cells: &mut HashMap<OffsetCoord, Cell>, orientation: Orientation) {
    let links: Vec<(OffsetCoord, Vec<OffsetCoord>)> = cells
        .keys()
        .map(|coord| {
            let neighbors = coord
                .neighbors(orientation)
                .into_iter()
                .filter(|n| cells.contains_key(n))
                .collect();
            (*coord, neighbors)
        })
        .collect();

    for (coord, neighbors) in links {
        if let Some(cell) = cells.get_mut(&coord) {
            cell.set_neighbors(neighbors);
        }
    }
}

/// A generation running on a worker thread.
///
/// Dropping the handle cancels the worker; its result is discarded.
pub struct GenerationHandle {
    cancel: Arc<AtomicBool>,
    receiver: mpsc::Receiver<Result<GeneratedCells, GenerationError>>,
}

impl GenerationHandle {
    /// Start building cells on a new thread
    pub fn spawn(width: i32, height: i32, orientation: Orientation, terrain: TerrainMap) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);
        let (sender, receiver) = mpsc::sync_channel(1);

        thread::spawn(move || {
            let result = build_cells(width, height, orientation, &terrain, &worker_cancel);
            // The receiver is gone when the generation was superseded
            let _ = sender.send(result);
        });

        Self { cancel, receiver }
    }

    /// Ask the worker to stop at its next checkpoint
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Shared cancel flag; outlives the handle
    pub(crate) fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// The result, if the worker has finished
    pub fn try_take(&self) -> Option<Result<GeneratedCells, GenerationError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(GenerationError::WorkerLost)),
        }
    }

    /// Block until the worker finishes
    pub fn wait(self) -> Result<GeneratedCells, GenerationError> {
        self.receiver
            .recv()
            .unwrap_or(Err(GenerationError::WorkerLost))
    }
}

impl Drop for GenerationHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
