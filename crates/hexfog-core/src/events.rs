//! Notifications raised by the grid.
//!
//! Collaborators outside the core (camera, highlight rendering, progress bars)
//! implement `GridObserver` and register with `Grid::subscribe`. The core never
//! depends on what an observer does with an event.

use crate::cell::{CellState, Stimulus};
use crate::hex::OffsetCoord;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Events emitted by the grid and its cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum GridEvent {
    // ==================== Lifecycle ====================
    /// Cell data has been built and handed to the grid
    GenerationComplete { cells: usize },
    /// One materialization batch finished
    BatchMaterialized { batch: usize, progress: f32 },
    /// Every cell has been through materialization
    MaterializationComplete { materialized: usize, failed: usize },
    /// All cells and artifacts were released
    Cleared { cells: usize },

    // ==================== Cell ====================
    /// A stimulus reached a cell
    Interaction {
        coord: OffsetCoord,
        stimulus: Stimulus,
    },
    /// A cell moved between states
    StateChanged {
        coord: OffsetCoord,
        from: CellState,
        to: CellState,
    },
    /// A cell's artifact should be shown
    Revealed { coord: OffsetCoord },
    /// Hover highlight on or off
    Highlight { coord: OffsetCoord, on: bool },
    /// Selection on or off; the camera follows the selected cell
    Selection { coord: OffsetCoord, selected: bool },
    /// Camera focus locked on or released from a cell
    FocusLock { coord: OffsetCoord, locked: bool },

    // ==================== Players ====================
    /// A player's home cell was chosen
    HomeAssigned { player: usize, coord: OffsetCoord },
}

/// Receiver of grid events
pub trait GridObserver {
    fn notify(&mut self, event: &GridEvent);
}

impl<F> GridObserver for F
where
    F: FnMut(&GridEvent),
{
    fn notify(&mut self, event: &GridEvent) {
        self(event)
    }
}

/// Observer that records every event. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<GridEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<GridEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Remove and return everything recorded so far
    pub fn take(&self) -> Vec<GridEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl GridObserver for EventLog {
    fn notify(&mut self, event: &GridEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Fan-out to every registered observer
#[derive(Default)]
pub(crate) struct Observers {
    observers: Vec<Box<dyn GridObserver + Send>>,
}

impl Observers {
    pub(crate) fn push(&mut self, observer: Box<dyn GridObserver + Send>) {
        self.observers.push(observer);
    }
}

impl GridObserver for Observers {
    fn notify(&mut self, event: &GridEvent) {
        for observer in &mut self.observers {
            observer.notify(event);
        }
    }
}
