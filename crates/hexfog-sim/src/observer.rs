//! Logs grid events.

use hexfog_core::{GridEvent, GridObserver};
use tracing::{debug, info};

/// Observer that writes every grid event to the tracing subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl GridObserver for TracingObserver {
    fn notify(&mut self, event: &GridEvent) {
        match event {
            GridEvent::GenerationComplete { cells } => info!("Generated {} cells", cells),
            GridEvent::BatchMaterialized { batch, progress } => {
                debug!("Batch {} done, {:.0}%", batch, progress * 100.0)
            }
            GridEvent::MaterializationComplete {
                materialized,
                failed,
            } => info!("Materialized {} cells, {} failed", materialized, failed),
            GridEvent::Cleared { cells } => info!("Cleared {} cells", cells),
            GridEvent::HomeAssigned { player, coord } => {
                info!("Player {} home at {}", player, coord)
            }
            GridEvent::Interaction { coord, stimulus } => debug!("{} <- {}", coord, stimulus),
            GridEvent::StateChanged { coord, from, to } => {
                debug!("{}: {} -> {}", coord, from, to)
            }
            GridEvent::Revealed { coord } => debug!("Revealed {}", coord),
            GridEvent::Highlight { coord, on } => debug!("Highlight {} {}", coord, on),
            GridEvent::Selection { coord, selected } => {
                debug!("Selection {} {}", coord, selected)
            }
            GridEvent::FocusLock { coord, locked } => info!("Camera lock {} {}", coord, locked),
        }
    }
}
