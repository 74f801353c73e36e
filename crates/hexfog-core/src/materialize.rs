//! Batched materialization of generated cells.
//!
//! Turning a cell into something a player can see or click is the job of an
//! `ArtifactFactory` owned by the host. The grid hands the factory one fixed-size
//! batch per call and reports progress after each batch, so the host decides when
//! to yield between them.

use crate::cell::Cell;
use crate::events::{GridEvent, GridObserver};
use crate::hex::{HexMetrics, OffsetCoord, WorldPoint};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a single cell could not be materialized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaterializeError {
    #[error("Cell {0} has no terrain")]
    MissingTerrain(OffsetCoord),

    #[error("Missing asset: {0}")]
    MissingAsset(String),
}

/// Creates the visible artifact for a cell
pub trait ArtifactFactory {
    fn create(&mut self, cell: &Cell, center: WorldPoint) -> Result<(), MaterializeError>;
}

/// Factory for headless runs: accepts every cell and only counts them.
#[derive(Debug, Clone, Default)]
pub struct HeadlessFactory {
    created: usize,
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.created
    }
}

impl ArtifactFactory for HeadlessFactory {
    fn create(&mut self, _cell: &Cell, _center: WorldPoint) -> Result<(), MaterializeError> {
        self.created += 1;
        Ok(())
    }
}

/// Outcome of one materialization call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaterializeStep {
    /// A batch finished and more remain
    Batch { index: usize, progress: f32 },
    /// Every cell has been through materialization
    Complete { materialized: usize, failed: usize },
}

/// Position of a materialization run, kept between calls
#[derive(Debug, Clone, Default)]
pub(crate) struct MaterializeCursor {
    next: usize,
    batches_done: usize,
    materialized: usize,
    failed: usize,
    complete: bool,
}

impl MaterializeCursor {
    pub(crate) fn is_complete(&self) -> bool {
        self.complete
    }

    pub(crate) fn failed(&self) -> usize {
        self.failed
    }

    /// Materialize the next `batch_size` cells of `order`.
    ///
    /// A failed cell is logged and counted; the rest of the batch continues.
    pub(crate) fn step(
        &mut self,
        cells: &mut HashMap<OffsetCoord, Cell>,
        order: &[OffsetCoord],
        batch_size: usize,
        metrics: &HexMetrics,
        factory: &mut dyn ArtifactFactory,
        observer: &mut dyn GridObserver,
    ) -> MaterializeStep {
        if self.complete {
            return self.completion();
        }

        let batch_size = batch_size.max(1);
        let end = (self.next + batch_size).min(order.len());
        for coord in &order[self.next..end] {
            let Some(cell) = cells.get_mut(coord) else {
                continue;
            };
            match materialize_cell(cell, metrics, factory) {
                Ok(()) => {
                    cell.mark_materialized(observer);
                    self.materialized += 1;
                }
                Err(e) => {
                    warn!("Failed to materialize {}: {}", coord, e);
                    self.failed += 1;
                }
            }
        }
        self.next = end;

        let index = self.batches_done;
        self.batches_done += 1;
        let total_batches = order.len().div_ceil(batch_size).max(1);
        let progress = (self.batches_done as f32 / total_batches as f32).min(1.0);
        debug!("Materialized batch {} ({:.0}%)", index, progress * 100.0);
        observer.notify(&GridEvent::BatchMaterialized {
            batch: index,
            progress,
        });

        if self.next < order.len() {
            return MaterializeStep::Batch { index, progress };
        }

        self.complete = true;
        info!(
            "Materialization complete: {} cells, {} failed",
            self.materialized, self.failed
        );
        observer.notify(&GridEvent::MaterializationComplete {
            materialized: self.materialized,
            failed: self.failed,
        });
        self.completion()
    }

    fn completion(&self) -> MaterializeStep {
        MaterializeStep::Complete {
            materialized: self.materialized,
            failed: self.failed,
        }
    }
}

fn materialize_cell(
    cell: &Cell,
    metrics: &HexMetrics,
    factory: &mut dyn ArtifactFactory,
) -> Result<(), MaterializeError> {
    if cell.terrain().is_none() {
        return Err(MaterializeError::MissingTerrain(cell.offset()));
    }
    factory.create(cell, metrics.center(cell.offset()))
}
