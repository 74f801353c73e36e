//! Hexfog - a hex-grid strategy simulation core
//!
//! This crate provides everything a strategy game needs from its map, independent of
//! any rendering engine:
//! - Offset, axial and cube hex coordinates with world-space layout
//! - A per-cell visibility and selection state machine
//! - A grid with background generation and batched materialization
//! - Fog-of-war discovery by breadth-first search
//! - Player spawn placement and starting areas
//! - Best-first pathfinding
//!
//! # Architecture
//!
//! The grid owns every cell and is the only entry point for gameplay operations.
//! Rendering, camera and input live outside the crate: they receive `GridEvent`s
//! through registered `GridObserver`s and create cell artifacts through an
//! `ArtifactFactory`.
//!
//! # Modules
//!
//! - [`hex`]: Coordinate systems and geometry
//! - [`cell`]: Cells and their state machine
//! - [`grid`]: The grid, generation and materialization entry points
//! - [`discovery`]: Fog-of-war reveal
//! - [`spawn`]: Home placement and player initialization
//! - [`pathfinder`]: Path search

pub mod cell;
pub mod config;
pub mod discovery;
pub mod events;
pub mod generation;
pub mod grid;
pub mod hex;
pub mod materialize;
pub mod pathfinder;
pub mod spawn;
pub mod terrain;

// Re-export commonly used types
pub use cell::{Cell, CellState, Stimulus, TransitionRules, UnknownStimulus};
pub use config::GridConfig;
pub use events::{EventLog, GridEvent, GridObserver};
pub use generation::GenerationError;
pub use grid::{Grid, GridError, GridStatus};
pub use hex::{AxialCoord, CubeCoord, HexMetrics, OffsetCoord, Orientation, WorldPoint};
pub use materialize::{ArtifactFactory, HeadlessFactory, MaterializeError, MaterializeStep};
pub use pathfinder::{Path, PathOptions, Pathfinder, NON_LAND_COST};
pub use spawn::{PlayerStart, SpawnRegion, MAX_DISPATCH_ATTEMPTS, MAX_SPAWN_ATTEMPTS};
pub use terrain::{Biome, BiomeTable, Terrain, TerrainMap};
