//! Runs a scripted simulation against a grid.

use crate::config::{PathQuery, SimConfig};
use crate::observer::TracingObserver;
use hexfog_core::{
    CellState, Grid, HeadlessFactory, MaterializeStep, OffsetCoord, Path, Pathfinder,
    PlayerStart,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{info, warn};

/// How often the background generation is polled
const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Outcome of one path query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathReport {
    pub from: OffsetCoord,
    pub to: OffsetCoord,
    pub path: Option<Path>,
    pub error: Option<String>,
}

/// Final state of a cell the script touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellReport {
    pub coord: OffsetCoord,
    pub state: CellState,
}

/// Summary printed at the end of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimReport {
    pub cells: usize,
    pub land_cells: usize,
    pub visible_cells: usize,
    pub materialized: usize,
    pub materialize_failures: usize,
    pub players: Vec<PlayerStart>,
    pub rejected_interactions: usize,
    pub touched: Vec<CellReport>,
    pub paths: Vec<PathReport>,
}

/// Run a whole simulation: generate, materialize, reveal, spawn, interact, search.
pub async fn run(config: SimConfig) -> anyhow::Result<SimReport> {
    let mut rng = match config.grid.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut grid = Grid::new(config.grid.clone());
    grid.subscribe(TracingObserver);

    let (width, height) = (grid.config().width, grid.config().height);
    let terrain = config
        .terrain
        .build(width as usize, height as usize, &mut rng);
    grid.generate_in_background(terrain);
    while !grid.poll_generation()? {
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    let mut factory = HeadlessFactory::new();
    let (materialized, materialize_failures) = loop {
        match grid.materialize_next_batch(&mut factory)? {
            MaterializeStep::Batch { .. } => tokio::task::yield_now().await,
            MaterializeStep::Complete {
                materialized,
                failed,
            } => break (materialized, failed),
        }
    };

    grid.discover_defaults()?;
    let players = grid.init_players(config.units_per_player)?;

    let mut touched = BTreeSet::new();
    let mut rejected_interactions = 0;
    for interaction in &config.interactions {
        touched.insert(interaction.coord);
        if let Err(e) = grid.apply_named(interaction.coord, &interaction.stimulus) {
            warn!(
                "Interaction {} on {} rejected: {}",
                interaction.stimulus, interaction.coord, e
            );
            rejected_interactions += 1;
        }
    }

    let queries = if config.path_queries.is_empty() {
        default_queries(grid.homes())
    } else {
        config.path_queries.clone()
    };
    let pathfinder = Pathfinder::with_options(&grid, config.path_options);
    let paths: Vec<PathReport> = queries
        .iter()
        .map(|query| match pathfinder.find_path(query.from, query.to) {
            Ok(path) => PathReport {
                from: query.from,
                to: query.to,
                path: Some(path),
                error: None,
            },
            Err(e) => {
                warn!("Path {} -> {} failed: {}", query.from, query.to, e);
                PathReport {
                    from: query.from,
                    to: query.to,
                    path: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    let report = SimReport {
        cells: grid.len(),
        land_cells: grid.land_cells().count(),
        visible_cells: grid.cells().filter(|c| c.state().is_discovered()).count(),
        materialized,
        materialize_failures,
        players,
        rejected_interactions,
        touched: touched
            .into_iter()
            .filter_map(|coord| {
                grid.cell(coord).map(|cell| CellReport {
                    coord,
                    state: cell.state(),
                })
            })
            .collect(),
        paths,
    };
    info!(
        "Simulation finished: {} cells, {} visible, {} players",
        report.cells,
        report.visible_cells,
        report.players.len()
    );
    Ok(report)
}

/// From the first home to the second, when there are two
fn default_queries(homes: &[OffsetCoord]) -> Vec<PathQuery> {
    match homes {
        [first, second, ..] => vec![PathQuery {
            from: *first,
            to: *second,
        }],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScriptedInteraction, TerrainSource};
    use hexfog_core::{GridConfig, PathOptions};

    fn script(width: i32, height: i32, seed: u64) -> SimConfig {
        SimConfig {
            grid: GridConfig {
                width,
                height,
                batch_size: 50,
                seed: Some(seed),
                ..GridConfig::default()
            },
            ..SimConfig::default()
        }
    }

    #[tokio::test]
    async fn test_default_run() {
        let report = run(script(20, 16, 1)).await.unwrap();

        assert_eq!(report.cells, 320);
        assert_eq!(report.land_cells, 320);
        assert_eq!(report.materialized, 320);
        assert_eq!(report.materialize_failures, 0);
        assert_eq!(report.players.len(), 2);
        assert_eq!(report.paths.len(), 1);

        let path = report.paths[0].path.as_ref().unwrap();
        assert_eq!(path.cells.first(), Some(&report.players[0].home));
        assert_eq!(path.cells.last(), Some(&report.players[1].home));
        assert!(report.visible_cells >= 3);
    }

    #[tokio::test]
    async fn test_default_config_runs_for_any_seed() {
        for seed in 0..40 {
            let mut config = SimConfig::default();
            config.grid.seed = Some(seed);
            let report = run(config)
                .await
                .unwrap_or_else(|e| panic!("seed {seed}: {e}"));
            assert_eq!(report.players.len(), 2);
            assert!(report.paths[0].path.is_some(), "seed {seed}");
        }
    }

    #[tokio::test]
    async fn test_scripted_interactions() {
        let mut config = script(12, 12, 5);
        let seen = OffsetCoord::new(0, 0);
        let fogged = OffsetCoord::new(11, 0);
        let step = |coord, stimulus: &str| ScriptedInteraction {
            coord,
            stimulus: stimulus.to_string(),
        };
        config.interactions = vec![
            step(seen, "mouse-enter"),
            step(seen, "select"),
            step(seen, "blink"),
            step(fogged, "mouse-enter"),
            step(OffsetCoord::new(99, 99), "select"),
        ];

        let report = run(config).await.unwrap();

        assert_eq!(report.rejected_interactions, 2);
        assert!(report.touched.contains(&CellReport {
            coord: seen,
            state: CellState::Selected
        }));
        assert!(report.touched.contains(&CellReport {
            coord: fogged,
            state: CellState::Hidden
        }));
        assert_eq!(report.touched.len(), 2);
    }

    #[tokio::test]
    async fn test_explicit_queries_and_ceiling() {
        let mut config = script(10, 10, 3);
        config.terrain = TerrainSource::Heights {
            // ocean everywhere except the first row
            values: (0..100)
                .map(|i| if i < 10 { 0.5 } else { 0.1 })
                .collect(),
        };
        config.grid.player_count = 1;
        config.grid.player_min_distance = 9;
        config.path_queries = vec![PathQuery {
            from: OffsetCoord::new(0, 0),
            to: OffsetCoord::new(9, 9),
        }];
        config.path_options = PathOptions {
            max_cost: Some(50),
            ..PathOptions::default()
        };

        let report = run(config).await.unwrap();

        assert_eq!(report.land_cells, 10);
        assert_eq!(report.paths.len(), 1);
        assert!(report.paths[0].path.is_none());
        assert!(report.paths[0].error.is_some());
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let report = run(script(8, 8, 9)).await.unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["cells"], 64);
        assert!(json["players"].is_array());
    }

    #[test]
    fn test_default_queries() {
        let homes = [OffsetCoord::new(1, 1), OffsetCoord::new(5, 5)];
        assert_eq!(
            default_queries(&homes),
            vec![PathQuery {
                from: homes[0],
                to: homes[1]
            }]
        );
        assert!(default_queries(&homes[..1]).is_empty());
    }
}
