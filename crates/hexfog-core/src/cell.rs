//! Grid cells and their visibility/selection state machine.
//!
//! Each cell is in exactly one `CellState`. Interaction stimuli move it through the
//! transition table in `CellState::next`; entering and leaving a state notifies the
//! observer passed in by the grid (highlight, selection, camera focus, reveal).

use crate::events::{GridEvent, GridObserver};
use crate::hex::{AxialCoord, CubeCoord, OffsetCoord, Orientation};
use crate::terrain::Terrain;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Visibility and selection state of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    /// Under fog of war, ignores every stimulus
    #[default]
    Hidden,
    /// Discovered
    Visible,
    /// Hovered
    Highlighted,
    Selected,
    /// Selected with the camera locked on it
    Focused,
}

/// Interaction stimuli a cell responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stimulus {
    MouseEnter,
    MouseExit,
    Select,
    Deselect,
    Focus,
}

impl Stimulus {
    pub const ALL: [Stimulus; 5] = [
        Stimulus::MouseEnter,
        Stimulus::MouseExit,
        Stimulus::Select,
        Stimulus::Deselect,
        Stimulus::Focus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stimulus::MouseEnter => "mouse-enter",
            Stimulus::MouseExit => "mouse-exit",
            Stimulus::Select => "select",
            Stimulus::Deselect => "deselect",
            Stimulus::Focus => "focus",
        }
    }
}

impl fmt::Display for Stimulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stimulus name that does not match any `Stimulus`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown stimulus: {0}")]
pub struct UnknownStimulus(pub String);

impl FromStr for Stimulus {
    type Err = UnknownStimulus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Stimulus::ALL
            .into_iter()
            .find(|stimulus| stimulus.name() == normalized)
            .ok_or_else(|| UnknownStimulus(s.to_string()))
    }
}

/// Tunable edges of the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRules {
    /// Whether `Focus` moves a selected cell to `Focused`
    pub focus_from_selected: bool,
}

impl Default for TransitionRules {
    fn default() -> Self {
        Self {
            focus_from_selected: true,
        }
    }
}

impl CellState {
    /// State reached from `self` on `stimulus`. Returns `self` when the stimulus
    /// has no effect.
    pub fn next(self, stimulus: Stimulus, rules: TransitionRules) -> CellState {
        use CellState::*;
        use Stimulus::*;

        match (self, stimulus) {
            (Hidden, _) => Hidden,
            (Visible, MouseEnter) => Highlighted,
            (Highlighted, MouseExit) => Visible,
            (Highlighted, Select) => Selected,
            (Selected, Deselect) => Visible,
            (Selected, Focus) if rules.focus_from_selected => Focused,
            (Focused, Deselect) => Selected,
            (state, _) => state,
        }
    }

    /// Whether the cell has been discovered
    pub fn is_discovered(&self) -> bool {
        *self != CellState::Hidden
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellState::Hidden => "hidden",
            CellState::Visible => "visible",
            CellState::Highlighted => "highlighted",
            CellState::Selected => "selected",
            CellState::Focused => "focused",
        };
        f.write_str(name)
    }
}

/// A single grid location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    offset: OffsetCoord,
    axial: AxialCoord,
    terrain: Option<Terrain>,
    /// Coordinates of adjacent cells; the grid owns the cells themselves
    neighbors: Vec<OffsetCoord>,
    state: CellState,
    materialized: bool,
    revealed: bool,
}

impl Cell {
    /// Create a hidden cell with no neighbors yet
    pub fn new(offset: OffsetCoord, orientation: Orientation, terrain: Option<Terrain>) -> Self {
        Self {
            offset,
            axial: offset.to_axial(orientation),
            terrain,
            neighbors: Vec::new(),
            state: CellState::Hidden,
            materialized: false,
            revealed: false,
        }
    }

    pub fn offset(&self) -> OffsetCoord {
        self.offset
    }

    pub fn axial(&self) -> AxialCoord {
        self.axial
    }

    pub fn cube(&self) -> CubeCoord {
        self.axial.to_cube()
    }

    pub fn terrain(&self) -> Option<Terrain> {
        self.terrain
    }

    /// Land predicate. Unclassified cells are not land.
    pub fn is_land(&self) -> bool {
        self.terrain.is_some_and(|t| t.is_land())
    }

    pub fn neighbors(&self) -> &[OffsetCoord] {
        &self.neighbors
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Hex distance to another cell
    pub fn distance_to(&self, other: &Cell) -> u32 {
        self.axial.distance_to(&other.axial)
    }

    pub(crate) fn set_neighbors(&mut self, neighbors: Vec<OffsetCoord>) {
        self.neighbors = neighbors;
    }

    /// Feed a stimulus through the transition table. Returns whether the state changed.
    pub fn apply(
        &mut self,
        stimulus: Stimulus,
        rules: TransitionRules,
        observer: &mut dyn GridObserver,
    ) -> bool {
        let next = self.state.next(stimulus, rules);
        self.change_state(next, observer)
    }

    /// Force the cell to `Visible` regardless of its current state
    pub fn discover(&mut self, observer: &mut dyn GridObserver) -> bool {
        self.change_state(CellState::Visible, observer)
    }

    /// Record that the cell's artifact exists. A cell already out of the fog is
    /// revealed straight away.
    pub(crate) fn mark_materialized(&mut self, observer: &mut dyn GridObserver) {
        self.materialized = true;
        if self.state.is_discovered() {
            self.reveal(observer);
        }
    }

    fn change_state(&mut self, next: CellState, observer: &mut dyn GridObserver) -> bool {
        if next == self.state {
            return false;
        }

        let previous = self.state;
        self.exit(previous, observer);
        self.state = next;
        observer.notify(&GridEvent::StateChanged {
            coord: self.offset,
            from: previous,
            to: next,
        });
        self.enter(next, observer);
        true
    }

    fn enter(&mut self, state: CellState, observer: &mut dyn GridObserver) {
        let coord = self.offset;
        match state {
            CellState::Hidden => {}
            CellState::Visible => self.reveal(observer),
            CellState::Highlighted => observer.notify(&GridEvent::Highlight { coord, on: true }),
            CellState::Selected => observer.notify(&GridEvent::Selection {
                coord,
                selected: true,
            }),
            CellState::Focused => observer.notify(&GridEvent::FocusLock {
                coord,
                locked: true,
            }),
        }
    }

    fn exit(&mut self, state: CellState, observer: &mut dyn GridObserver) {
        let coord = self.offset;
        match state {
            CellState::Hidden | CellState::Visible => {}
            CellState::Highlighted => observer.notify(&GridEvent::Highlight { coord, on: false }),
            CellState::Selected => observer.notify(&GridEvent::Selection {
                coord,
                selected: false,
            }),
            CellState::Focused => observer.notify(&GridEvent::FocusLock {
                coord,
                locked: false,
            }),
        }
    }

    fn reveal(&mut self, observer: &mut dyn GridObserver) {
        if self.materialized && !self.revealed {
            self.revealed = true;
            observer.notify(&GridEvent::Revealed { coord: self.offset });
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
    }
}

impl Eq for Cell {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use pretty_assertions::assert_eq;

    fn visible_cell(log: &mut EventLog) -> Cell {
        let mut cell = Cell::new(
            OffsetCoord::new(2, 3),
            Orientation::FlatTop,
            Some(Terrain::Plains),
        );
        cell.discover(log);
        log.take();
        cell
    }

    #[test]
    fn test_transition_table() {
        use CellState::*;
        use Stimulus::*;
        let rules = TransitionRules::default();

        let expected = [
            (Hidden, [Hidden, Hidden, Hidden, Hidden, Hidden]),
            (Visible, [Highlighted, Visible, Visible, Visible, Visible]),
            (
                Highlighted,
                [Highlighted, Visible, Selected, Highlighted, Highlighted],
            ),
            (Selected, [Selected, Selected, Selected, Visible, Focused]),
            (Focused, [Focused, Focused, Focused, Selected, Focused]),
        ];
        for (state, row) in expected {
            for (stimulus, next) in [MouseEnter, MouseExit, Select, Deselect, Focus]
                .into_iter()
                .zip(row)
            {
                assert_eq!(state.next(stimulus, rules), next, "{state} on {stimulus}");
            }
        }
    }

    #[test]
    fn test_focus_rule_disabled() {
        let rules = TransitionRules {
            focus_from_selected: false,
        };
        assert_eq!(
            CellState::Selected.next(Stimulus::Focus, rules),
            CellState::Selected
        );
    }

    #[test]
    fn test_same_state_is_noop() {
        let mut log = EventLog::new();
        let mut cell = visible_cell(&mut log);

        assert!(!cell.apply(Stimulus::Select, TransitionRules::default(), &mut log));
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_hover_select_focus_events() {
        let mut log = EventLog::new();
        let mut cell = visible_cell(&mut log);
        let coord = cell.offset();
        let rules = TransitionRules::default();

        cell.apply(Stimulus::MouseEnter, rules, &mut log);
        cell.apply(Stimulus::Select, rules, &mut log);
        cell.apply(Stimulus::Focus, rules, &mut log);
        assert_eq!(cell.state(), CellState::Focused);

        assert_eq!(
            log.take(),
            vec![
                GridEvent::StateChanged {
                    coord,
                    from: CellState::Visible,
                    to: CellState::Highlighted
                },
                GridEvent::Highlight { coord, on: true },
                GridEvent::Highlight { coord, on: false },
                GridEvent::StateChanged {
                    coord,
                    from: CellState::Highlighted,
                    to: CellState::Selected
                },
                GridEvent::Selection {
                    coord,
                    selected: true
                },
                GridEvent::Selection {
                    coord,
                    selected: false
                },
                GridEvent::StateChanged {
                    coord,
                    from: CellState::Selected,
                    to: CellState::Focused
                },
                GridEvent::FocusLock { coord, locked: true },
            ]
        );
    }

    #[test]
    fn test_hidden_ignores_stimuli() {
        let mut log = EventLog::new();
        let mut cell = Cell::new(OffsetCoord::new(0, 0), Orientation::PointyTop, None);
        for stimulus in Stimulus::ALL {
            assert!(!cell.apply(stimulus, TransitionRules::default(), &mut log));
        }
        assert_eq!(cell.state(), CellState::Hidden);
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_discover_forces_visible() {
        let mut log = EventLog::new();
        let mut cell = visible_cell(&mut log);
        let rules = TransitionRules::default();
        cell.apply(Stimulus::MouseEnter, rules, &mut log);
        cell.apply(Stimulus::Select, rules, &mut log);

        assert!(cell.discover(&mut log));
        assert_eq!(cell.state(), CellState::Visible);
        assert!(!cell.discover(&mut log));
    }

    #[test]
    fn test_reveal_waits_for_materialization() {
        let mut log = EventLog::new();
        let mut cell = Cell::new(
            OffsetCoord::new(1, 1),
            Orientation::FlatTop,
            Some(Terrain::Forest),
        );
        cell.discover(&mut log);
        assert!(!cell.is_revealed());

        cell.mark_materialized(&mut log);
        assert!(cell.is_revealed());
        let reveals = log
            .events()
            .into_iter()
            .filter(|e| matches!(e, GridEvent::Revealed { .. }))
            .count();
        assert_eq!(reveals, 1);
    }

    #[test]
    fn test_hidden_cell_not_revealed_by_materialization() {
        let mut log = EventLog::new();
        let mut cell = Cell::new(
            OffsetCoord::new(1, 1),
            Orientation::FlatTop,
            Some(Terrain::Forest),
        );
        cell.mark_materialized(&mut log);
        assert!(!cell.is_revealed());

        cell.discover(&mut log);
        assert!(cell.is_revealed());
    }

    #[test]
    fn test_parse_stimulus() {
        assert_eq!("mouse-enter".parse::<Stimulus>(), Ok(Stimulus::MouseEnter));
        assert_eq!(" Mouse_Exit ".parse::<Stimulus>(), Ok(Stimulus::MouseExit));
        assert_eq!("FOCUS".parse::<Stimulus>(), Ok(Stimulus::Focus));
        assert_eq!(
            "double-click".parse::<Stimulus>(),
            Err(UnknownStimulus("double-click".to_string()))
        );
    }

    #[test]
    fn test_unclassified_cell_is_not_land() {
        let cell = Cell::new(OffsetCoord::new(0, 0), Orientation::FlatTop, None);
        assert!(!cell.is_land());
        let water = Cell::new(
            OffsetCoord::new(0, 0),
            Orientation::FlatTop,
            Some(Terrain::Coast),
        );
        assert!(!water.is_land());
    }
}
