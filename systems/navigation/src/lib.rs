#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Flood-fill navigation strategy for the micromouse engine.
//!
//! Each planning step merges the latest sensor reading into the owned
//! [`KnowledgeGrid`], rebuilds the flood-fill distance field from the active
//! target set, and converts the field into one bounded rotate+move action.
//! Decisions are fully deterministic: ties between equally distant neighbors
//! resolve straight ahead first, then left, then right, and the flood frontier
//! itself expands in a fixed direction order.

use micromouse_core::{
    Action, CellCoord, Direction, Navigator, Rotation, RunPhase, SensorReading, StepError,
    MAX_MOVEMENT,
};
use micromouse_world::{center_goal, map_sensors, FloodField, KnowledgeGrid, SensorInfo, UNREACHED};

/// Candidate score for directions that are walled, out of bounds, or lead to
/// a cell the flood field could not reach.
const WORST_CANDIDATE: u16 = u16::MAX;

/// Whether a run sequence includes a mapped return leg to the start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnLeg {
    /// Single pass: the first run ends the moment the goal is reached.
    None,
    /// Double waterfall: after reaching the goal the robot walks back to the
    /// start, mapping as it goes, before the run ends.
    BackToStart,
}

/// Tracks the run lifecycle and selects the active flood-fill target set.
///
/// Exactly one target set is active at a time: the goal region while
/// outbound (exploration and speed runs) and the start cell during the
/// return leg.
#[derive(Clone, Debug)]
pub struct RunController {
    start: CellCoord,
    goal: Vec<CellCoord>,
    phase: RunPhase,
    return_leg: ReturnLeg,
}

impl RunController {
    /// Creates a controller for the provided start cell and goal region.
    #[must_use]
    pub fn new(start: CellCoord, goal: Vec<CellCoord>, return_leg: ReturnLeg) -> Self {
        Self {
            start,
            goal,
            phase: RunPhase::Exploring,
            return_leg,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Cell the robot is returned to when a run ends.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Ordered target set the flood field currently propagates from.
    #[must_use]
    pub fn active_targets(&self) -> &[CellCoord] {
        match self.phase {
            RunPhase::Returning => std::slice::from_ref(&self.start),
            _ => &self.goal,
        }
    }

    /// Reports whether the cell belongs to the active target set.
    #[must_use]
    pub fn is_active_target(&self, cell: CellCoord) -> bool {
        self.active_targets().contains(&cell)
    }

    /// Advances the lifecycle after the active target set was reached.
    ///
    /// Returns `true` when the boundary ends the current run, in which case
    /// the caller emits [`Action::Reset`] and reinitializes the pose. The
    /// exploration-to-return transition keeps the robot in place: it simply
    /// swaps the target set and lets the same run continue toward the start.
    pub fn on_target_reached(&mut self) -> bool {
        match self.phase {
            RunPhase::Exploring => match self.return_leg {
                ReturnLeg::BackToStart => {
                    self.phase = RunPhase::Returning;
                    false
                }
                ReturnLeg::None => {
                    self.phase = RunPhase::SpeedRun;
                    true
                }
            },
            RunPhase::Returning => {
                self.phase = RunPhase::SpeedRun;
                true
            }
            RunPhase::SpeedRun => {
                self.phase = RunPhase::Finished;
                true
            }
            RunPhase::Finished => true,
        }
    }
}

/// Navigation strategy driven by flood-fill distances over the known maze.
#[derive(Clone, Debug)]
pub struct FloodFillNavigator {
    grid: KnowledgeGrid,
    field: FloodField,
    controller: RunController,
    location: CellCoord,
    heading: Direction,
}

impl FloodFillNavigator {
    /// Creates a navigator targeting the canonical center goal region.
    #[must_use]
    pub fn new(maze_dim: u32, return_leg: ReturnLeg) -> Self {
        Self::with_targets(
            maze_dim,
            CellCoord::new(0, 0),
            center_goal(maze_dim),
            return_leg,
        )
    }

    /// Creates a navigator with an explicit start cell and goal region.
    #[must_use]
    pub fn with_targets(
        maze_dim: u32,
        start: CellCoord,
        goal: Vec<CellCoord>,
        return_leg: ReturnLeg,
    ) -> Self {
        Self {
            grid: KnowledgeGrid::new(maze_dim),
            field: FloodField::default(),
            controller: RunController::new(start, goal, return_leg),
            location: start,
            heading: Direction::North,
        }
    }

    /// Read-only access to the accumulated maze knowledge.
    #[must_use]
    pub fn grid(&self) -> &KnowledgeGrid {
        &self.grid
    }

    /// Read-only access to the most recent flood-fill distances.
    #[must_use]
    pub fn field(&self) -> &FloodField {
        &self.field
    }

    /// Candidate score for moving from `cell` toward `direction`.
    ///
    /// Open, in-bounds, flood-reached neighbors score their flood distance;
    /// during exploration the neighbor's visit count is added as a penalty so
    /// unvisited cells win ties. Everything else scores [`WORST_CANDIDATE`].
    fn candidate_value(&self, cell: CellCoord, direction: Direction, exploring: bool) -> u16 {
        if !self.grid.is_open(cell, direction) {
            return WORST_CANDIDATE;
        }

        let Some(neighbor) = self.grid.neighbor(cell, direction) else {
            return WORST_CANDIDATE;
        };
        let Some(distance) = self.field.distance(neighbor) else {
            return WORST_CANDIDATE;
        };
        if distance == UNREACHED {
            return WORST_CANDIDATE;
        }

        if exploring {
            let visits = self.grid.visits(neighbor).unwrap_or(u8::MAX);
            distance.saturating_add(u16::from(visits))
        } else {
            distance
        }
    }

    /// Minimum-candidate direction from `cell` under the given heading.
    ///
    /// Candidates are visited in the tie-break order straight, left, right,
    /// rear, and only a strictly better score displaces an earlier one, so
    /// equal scores resolve toward not turning.
    fn best_direction(
        &self,
        cell: CellCoord,
        heading: Direction,
        exploring: bool,
    ) -> Option<Direction> {
        let mut best: Option<(u16, Direction)> = None;

        for direction in [heading, heading.left(), heading.right(), heading.opposite()] {
            let candidate = self.candidate_value(cell, direction, exploring);
            if candidate == WORST_CANDIDATE {
                continue;
            }

            best = match best {
                Some((value, _)) if candidate >= value => best,
                _ => Some((candidate, direction)),
            };
        }

        best.map(|(_, direction)| direction)
    }

    /// Converts the freshly rebuilt flood field into one bounded action.
    fn plan_action(&self, reading: &SensorReading) -> Action {
        let exploring = self.controller.phase() == RunPhase::Exploring;

        let Some(chosen) = self.best_direction(self.location, self.heading, exploring) else {
            // Stuck cell: no open direction the field can score. Turn in
            // place so the next observation differs.
            return Action::Advance {
                rotation: Rotation::Right,
                movement: 0,
            };
        };

        if chosen == self.heading.opposite() {
            // 180 degrees takes two successive quarter turns; emit the first
            // without moving.
            return Action::Advance {
                rotation: Rotation::Right,
                movement: 0,
            };
        }

        let rotation = if chosen == self.heading {
            Rotation::Straight
        } else if chosen == self.heading.left() {
            Rotation::Left
        } else {
            Rotation::Right
        };

        // Movement may not outrun what the sensors actually confirmed open
        // this turn: the lookahead below only trusts the flood field for
        // direction choices, never for wall-free travel.
        let sensed_clearance = match map_sensors(self.heading, reading)
            [usize::from(chosen.index())]
        {
            SensorInfo::Open { clear_cells } => clear_cells,
            _ => 0,
        };
        let cap = u32::from(MAX_MOVEMENT).min(sensed_clearance);

        let mut movement: u8 = 1;
        let mut probe = self.grid.neighbor(self.location, chosen);
        while u32::from(movement) < cap {
            let Some(cell) = probe else {
                break;
            };
            if self.best_direction(cell, chosen, exploring) != Some(chosen) {
                break;
            }
            movement += 1;
            probe = self.grid.neighbor(cell, chosen);
        }

        Action::Advance { rotation, movement }
    }

    /// Applies an emitted action to the navigator's own pose, counting
    /// visits for cells passed through mid-move. The destination cell is
    /// counted when the next planning step begins there.
    fn apply(&mut self, action: Action) -> Result<(), StepError> {
        let Action::Advance { rotation, movement } = action else {
            return Ok(());
        };

        self.heading = rotation.applied_to(self.heading);
        for remaining in (0..movement).rev() {
            let next = self
                .grid
                .neighbor(self.location, self.heading)
                .ok_or(StepError::OutOfBounds {
                    x: self.location.x(),
                    y: self.location.y(),
                    dim: self.grid.dim(),
                })?;
            self.location = next;
            if remaining > 0 {
                self.grid.record_visit(next)?;
            }
        }

        Ok(())
    }

    fn reset_pose(&mut self) {
        self.location = self.controller.start();
        self.heading = Direction::North;
    }
}

impl Navigator for FloodFillNavigator {
    fn next_action(&mut self, reading: &SensorReading) -> Result<Action, StepError> {
        if self.controller.phase() == RunPhase::Finished {
            return Ok(Action::Reset);
        }

        self.grid.observe(self.location, self.heading, reading)?;
        self.grid.record_visit(self.location)?;

        if self.controller.is_active_target(self.location) {
            if self.controller.on_target_reached() {
                self.reset_pose();
                return Ok(Action::Reset);
            }
            // The target set swapped mid-run; planning continues below
            // against the new targets.
        }

        self.field
            .rebuild(&self.grid, self.controller.active_targets());

        let action = self.plan_action(reading);
        self.apply(action)?;
        Ok(action)
    }

    fn location(&self) -> CellCoord {
        self.location
    }

    fn heading(&self) -> Direction {
        self.heading
    }

    fn phase(&self) -> RunPhase {
        self.controller.phase()
    }

    fn maze_dim(&self) -> u32 {
        self.grid.dim()
    }

    fn name(&self) -> &'static str {
        "flood fill"
    }
}
