#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Left-wall-hugging navigation strategy.
//!
//! The deliberately simple contrast to the flood-fill engine: no distance
//! field, just per-direction neighbor visit counts. The robot hugs the left
//! wall unless a less frequently visited alternative exists, which still
//! benefits from the shared knowledge grid's dead-end penalties. It shares
//! the [`Navigator`] interface so the harness can swap strategies at
//! construction time.

use micromouse_core::{
    Action, CellCoord, Direction, Navigator, Rotation, RunPhase, SensorReading, StepError,
};
use micromouse_world::{center_goal, KnowledgeGrid, BLOCKED_VISITS};

/// Navigation strategy that follows the left wall through the maze.
#[derive(Clone, Debug)]
pub struct WallFollower {
    grid: KnowledgeGrid,
    goal: Vec<CellCoord>,
    start: CellCoord,
    phase: RunPhase,
    location: CellCoord,
    heading: Direction,
}

impl WallFollower {
    /// Creates a follower targeting the canonical center goal region.
    #[must_use]
    pub fn new(maze_dim: u32) -> Self {
        Self::with_goal(maze_dim, center_goal(maze_dim))
    }

    /// Creates a follower with an explicit goal region.
    #[must_use]
    pub fn with_goal(maze_dim: u32, goal: Vec<CellCoord>) -> Self {
        let start = CellCoord::new(0, 0);
        Self {
            grid: KnowledgeGrid::new(maze_dim),
            goal,
            start,
            phase: RunPhase::Exploring,
            location: start,
            heading: Direction::North,
        }
    }

    /// Read-only access to the accumulated maze knowledge.
    #[must_use]
    pub fn grid(&self) -> &KnowledgeGrid {
        &self.grid
    }

    /// Single pass per run: reaching the goal ends it.
    fn advance_phase(&mut self) {
        self.phase = match self.phase {
            RunPhase::Exploring => RunPhase::SpeedRun,
            _ => RunPhase::Finished,
        };
    }

    fn step_toward(&mut self, rotation: Rotation) -> Result<Action, StepError> {
        self.heading = rotation.applied_to(self.heading);
        self.location = self
            .grid
            .neighbor(self.location, self.heading)
            .ok_or(StepError::OutOfBounds {
                x: self.location.x(),
                y: self.location.y(),
                dim: self.grid.dim(),
            })?;
        Ok(Action::Advance {
            rotation,
            movement: 1,
        })
    }
}

impl Navigator for WallFollower {
    fn next_action(&mut self, reading: &SensorReading) -> Result<Action, StepError> {
        if self.phase == RunPhase::Finished {
            return Ok(Action::Reset);
        }

        self.grid.observe(self.location, self.heading, reading)?;

        if self.goal.contains(&self.location) {
            self.advance_phase();
            self.location = self.start;
            self.heading = Direction::North;
            return Ok(Action::Reset);
        }

        self.grid.record_visit(self.location)?;

        let visits = self.grid.neighbor_visits(self.location)?;
        let minimum = *visits.iter().min().unwrap_or(&BLOCKED_VISITS);

        if minimum == BLOCKED_VISITS {
            // Nowhere qualifies; turn in place so the next observation
            // differs.
            self.heading = self.heading.right();
            return Ok(Action::Advance {
                rotation: Rotation::Right,
                movement: 0,
            });
        }

        let slot = |direction: Direction| visits[usize::from(direction.index())];

        // Hug the left wall unless straight or right is strictly required.
        if slot(self.heading.left()) == minimum {
            self.step_toward(Rotation::Left)
        } else if slot(self.heading) == minimum {
            self.step_toward(Rotation::Straight)
        } else if slot(self.heading.right()) == minimum {
            self.step_toward(Rotation::Right)
        } else {
            // Only the blind rear qualifies; turn toward it one quadrant at
            // a time.
            self.heading = self.heading.right();
            Ok(Action::Advance {
                rotation: Rotation::Right,
                movement: 0,
            })
        }
    }

    fn location(&self) -> CellCoord {
        self.location
    }

    fn heading(&self) -> Direction {
        self.heading
    }

    fn phase(&self) -> RunPhase {
        self.phase
    }

    fn maze_dim(&self) -> u32 {
        self.grid.dim()
    }

    fn name(&self) -> &'static str {
        "wall follower"
    }
}

#[cfg(test)]
mod tests {
    use super::WallFollower;
    use micromouse_core::{
        Action, CellCoord, Direction, Navigator, Rotation, RunPhase, SensorReading,
    };

    #[test]
    fn prefers_the_left_wall_on_a_clean_tie() {
        let mut follower = WallFollower::with_goal(4, vec![CellCoord::new(3, 3)]);
        follower.location = CellCoord::new(1, 1);
        follower.heading = Direction::North;

        // All three sensed directions are open and unvisited.
        let action = follower
            .next_action(&SensorReading::new(1, 2, 2))
            .expect("valid step");

        assert_eq!(
            action,
            Action::Advance {
                rotation: Rotation::Left,
                movement: 1,
            }
        );
        assert_eq!(follower.location(), CellCoord::new(0, 1));
        assert_eq!(follower.heading(), Direction::West);
    }

    #[test]
    fn goes_straight_when_the_left_is_walled() {
        let mut follower = WallFollower::new(4);

        // At the start corner facing North the left is the West boundary.
        let action = follower
            .next_action(&SensorReading::new(0, 3, 3))
            .expect("valid step");

        assert_eq!(
            action,
            Action::Advance {
                rotation: Rotation::Straight,
                movement: 1,
            }
        );
        assert_eq!(follower.location(), CellCoord::new(0, 1));
    }

    #[test]
    fn avoids_the_more_visited_branch() {
        let mut follower = WallFollower::with_goal(4, vec![CellCoord::new(3, 3)]);
        follower.location = CellCoord::new(1, 1);
        follower.heading = Direction::North;
        follower
            .grid
            .record_visit(CellCoord::new(0, 1))
            .expect("in bounds");

        // Left neighbor already visited once; straight ahead wins.
        let action = follower
            .next_action(&SensorReading::new(1, 2, 2))
            .expect("valid step");

        assert_eq!(
            action,
            Action::Advance {
                rotation: Rotation::Straight,
                movement: 1,
            }
        );
    }

    #[test]
    fn dead_ends_boxed_in_on_three_sides_turn_in_place() {
        let mut follower = WallFollower::new(4);

        let action = follower
            .next_action(&SensorReading::new(0, 0, 0))
            .expect("valid step");

        assert_eq!(
            action,
            Action::Advance {
                rotation: Rotation::Right,
                movement: 0,
            }
        );
        assert_eq!(follower.location(), CellCoord::new(0, 0));
        assert_eq!(follower.heading(), Direction::East);
    }

    #[test]
    fn reaching_the_goal_resets_the_run() {
        let mut follower = WallFollower::with_goal(3, vec![CellCoord::new(0, 0)]);

        let action = follower
            .next_action(&SensorReading::new(0, 2, 2))
            .expect("valid step");

        assert_eq!(action, Action::Reset);
        assert_eq!(follower.phase(), RunPhase::SpeedRun);
        assert_eq!(follower.location(), CellCoord::new(0, 0));
        assert_eq!(follower.heading(), Direction::North);
    }
}
