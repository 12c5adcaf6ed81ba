//! Drives a navigation strategy through a ground-truth maze.

use anyhow::{bail, ensure, Result};
use micromouse_core::{Action, Navigator, RunPhase};

use crate::maze::Maze;

/// Step counts collected over a full run sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RunReport {
    /// Steps taken by each completed run, in order. The last entry is the
    /// speed run.
    pub(crate) run_steps: Vec<u32>,
}

impl RunReport {
    /// Combined steps of every run before the speed run.
    pub(crate) fn exploration_steps(&self) -> u32 {
        match self.run_steps.split_last() {
            Some((_, rest)) => rest.iter().sum(),
            None => 0,
        }
    }

    /// Steps of the final, map-guided run.
    pub(crate) fn speed_steps(&self) -> u32 {
        self.run_steps.last().copied().unwrap_or(0)
    }

    /// Classic benchmark score: the speed run at full weight plus one
    /// thirtieth of the exploration cost. Lower is better.
    pub(crate) fn score(&self) -> f64 {
        f64::from(self.speed_steps()) + f64::from(self.exploration_steps()) / 30.0
    }
}

/// Runs the navigator to completion, cross-checking every move against the
/// real walls.
///
/// The navigator only ever sees sensor readings; if it nevertheless plans a
/// move through a real wall or its pose bookkeeping diverges from the replay,
/// the simulation fails rather than letting a broken run score.
pub(crate) fn run(
    maze: &Maze,
    navigator: &mut dyn Navigator,
    max_steps: u32,
) -> Result<RunReport> {
    ensure!(
        navigator.maze_dim() == maze.dim(),
        "navigator built for dimension {}, maze has {}",
        navigator.maze_dim(),
        maze.dim()
    );

    let mut run_steps = Vec::new();
    let mut current_run = 0u32;
    let mut total = 0u32;

    while navigator.phase() != RunPhase::Finished {
        if total >= max_steps {
            bail!("step budget of {max_steps} exhausted after {} runs", run_steps.len());
        }
        total += 1;
        current_run += 1;

        let location = navigator.location();
        let heading = navigator.heading();
        let reading = maze.sense(location, heading);

        match navigator.next_action(&reading)? {
            Action::Reset => {
                run_steps.push(current_run);
                current_run = 0;
            }
            Action::Advance { rotation, movement } => {
                let new_heading = rotation.applied_to(heading);
                let mut cell = location;
                for _ in 0..movement {
                    ensure!(
                        maze.is_open(cell, new_heading),
                        "strategy planned through a wall at ({}, {}) heading {new_heading:?}",
                        cell.x(),
                        cell.y()
                    );
                    cell = match maze.neighbor(cell, new_heading) {
                        Some(next) => next,
                        None => bail!("strategy planned out of bounds from ({}, {})", cell.x(), cell.y()),
                    };
                }
                ensure!(
                    cell == navigator.location() && new_heading == navigator.heading(),
                    "strategy pose diverged from the replayed move"
                );
            }
        }
    }

    Ok(RunReport { run_steps })
}
