use micromouse_core::{Action, CellCoord, Direction, Navigator, RunPhase, SensorReading, WallMask};
use micromouse_system_navigation::{FloodFillNavigator, ReturnLeg};

/// Ground-truth stand-in for the environment collaborator: a hand-built,
/// fully connected 4x4 maze with a walled-off western corridor.
struct MazeOracle {
    dim: u32,
    walls: Vec<WallMask>,
}

impl MazeOracle {
    fn hand_built() -> Self {
        // Row-major from (0, 0); bits are North = 1, East = 2, South = 4,
        // West = 8. The perimeter is closed and a vertical wall separates
        // column 0 from column 1 at y = 1 and y = 2.
        let masks = [
            12, 4, 4, 6, // y = 0
            10, 8, 0, 2, // y = 1
            10, 8, 0, 2, // y = 2
            9, 1, 1, 3, // y = 3
        ];
        Self {
            dim: 4,
            walls: masks.iter().map(|bits| WallMask::from_bits(*bits)).collect(),
        }
    }

    fn mask(&self, cell: CellCoord) -> WallMask {
        let index = cell.y() as usize * self.dim as usize + cell.x() as usize;
        self.walls[index]
    }

    fn is_open(&self, cell: CellCoord, direction: Direction) -> bool {
        !self.mask(cell).contains(direction)
    }

    fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        let (x, y) = match direction {
            Direction::North => (Some(cell.x()), cell.y().checked_add(1)),
            Direction::East => (cell.x().checked_add(1), Some(cell.y())),
            Direction::South => (Some(cell.x()), cell.y().checked_sub(1)),
            Direction::West => (cell.x().checked_sub(1), Some(cell.y())),
        };
        match (x, y) {
            (Some(x), Some(y)) if x < self.dim && y < self.dim => Some(CellCoord::new(x, y)),
            _ => None,
        }
    }

    fn clear_cells(&self, from: CellCoord, direction: Direction) -> u32 {
        let mut count = 0;
        let mut cell = from;
        while self.is_open(cell, direction) {
            match self.neighbor(cell, direction) {
                Some(next) => {
                    count += 1;
                    cell = next;
                }
                None => break,
            }
        }
        count
    }

    fn sense(&self, location: CellCoord, heading: Direction) -> SensorReading {
        SensorReading::new(
            self.clear_cells(location, heading.left()),
            self.clear_cells(location, heading),
            self.clear_cells(location, heading.right()),
        )
    }
}

/// Drives a navigator against the oracle until `resets` runs have ended,
/// checking along the way that every move crosses truly open edges.
fn drive(navigator: &mut FloodFillNavigator, oracle: &MazeOracle, resets: u32) -> Vec<Action> {
    let mut log = Vec::new();
    let mut completed = 0;

    for _ in 0..500 {
        let location = navigator.location();
        let heading = navigator.heading();
        let reading = oracle.sense(location, heading);

        let action = navigator.next_action(&reading).expect("valid step");
        log.push(action);

        match action {
            Action::Reset => {
                completed += 1;
                if completed == resets {
                    return log;
                }
            }
            Action::Advance { rotation, movement } => {
                // Replay the move against the ground truth: the engine must
                // never have planned through a real wall.
                let new_heading = rotation.applied_to(heading);
                let mut cell = location;
                for _ in 0..movement {
                    assert!(
                        oracle.is_open(cell, new_heading),
                        "engine moved through a wall at {cell:?} heading {new_heading:?}"
                    );
                    cell = oracle.neighbor(cell, new_heading).expect("move in bounds");
                }
                assert_eq!(cell, navigator.location());
                assert_eq!(new_heading, navigator.heading());
            }
        }
    }

    panic!("navigator failed to finish {resets} runs within the step budget");
}

#[test]
fn exploration_and_speed_run_complete_on_the_hand_built_maze() {
    let oracle = MazeOracle::hand_built();
    let mut navigator = FloodFillNavigator::new(4, ReturnLeg::None);

    let log = drive(&mut navigator, &oracle, 2);

    assert_eq!(navigator.phase(), RunPhase::Finished);
    assert_eq!(log.iter().filter(|action| **action == Action::Reset).count(), 2);

    // The speed run rides the learned map, so it must be no longer than the
    // exploration leg that produced it.
    let first_reset = log
        .iter()
        .position(|action| *action == Action::Reset)
        .expect("exploration ended");
    let exploration_steps = first_reset;
    let speed_steps = log.len() - first_reset - 2;
    assert!(speed_steps <= exploration_steps);
}

#[test]
fn replays_of_the_same_maze_are_identical() {
    let oracle = MazeOracle::hand_built();

    let mut first = FloodFillNavigator::new(4, ReturnLeg::None);
    let mut second = FloodFillNavigator::new(4, ReturnLeg::None);

    let first_log = drive(&mut first, &oracle, 2);
    let second_log = drive(&mut second, &oracle, 2);

    assert_eq!(first_log, second_log, "replay diverged between runs");
}

#[test]
fn return_leg_walks_back_to_the_start_before_the_speed_run() {
    let oracle = MazeOracle::hand_built();
    let mut navigator = FloodFillNavigator::new(4, ReturnLeg::BackToStart);

    // First reset only happens once the robot has walked goal -> start.
    let log = drive(&mut navigator, &oracle, 1);
    assert_eq!(navigator.phase(), RunPhase::SpeedRun);
    assert_eq!(navigator.location(), CellCoord::new(0, 0));
    assert!(!log.is_empty());

    let log = drive(&mut navigator, &oracle, 1);
    assert_eq!(navigator.phase(), RunPhase::Finished);
    assert!(!log.is_empty());
}
