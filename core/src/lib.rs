#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the micromouse navigation engine.
//!
//! This crate defines the vocabulary that connects the maze knowledge store,
//! the navigation strategies, and the simulation harness: cardinal
//! directions, the 4-bit wall codec, sensor readings, and the bounded
//! rotate+move [`Action`] every strategy must produce. Strategies implement
//! the [`Navigator`] trait and are selected once at construction; the engine
//! itself is single-threaded and turn-based, so nothing here is shared across
//! concurrent robots.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard cap on the number of cells a single action may advance.
pub const MAX_MOVEMENT: u8 = 3;

/// Cardinal direction on the maze grid.
///
/// North points toward increasing `y`, East toward increasing `x`. The
/// numeric indices 0-3 are cyclic under quarter turns, which is the only
/// arithmetic the navigation policies rely on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing `y`.
    North,
    /// Movement toward increasing `x`.
    East,
    /// Movement toward decreasing `y`.
    South,
    /// Movement toward decreasing `x`.
    West,
}

impl Direction {
    /// All four directions in the fixed evaluation order used by the engine.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Cyclic index of the direction: North = 0 through West = 3.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    /// Reconstructs a direction from its cyclic index.
    ///
    /// Indices outside `0..4` are a contract violation surfaced as
    /// [`StepError::InvalidDirection`]; callers that already hold a
    /// `Direction` never hit this path.
    pub const fn from_index(index: u8) -> Result<Self, StepError> {
        match index {
            0 => Ok(Direction::North),
            1 => Ok(Direction::East),
            2 => Ok(Direction::South),
            3 => Ok(Direction::West),
            _ => Err(StepError::InvalidDirection { index }),
        }
    }

    /// Direction reached by a single wall-to-wall mirror: North <-> South,
    /// East <-> West.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Direction after a quarter turn counter-clockwise.
    #[must_use]
    pub const fn left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::East => Direction::North,
            Direction::South => Direction::East,
            Direction::West => Direction::South,
        }
    }

    /// Direction after a quarter turn clockwise.
    #[must_use]
    pub const fn right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }
}

/// Bounded single-step rotation available to the robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    /// Quarter turn counter-clockwise (-90 degrees).
    Left,
    /// No rotation.
    Straight,
    /// Quarter turn clockwise (+90 degrees).
    Right,
}

impl Rotation {
    /// Signed rotation in degrees, matching the external driver contract.
    #[must_use]
    pub const fn degrees(self) -> i16 {
        match self {
            Rotation::Left => -90,
            Rotation::Straight => 0,
            Rotation::Right => 90,
        }
    }

    /// Heading that results from applying the rotation.
    #[must_use]
    pub const fn applied_to(self, heading: Direction) -> Direction {
        match self {
            Rotation::Left => heading.left(),
            Rotation::Straight => heading,
            Rotation::Right => heading.right(),
        }
    }
}

/// Location of a single maze cell expressed as `x`, `y` coordinates.
///
/// The start corner is `(0, 0)`; `x` grows East and `y` grows North, the
/// frame the sensor and movement conventions assume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two cells.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// 4-bit wall set for one cell: North = 1, East = 2, South = 4, West = 8.
///
/// A set bit means a confirmed wall blocking movement in that direction.
/// Marking is idempotent and knowledge only accumulates; nothing in the
/// engine ever clears a bit once it is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallMask(u8);

impl WallMask {
    /// Mask with no walls known.
    pub const OPEN: WallMask = WallMask(0);

    /// Mask with all four walls present.
    pub const CLOSED: WallMask = WallMask(0b1111);

    /// Builds a mask from raw bits, discarding anything above the low nibble.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// Encodes a set of directions into a mask.
    #[must_use]
    pub fn from_directions(directions: &[Direction]) -> Self {
        directions
            .iter()
            .fold(Self::OPEN, |mask, direction| mask.with(*direction))
    }

    /// Raw 4-bit representation of the mask.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Reports whether a wall is present in the given direction.
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & (1 << direction.index()) != 0
    }

    /// Returns the mask with a wall marked in the given direction.
    ///
    /// Marking an already-known wall is a no-op.
    #[must_use]
    pub const fn with(self, direction: Direction) -> Self {
        Self(self.0 | (1 << direction.index()))
    }

    /// Decodes the mask into the set of walled directions.
    ///
    /// The iteration order is fixed (North, East, South, West) but carries no
    /// meaning; the result is a set.
    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }

    /// Decodes the mask into the set of open directions.
    pub fn open_directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| !self.contains(*direction))
    }

    /// Number of directions currently known to be walled.
    #[must_use]
    pub const fn wall_count(self) -> u32 {
        self.0.count_ones()
    }

    /// Reports whether the cell is a recognized dead end (exactly three
    /// walls, one opening).
    #[must_use]
    pub const fn is_dead_end(self) -> bool {
        self.0.count_ones() == 3
    }
}

/// Ordered left/front/right sensor reading delivered by the environment.
///
/// Each value counts the open cells visible in that relative direction
/// before the first wall; zero means the wall is immediately adjacent. The
/// rear is the robot's blind spot and is never reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorReading {
    left: u32,
    front: u32,
    right: u32,
}

impl SensorReading {
    /// Number of values a well-formed reading carries.
    pub const LEN: usize = 3;

    /// Creates a reading from already-validated open-cell counts.
    #[must_use]
    pub const fn new(left: u32, front: u32, right: u32) -> Self {
        Self { left, front, right }
    }

    /// Validates a raw collaborator reading.
    ///
    /// Rejects wrong-length slices and negative counts, the two malformed
    /// shapes named by the collaborator contract. There is no silent
    /// recovery; a rejected reading fails the whole planning step.
    pub fn from_slice(values: &[i64]) -> Result<Self, StepError> {
        if values.len() != Self::LEN {
            return Err(StepError::SensorReadingLength {
                actual: values.len(),
            });
        }

        let mut validated = [0u32; Self::LEN];
        for (slot, value) in values.iter().enumerate() {
            validated[slot] =
                u32::try_from(*value).map_err(|_| StepError::NegativeSensorReading {
                    slot,
                    value: *value,
                })?;
        }

        Ok(Self::new(validated[0], validated[1], validated[2]))
    }

    /// Open-cell count to the robot's left.
    #[must_use]
    pub const fn left(&self) -> u32 {
        self.left
    }

    /// Open-cell count straight ahead.
    #[must_use]
    pub const fn front(&self) -> u32 {
        self.front
    }

    /// Open-cell count to the robot's right.
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.right
    }
}

/// Action returned to the external driver at the end of a planning step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Rotate by a bounded quarter turn, then move forward `movement` cells.
    ///
    /// `movement` never exceeds [`MAX_MOVEMENT`] and is zero only in the
    /// stuck-cell escape and the 180-degree two-turn cases.
    Advance {
        /// Rotation applied before moving.
        rotation: Rotation,
        /// Number of cells to move along the new heading.
        movement: u8,
    },
    /// End-of-run sentinel; the driver returns the robot to the start pose.
    Reset,
}

/// Lifecycle phase of a robot run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunPhase {
    /// Outbound mapping leg toward the goal region.
    Exploring,
    /// Return leg toward the start cell after first reaching the goal.
    Returning,
    /// Scored run toward the goal over the map learned so far.
    SpeedRun,
    /// Terminal phase after the final target set was reached.
    Finished,
}

/// Failure surfaced by a planning step.
///
/// Every variant is a contract violation between the engine and its
/// collaborator or caller; none is retried, because a step is pure and
/// deterministic and would fail identically again.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum StepError {
    /// A direction index outside the cardinal range 0-3 was supplied.
    #[error("invalid direction index {index}; cardinal directions are 0-3")]
    InvalidDirection {
        /// Index that failed to decode.
        index: u8,
    },
    /// A sensor reading arrived with the wrong number of values.
    #[error("sensor reading must contain exactly 3 values, got {actual}")]
    SensorReadingLength {
        /// Number of values actually supplied.
        actual: usize,
    },
    /// A sensor reading contained a negative open-cell count.
    #[error("sensor reading slot {slot} is negative ({value})")]
    NegativeSensorReading {
        /// Zero-based slot of the offending value (left = 0).
        slot: usize,
        /// Value that was rejected.
        value: i64,
    },
    /// A grid operation addressed a cell outside the maze bounds.
    #[error("cell ({x}, {y}) lies outside the {dim}x{dim} maze")]
    OutOfBounds {
        /// Column of the rejected cell.
        x: u32,
        /// Row of the rejected cell.
        y: u32,
        /// Configured maze dimension.
        dim: u32,
    },
}

/// Strategy interface shared by every navigation variant.
///
/// One planning step is a synchronous request/response cycle: the driver
/// hands the implementation the latest sensor reading and blocks for the
/// resulting [`Action`]. Implementations own their pose bookkeeping: they
/// apply each emitted rotation and movement to their internal heading and
/// location, and reinitialize the pose when they emit [`Action::Reset`], so
/// the read-only accessors always describe where the robot will be when the
/// next reading arrives.
pub trait Navigator {
    /// Plans the next action from the current sensor reading.
    fn next_action(&mut self, reading: &SensorReading) -> Result<Action, StepError>;

    /// Cell the robot currently occupies.
    fn location(&self) -> CellCoord;

    /// Direction the robot currently faces.
    fn heading(&self) -> Direction;

    /// Lifecycle phase of the current run sequence.
    fn phase(&self) -> RunPhase;

    /// Configured maze dimension, fixed at construction.
    fn maze_dim(&self) -> u32;

    /// Human-readable strategy name for harness output.
    fn name(&self) -> &'static str;
}
