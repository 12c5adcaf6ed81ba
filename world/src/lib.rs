#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Maze knowledge representation for the micromouse engine.
//!
//! The [`KnowledgeGrid`] is the single mutable aggregate of everything a
//! robot has learned about its maze: one [`WallMask`] and one visit counter
//! per cell. It is exclusively owned by one navigation strategy for the
//! lifetime of a run sequence and is only ever passed by reference to the
//! flood-fill engine, so there is no aliasing and no locking. Knowledge
//! accumulates monotonically: an `observe` call can add wall bits but never
//! remove one.

mod flood;
mod sensors;

pub use flood::{FloodField, UNREACHED};
pub use sensors::{map_sensors, SensorInfo};

use micromouse_core::{CellCoord, Direction, SensorReading, StepError, WallMask};

/// Visit count forced onto a recognized dead end to discourage revisits.
pub const DEAD_END_VISIT_PENALTY: u8 = 250;

/// Canonical goal region at the center of a maze: the 2x2 block for even
/// dimensions, the single center cell for odd ones, ordered deterministically
/// so flood-fill target seeding is reproducible.
#[must_use]
pub fn center_goal(dim: u32) -> Vec<CellCoord> {
    if dim == 0 {
        return Vec::new();
    }

    let center = dim / 2;
    if dim % 2 == 0 {
        vec![
            CellCoord::new(center, center - 1),
            CellCoord::new(center - 1, center - 1),
            CellCoord::new(center, center),
            CellCoord::new(center - 1, center),
        ]
    } else {
        vec![CellCoord::new(center, center)]
    }
}

/// Visit value reported for directions that are walled or out of bounds.
pub const BLOCKED_VISITS: u8 = u8::MAX;

/// Per-cell wall and visit knowledge for one dim x dim maze.
///
/// Boundary cells have their outward-facing wall bits pre-set at
/// construction because the maze is enclosed; interior edges start unknown
/// and therefore open until an observation confirms a wall.
#[derive(Clone, Debug)]
pub struct KnowledgeGrid {
    dim: u32,
    walls: Vec<WallMask>,
    visits: Vec<u8>,
}

impl KnowledgeGrid {
    /// Creates a blank grid for a maze of the provided dimension with the
    /// enclosing perimeter walls already marked.
    #[must_use]
    pub fn new(dim: u32) -> Self {
        let cell_count = usize::try_from(dim).unwrap_or(0).pow(2);
        let mut grid = Self {
            dim,
            walls: vec![WallMask::OPEN; cell_count],
            visits: vec![0; cell_count],
        };

        if dim == 0 {
            return grid;
        }

        for along in 0..dim {
            grid.mark_wall(CellCoord::new(along, dim - 1), Direction::North);
            grid.mark_wall(CellCoord::new(along, 0), Direction::South);
            grid.mark_wall(CellCoord::new(dim - 1, along), Direction::East);
            grid.mark_wall(CellCoord::new(0, along), Direction::West);
        }

        grid
    }

    /// Maze dimension the grid was constructed with.
    #[must_use]
    pub const fn dim(&self) -> u32 {
        self.dim
    }

    /// Total number of cells tracked by the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.walls.len()
    }

    /// Wall mask recorded for the provided cell, if it lies within bounds.
    #[must_use]
    pub fn wall_mask(&self, cell: CellCoord) -> Option<WallMask> {
        self.index(cell).map(|index| self.walls[index])
    }

    /// Visit count recorded for the provided cell, if it lies within bounds.
    #[must_use]
    pub fn visits(&self, cell: CellCoord) -> Option<u8> {
        self.index(cell).map(|index| self.visits[index])
    }

    /// Neighbor of `cell` one step in `direction`, when it stays in bounds.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        if self.index(cell).is_none() {
            return None;
        }

        let (x, y) = match direction {
            Direction::North => (Some(cell.x()), cell.y().checked_add(1)),
            Direction::East => (cell.x().checked_add(1), Some(cell.y())),
            Direction::South => (Some(cell.x()), cell.y().checked_sub(1)),
            Direction::West => (cell.x().checked_sub(1), Some(cell.y())),
        };

        let neighbor = CellCoord::new(x?, y?);
        self.index(neighbor).map(|_| neighbor)
    }

    /// Reports whether movement from `cell` in `direction` is currently
    /// believed possible.
    ///
    /// Out-of-bounds cells and neighbors saturate to closed rather than
    /// failing; only the mutating entry points treat bad coordinates as
    /// fatal.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord, direction: Direction) -> bool {
        match self.wall_mask(cell) {
            Some(mask) => !mask.contains(direction) && self.neighbor(cell, direction).is_some(),
            None => false,
        }
    }

    /// Merges one turn of sensor data into the wall map.
    ///
    /// Every sensed direction that reads zero gains a wall bit at
    /// `location`, and the mirrored bit on the in-bounds neighbor sharing
    /// that edge, which keeps the shared-edge invariant intact by
    /// construction. The blind rear slot never alters the map, and no bit is
    /// ever cleared.
    pub fn observe(
        &mut self,
        location: CellCoord,
        heading: Direction,
        reading: &SensorReading,
    ) -> Result<(), StepError> {
        let _ = self.index(location).ok_or(self.out_of_bounds(location))?;

        for (slot, info) in map_sensors(heading, reading).into_iter().enumerate() {
            if info != SensorInfo::Wall {
                continue;
            }

            let direction = Direction::from_index(slot as u8)?;
            self.mark_wall(location, direction);
            if let Some(neighbor) = self.neighbor(location, direction) {
                self.mark_wall(neighbor, direction.opposite());
            }
        }

        Ok(())
    }

    /// Increments the visit counter for an occupied cell, saturating at the
    /// byte maximum instead of wrapping.
    pub fn record_visit(&mut self, location: CellCoord) -> Result<(), StepError> {
        let index = self.index(location).ok_or(self.out_of_bounds(location))?;
        self.visits[index] = self.visits[index].saturating_add(1);
        Ok(())
    }

    /// Reports, per direction, the visit count of the reachable neighbor.
    ///
    /// Walled and out-of-bounds directions report [`BLOCKED_VISITS`]. A
    /// neighbor whose wall mask shows three walls is a recognized dead end
    /// and has its visit counter raised to [`DEAD_END_VISIT_PENALTY`] before
    /// being reported, which steers visit-guided strategies away from it.
    pub fn neighbor_visits(&mut self, location: CellCoord) -> Result<[u8; 4], StepError> {
        let mask = self
            .wall_mask(location)
            .ok_or(self.out_of_bounds(location))?;

        let mut visits = [BLOCKED_VISITS; 4];
        for direction in Direction::ALL {
            if mask.contains(direction) {
                continue;
            }

            let Some(neighbor) = self.neighbor(location, direction) else {
                continue;
            };
            let index = self
                .index(neighbor)
                .ok_or(self.out_of_bounds(neighbor))?;

            if self.walls[index].is_dead_end() {
                self.visits[index] = self.visits[index].max(DEAD_END_VISIT_PENALTY);
            }
            visits[usize::from(direction.index())] = self.visits[index];
        }

        Ok(visits)
    }

    fn mark_wall(&mut self, cell: CellCoord, direction: Direction) {
        if let Some(index) = self.index(cell) {
            self.walls[index] = self.walls[index].with(direction);
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.x() >= self.dim || cell.y() >= self.dim {
            return None;
        }

        let x = usize::try_from(cell.x()).ok()?;
        let y = usize::try_from(cell.y()).ok()?;
        let dim = usize::try_from(self.dim).ok()?;
        y.checked_mul(dim)?.checked_add(x)
    }

    const fn out_of_bounds(&self, cell: CellCoord) -> StepError {
        StepError::OutOfBounds {
            x: cell.x(),
            y: cell.y(),
            dim: self.dim,
        }
    }
}
