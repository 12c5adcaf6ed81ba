//! Flood-fill distance field over the knowledge grid.

use std::collections::VecDeque;

use micromouse_core::{CellCoord, Direction};

use crate::KnowledgeGrid;

/// Sentinel distance for cells not reachable under currently known walls.
pub const UNREACHED: u16 = u16::MAX;

/// Dense distance-from-target grid rebuilt from the knowledge grid.
///
/// Distances are derived data: every rebuild recomputes the whole field from
/// scratch, because a single newly discovered wall can invalidate arbitrarily
/// many downstream distances. Unreachable cells keep [`UNREACHED`] so callers
/// can tell them apart from genuinely distant ones.
#[derive(Clone, Debug, Default)]
pub struct FloodField {
    dim: u32,
    distances: Vec<u16>,
}

impl FloodField {
    /// Rebuilds the field via multi-source breadth-first propagation.
    ///
    /// Target cells seed the frontier with distance zero in the order given;
    /// neighbors are expanded in the fixed North, East, South, West order.
    /// Both orders are stable so tied distances always resolve identically,
    /// which keeps downstream decisions reproducible. Out-of-bounds targets
    /// are skipped, and a repeated target contributes once.
    pub fn rebuild(&mut self, grid: &KnowledgeGrid, targets: &[CellCoord]) {
        let cell_count = grid.cell_count();
        self.dim = grid.dim();

        if self.distances.len() != cell_count {
            self.distances = vec![UNREACHED; cell_count];
        } else {
            self.distances.fill(UNREACHED);
        }

        let mut frontier = VecDeque::new();

        for &target in targets {
            let Some(index) = self.index(target) else {
                continue;
            };

            if self.distances[index] == 0 {
                continue;
            }

            self.distances[index] = 0;
            frontier.push_back(target);
        }

        while let Some(cell) = frontier.pop_front() {
            let Some(cell_index) = self.index(cell) else {
                continue;
            };
            let distance = self.distances[cell_index];
            if distance >= UNREACHED.saturating_sub(1) {
                continue;
            }

            let Some(mask) = grid.wall_mask(cell) else {
                continue;
            };

            for direction in Direction::ALL {
                if mask.contains(direction) {
                    continue;
                }

                let Some(neighbor) = grid.neighbor(cell, direction) else {
                    continue;
                };
                let Some(neighbor_index) = self.index(neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] != UNREACHED {
                    continue;
                }

                self.distances[neighbor_index] = distance + 1;
                frontier.push_back(neighbor);
            }
        }
    }

    /// Maze dimension of the most recent rebuild.
    #[must_use]
    pub const fn dim(&self) -> u32 {
        self.dim
    }

    /// Dense distances stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[u16] {
        &self.distances
    }

    /// Distance recorded for the provided cell, if it lies within the field.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u16> {
        self.index(cell).map(|index| self.distances[index])
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
}

#[cfg(test)]
mod tests {
    use super::{FloodField, UNREACHED};
    use crate::KnowledgeGrid;
    use micromouse_core::{CellCoord, Direction, SensorReading};

    #[test]
    fn rebuild_sets_target_cells_to_zero() {
        let grid = KnowledgeGrid::new(5);
        let mut field = FloodField::default();

        field.rebuild(&grid, &[CellCoord::new(2, 2)]);

        assert_eq!(field.distance(CellCoord::new(2, 2)), Some(0));
        assert_eq!(field.distance(CellCoord::new(2, 3)), Some(1));
        assert_eq!(field.distance(CellCoord::new(2, 4)), Some(2));
        assert_eq!(field.distance(CellCoord::new(0, 0)), Some(4));
        assert_eq!(field.distance(CellCoord::new(4, 4)), Some(4));
    }

    #[test]
    fn rebuild_respects_known_walls() {
        let mut grid = KnowledgeGrid::new(5);
        // Robot at (2, 3) facing North senses a wall straight ahead and on
        // both sides, sealing (2, 3) except to the South.
        grid.observe(
            CellCoord::new(2, 3),
            Direction::North,
            &SensorReading::new(0, 0, 0),
        )
        .expect("observe in bounds");

        let mut field = FloodField::default();
        field.rebuild(&grid, &[CellCoord::new(2, 2)]);

        // The sealed cell is only enterable from the South, one step above
        // the target.
        assert_eq!(field.distance(CellCoord::new(2, 3)), Some(1));
        // Its northern neighbor must detour around the confirmed wall.
        assert_eq!(field.distance(CellCoord::new(2, 4)), Some(4));
    }

    #[test]
    fn corridor_distances_count_up_from_the_target() {
        // Seal the bottom row off from the rest of a 5x5 maze, leaving an
        // open straight corridor of length 4 from the target at (0, 0).
        let mut grid = KnowledgeGrid::new(5);
        for x in 0..5 {
            grid.observe(
                CellCoord::new(x, 0),
                Direction::North,
                &SensorReading::new(1, 0, 1),
            )
            .expect("observe in bounds");
        }

        let mut field = FloodField::default();
        field.rebuild(&grid, &[CellCoord::new(0, 0)]);

        for x in 0..5u32 {
            assert_eq!(field.distance(CellCoord::new(x, 0)), Some(x as u16));
        }
        assert_eq!(field.distance(CellCoord::new(0, 1)), Some(UNREACHED));
    }

    #[test]
    fn cells_walled_off_from_the_target_keep_the_sentinel() {
        let mut grid = KnowledgeGrid::new(3);
        // Seal the (0, 0) corner completely.
        grid.observe(
            CellCoord::new(0, 0),
            Direction::North,
            &SensorReading::new(0, 0, 0),
        )
        .expect("observe in bounds");
        grid.observe(
            CellCoord::new(0, 0),
            Direction::South,
            &SensorReading::new(0, 0, 0),
        )
        .expect("observe in bounds");

        let mut field = FloodField::default();
        field.rebuild(&grid, &[CellCoord::new(2, 2)]);

        assert_eq!(field.distance(CellCoord::new(0, 0)), Some(UNREACHED));
        assert_eq!(field.distance(CellCoord::new(1, 1)), Some(2));
    }

    #[test]
    fn rebuild_is_idempotent_without_new_observations() {
        let mut grid = KnowledgeGrid::new(5);
        grid.observe(
            CellCoord::new(1, 1),
            Direction::North,
            &SensorReading::new(0, 2, 0),
        )
        .expect("observe in bounds");

        let targets = [CellCoord::new(2, 2), CellCoord::new(2, 1)];
        let mut field = FloodField::default();
        field.rebuild(&grid, &targets);
        let first = field.cells().to_vec();

        field.rebuild(&grid, &targets);
        assert_eq!(field.cells(), first.as_slice());
    }

    #[test]
    fn repeated_targets_contribute_once() {
        let grid = KnowledgeGrid::new(3);
        let mut field = FloodField::default();

        field.rebuild(&grid, &[CellCoord::new(1, 1), CellCoord::new(1, 1)]);

        assert_eq!(field.distance(CellCoord::new(1, 1)), Some(0));
        assert_eq!(field.distance(CellCoord::new(0, 0)), Some(2));
    }

    #[test]
    fn out_of_bounds_targets_are_skipped() {
        let grid = KnowledgeGrid::new(3);
        let mut field = FloodField::default();

        field.rebuild(&grid, &[CellCoord::new(9, 9), CellCoord::new(0, 0)]);

        assert_eq!(field.distance(CellCoord::new(0, 0)), Some(0));
        assert_eq!(field.distance(CellCoord::new(2, 2)), Some(4));
    }
}
