//! Ground-truth maze oracle for the simulation harness.
//!
//! The engine crates only ever see [`SensorReading`] values; this module owns
//! the real walls, either generated from a seed or loaded from the classic
//! text format, and answers sensor queries against them.

use std::{fs, path::Path};

use anyhow::{bail, ensure, Context, Result};
use micromouse_core::{CellCoord, Direction, SensorReading, WallMask};
use micromouse_world::center_goal;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Fully known maze the simulated robot drives through.
#[derive(Clone, Debug)]
pub(crate) struct Maze {
    dim: u32,
    walls: Vec<WallMask>,
}

impl Maze {
    /// Generates a perfect maze with a seeded recursive backtracker, then
    /// opens the interior edges of the center goal region so it forms one
    /// chamber.
    pub(crate) fn generate(dim: u32, seed: u64) -> Result<Self> {
        ensure!(dim >= 2, "maze dimension must be at least 2, got {dim}");

        let cell_count = dim as usize * dim as usize;
        let mut maze = Self {
            dim,
            walls: vec![WallMask::CLOSED; cell_count],
        };

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut visited = vec![false; cell_count];
        let mut stack = vec![CellCoord::new(0, 0)];
        visited[0] = true;

        while let Some(current) = stack.last().copied() {
            let mut candidates = Vec::with_capacity(4);
            for direction in Direction::ALL {
                if let Some(next) = maze.neighbor(current, direction) {
                    if !visited[maze.index(next)] {
                        candidates.push((direction, next));
                    }
                }
            }

            match candidates.choose(&mut rng) {
                Some((direction, next)) => {
                    maze.remove_wall(current, *direction);
                    visited[maze.index(*next)] = true;
                    stack.push(*next);
                }
                None => {
                    let _ = stack.pop();
                }
            }
        }

        // The goal block of an even-dimension maze is a single open chamber.
        let goal = center_goal(dim);
        for cell in &goal {
            for direction in Direction::ALL {
                match maze.neighbor(*cell, direction) {
                    Some(next) if goal.contains(&next) => {
                        maze.remove_wall(*cell, direction);
                    }
                    _ => {}
                }
            }
        }

        Ok(maze)
    }

    /// Loads a maze from the classic text format: the dimension on the first
    /// line, then one comma-separated line per column of 4-bit openness
    /// values (1 = north, 2 = east, 4 = south, 8 = west, set bit = open).
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("could not read maze file {}", path.display()))?;
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());

        let dim: u32 = lines
            .next()
            .context("maze file is empty")?
            .trim()
            .parse()
            .context("first line must be the maze dimension")?;
        ensure!(dim >= 2, "maze dimension must be at least 2, got {dim}");

        let mut walls = vec![WallMask::CLOSED; dim as usize * dim as usize];
        let mut columns = 0u32;
        for (x, line) in lines.enumerate() {
            ensure!(
                (x as u32) < dim,
                "maze file has more than {dim} column lines"
            );
            let values: Vec<u8> = line
                .split(',')
                .map(|value| value.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .with_context(|| format!("unparseable wall values on column {x}"))?;
            ensure!(
                values.len() == dim as usize,
                "column {x} has {} values, expected {dim}",
                values.len()
            );

            for (y, openness) in values.iter().enumerate() {
                ensure!(
                    *openness <= 0b1111,
                    "wall value {openness} on column {x} exceeds four bits"
                );
                walls[y * dim as usize + x] = WallMask::from_bits(!openness & 0b1111);
            }
            columns += 1;
        }
        ensure!(columns == dim, "maze file has {columns} column lines, expected {dim}");

        let maze = Self { dim, walls };
        maze.check_consistency()?;
        Ok(maze)
    }

    pub(crate) fn dim(&self) -> u32 {
        self.dim
    }

    pub(crate) fn is_open(&self, cell: CellCoord, direction: Direction) -> bool {
        !self.walls[self.index(cell)].contains(direction) && self.neighbor(cell, direction).is_some()
    }

    pub(crate) fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
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

    /// Sensor view from a pose: clear cells to the left, front, and right.
    pub(crate) fn sense(&self, location: CellCoord, heading: Direction) -> SensorReading {
        SensorReading::new(
            self.clear_cells(location, heading.left()),
            self.clear_cells(location, heading),
            self.clear_cells(location, heading.right()),
        )
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

    fn index(&self, cell: CellCoord) -> usize {
        cell.y() as usize * self.dim as usize + cell.x() as usize
    }

    fn remove_wall(&mut self, cell: CellCoord, direction: Direction) {
        let index = self.index(cell);
        self.walls[index] = WallMask::from_bits(self.walls[index].bits() & !(1 << direction.index()));
        if let Some(next) = self.neighbor(cell, direction) {
            let index = self.index(next);
            let opposite = direction.opposite();
            self.walls[index] = WallMask::from_bits(self.walls[index].bits() & !(1 << opposite.index()));
        }
    }

    /// Every shared edge must agree from both sides and the perimeter must be
    /// sealed. Loaded files are untrusted, so violations are errors.
    fn check_consistency(&self) -> Result<()> {
        for y in 0..self.dim {
            for x in 0..self.dim {
                let cell = CellCoord::new(x, y);
                let mask = self.walls[self.index(cell)];
                for direction in Direction::ALL {
                    match self.neighbor(cell, direction) {
                        Some(next) => {
                            let mirrored = self.walls[self.index(next)];
                            if mask.contains(direction) != mirrored.contains(direction.opposite()) {
                                bail!("asymmetric wall between ({x}, {y}) and its {direction:?} neighbor");
                            }
                        }
                        None => {
                            if !mask.contains(direction) {
                                bail!("perimeter breach at ({x}, {y}) toward {direction:?}");
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn reachable_cells(maze: &Maze) -> usize {
        let mut seen = vec![false; maze.dim as usize * maze.dim as usize];
        let mut queue = VecDeque::from([CellCoord::new(0, 0)]);
        seen[0] = true;
        let mut count = 1;

        while let Some(cell) = queue.pop_front() {
            for direction in Direction::ALL {
                if !maze.is_open(cell, direction) {
                    continue;
                }
                let next = maze.neighbor(cell, direction).expect("open implies in bounds");
                let index = maze.index(next);
                if !seen[index] {
                    seen[index] = true;
                    count += 1;
                    queue.push_back(next);
                }
            }
        }

        count
    }

    #[test]
    fn generated_mazes_are_fully_connected() {
        for seed in 0..8 {
            let maze = Maze::generate(12, seed).expect("valid dimension");
            assert_eq!(reachable_cells(&maze), 144, "seed {seed} left cells unreachable");
        }
    }

    #[test]
    fn generated_mazes_are_symmetric_and_enclosed() {
        let maze = Maze::generate(8, 42).expect("valid dimension");
        maze.check_consistency().expect("generator keeps walls consistent");
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let first = Maze::generate(10, 7).expect("valid dimension");
        let second = Maze::generate(10, 7).expect("valid dimension");
        assert_eq!(first.walls, second.walls);

        let third = Maze::generate(10, 8).expect("valid dimension");
        assert_ne!(first.walls, third.walls);
    }

    #[test]
    fn goal_region_forms_an_open_chamber() {
        let maze = Maze::generate(12, 3).expect("valid dimension");
        let goal = center_goal(12);
        for cell in &goal {
            for direction in Direction::ALL {
                if let Some(next) = maze.neighbor(*cell, direction) {
                    if goal.contains(&next) {
                        assert!(maze.is_open(*cell, direction));
                    }
                }
            }
        }
    }

    #[test]
    fn sense_counts_clear_cells_until_the_first_wall() {
        // A 2x2 maze is a single chamber once its goal block is opened.
        let maze = Maze::generate(2, 0).expect("valid dimension");
        let reading = maze.sense(CellCoord::new(0, 0), Direction::North);
        assert_eq!(reading, SensorReading::new(0, 1, 1));
    }

    #[test]
    fn load_parses_the_classic_text_format() {
        let dir = std::env::temp_dir().join("micromouse-maze-load-test");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("tiny.txt");
        // Column-major openness values for a 2x2 chamber.
        std::fs::write(&path, "2\n3,6\n9,12\n").expect("write maze file");

        let maze = Maze::load(&path).expect("valid maze file");
        assert_eq!(maze.dim(), 2);
        assert!(maze.is_open(CellCoord::new(0, 0), Direction::North));
        assert!(maze.is_open(CellCoord::new(0, 0), Direction::East));
        assert!(!maze.is_open(CellCoord::new(0, 0), Direction::South));
        assert!(!maze.is_open(CellCoord::new(0, 0), Direction::West));
    }

    #[test]
    fn load_rejects_asymmetric_walls() {
        let dir = std::env::temp_dir().join("micromouse-maze-load-test");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("asymmetric.txt");
        // (0, 0) claims its east edge is open but (1, 0) disagrees.
        std::fs::write(&path, "2\n3,6\n1,12\n").expect("write maze file");

        assert!(Maze::load(&path).is_err());
    }
}
