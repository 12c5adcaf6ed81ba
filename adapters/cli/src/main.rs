#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line harness that simulates micromouse runs on a ground-truth maze.

mod maze;
mod simulation;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use micromouse_core::Navigator;
use micromouse_system_navigation::{FloodFillNavigator, ReturnLeg};
use micromouse_system_wall_follower::WallFollower;

use crate::maze::Maze;

/// Simulates a micromouse exploring and speed-running a maze.
#[derive(Debug, Parser)]
#[command(name = "micromouse", version)]
struct Args {
    /// Side length of the generated maze in cells.
    #[arg(long, default_value_t = 12)]
    dim: u32,

    /// Seed for the maze generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Navigation strategy to simulate.
    #[arg(long, value_enum, default_value_t = Strategy::Waterfall)]
    strategy: Strategy,

    /// Maze file in the classic text format; overrides --dim and --seed.
    #[arg(long)]
    maze: Option<PathBuf>,

    /// Abort the simulation after this many steps.
    #[arg(long, default_value_t = 10_000)]
    max_steps: u32,

    /// Walk back to the start after reaching the goal instead of resetting
    /// there.
    #[arg(long)]
    return_to_start: bool,
}

/// Selectable navigation strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Flood-fill distance field over accumulated wall knowledge.
    Waterfall,
    /// Left-wall hugging guided by neighbor visit counts.
    WallFollower,
}

/// Entry point for the micromouse simulation harness.
fn main() -> Result<()> {
    let args = Args::parse();

    let maze = match &args.maze {
        Some(path) => Maze::load(path)?,
        None => Maze::generate(args.dim, args.seed)?,
    };

    let return_leg = if args.return_to_start {
        ReturnLeg::BackToStart
    } else {
        ReturnLeg::None
    };
    let mut navigator: Box<dyn Navigator> = match args.strategy {
        Strategy::Waterfall => Box::new(FloodFillNavigator::new(maze.dim(), return_leg)),
        Strategy::WallFollower => Box::new(WallFollower::new(maze.dim())),
    };

    let dim = maze.dim();
    println!("{} on a {dim}x{dim} maze", navigator.name());

    let report = simulation::run(&maze, navigator.as_mut(), args.max_steps)?;

    for (index, steps) in report.run_steps.iter().enumerate() {
        println!("run {}: {steps} steps", index + 1);
    }
    println!(
        "exploration {} steps, speed run {} steps, score {:.3}",
        report.exploration_steps(),
        report.speed_steps(),
        report.score()
    );

    Ok(())
}
