use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use star_battle::{parse_puzzle, solve_with, Grid, SearchContext, SegmentId, DEFAULT_BUDGET};

#[derive(Parser)]
#[command(about = "A Star Battle puzzle solver")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a puzzle file from disk and solve it.
    Solve {
        /// Path to a puzzle text file (one segment token per cell, §6).
        input: PathBuf,
        /// Stars required per row, per column, and per segment.
        #[arg(long, default_value_t = 1)]
        k: usize,
        /// Node-expansion ceiling for the search driver.
        #[arg(long, default_value_t = DEFAULT_BUDGET)]
        budget: usize,
    },
    /// Solve one of the built-in canned puzzles.
    Demo {
        puzzle: DemoPuzzle,
        #[arg(long, default_value_t = 1)]
        k: usize,
        #[arg(long, default_value_t = DEFAULT_BUDGET)]
        budget: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DemoPuzzle {
    /// A single cell; `k = 1`.
    Trivial,
    /// Scenario S1: a unique 5x5 solution.
    Easy,
    /// Scenario S3: a 2x2 grid with one segment, provably unsolvable.
    Unsolvable,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (grid, k, budget) = match args.command {
        Command::Solve { input, k, budget } => {
            info!("reading puzzle file {}", input.display());
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("could not read puzzle file {}", input.display()))?;
            let grid = parse_puzzle(&text, k)
                .with_context(|| format!("could not parse puzzle file {}", input.display()))?;
            (grid, k, budget)
        }
        Command::Demo { puzzle, k, budget } => {
            info!("loading built-in demo puzzle");
            (demo_puzzle(puzzle, k), k, budget)
        }
    };

    let mut ctx = SearchContext::new(budget);
    let start = Instant::now();
    let (result, solved) = solve_with(&grid, &mut ctx);
    let elapsed = start.elapsed();

    print!("{result}");
    if solved {
        println!("solved (k={k}, {} expansion(s), {elapsed:?})", ctx.expansions);
    } else {
        println!(
            "no solution found within budget (k={k}, {} expansion(s), {elapsed:?})",
            ctx.expansions
        );
    }

    Ok(())
}

fn demo_puzzle(puzzle: DemoPuzzle, k: usize) -> Grid {
    fn s(c: char) -> SegmentId {
        SegmentId::new(c)
    }

    match puzzle {
        DemoPuzzle::Trivial => Grid::new(1, 1, k, &[vec![s('A')]]),
        DemoPuzzle::Easy => Grid::new(
            5,
            5,
            k,
            &[
                vec![s('A'), s('A'), s('B'), s('B'), s('B')],
                vec![s('C'), s('A'), s('B'), s('B'), s('B')],
                vec![s('C'), s('D'), s('E'), s('E'), s('B')],
                vec![s('D'), s('D'), s('E'), s('E'), s('D')],
                vec![s('D'), s('D'), s('D'), s('D'), s('D')],
            ],
        ),
        DemoPuzzle::Unsolvable => {
            Grid::new(2, 2, k, &[vec![s('A'), s('A')], vec![s('A'), s('A')]])
        }
    }
}
