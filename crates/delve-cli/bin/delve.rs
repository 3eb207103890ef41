//! delve: procedural 3D dungeon layouts
//!
//! Generates one level and prints a map of each floor.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use delve_cli::{parse_grid, run, Options};
use delve_core::GridCoord;

/// Generate a dungeon level and print its floors
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(author, version, about = "Delve - Generate a dungeon level", long_about = None)]
struct Args {
    /// Settings file (JSON); built-in demo settings otherwise
    #[arg(short = 's', long = "settings")]
    settings: Option<PathBuf>,

    /// Fixed seed
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Grid size as X,Y,Z
    #[arg(short = 'g', long = "grid", value_parser = parse_grid)]
    grid: Option<GridCoord>,

    /// Only print this floor
    #[arg(short = 'f', long = "floor")]
    floor: Option<i32>,

    /// Export the layout to this file (.gz for gzip)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Export without pretty printing
    #[arg(long = "compact")]
    compact: bool,

    /// Debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let options = Options {
        settings: args.settings,
        seed: args.seed,
        grid: args.grid,
        floor: args.floor,
        output: args.output,
        compact: args.compact,
    };
    match run(&options) {
        Ok(text) => {
            print!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("delve: {}", e);
            ExitCode::FAILURE
        }
    }
}
