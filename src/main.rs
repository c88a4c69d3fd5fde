//! Benchmark runner: reference GEMM vs naive tiled kernel.

use std::io;
use std::process;

use clap::Parser;
use gemmbench::config::{DEFAULT_SEED, DEFAULT_SIZE, DEFAULT_TILE};
use gemmbench::{BenchConfig, Harness, TileDim};

/// Time a naive tiled matrix multiply against a cache-blocked GEMM and
/// check that both agree.
#[derive(Parser)]
#[command(name = "gemmbench", version)]
struct Cli {
    /// Side length of the square matrices
    #[arg(short = 'n', long, default_value_t = DEFAULT_SIZE)]
    size: usize,
    /// Rows of output covered by one work tile
    #[arg(long, default_value_t = DEFAULT_TILE)]
    tile_rows: usize,
    /// Columns of output covered by one work tile
    #[arg(long, default_value_t = DEFAULT_TILE)]
    tile_cols: usize,
    /// Seed for the input matrices
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Worker threads (defaults to one per core)
    #[arg(short, long)]
    threads: Option<usize>,
}

impl From<Cli> for BenchConfig {
    fn from(cli: Cli) -> Self {
        Self {
            size: cli.size,
            tile: TileDim {
                rows: cli.tile_rows,
                cols: cli.tile_cols,
            },
            seed: cli.seed,
            threads: cli.threads,
        }
    }
}

fn main() {
    env_logger::init();
    let config = BenchConfig::from(Cli::parse());

    let result = Harness::new(config).and_then(|mut harness| harness.run(&mut io::stdout().lock()));

    // PASS and FAIL both exit 0; only an aborted run is a process error
    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(e.exit_code());
    }
}
