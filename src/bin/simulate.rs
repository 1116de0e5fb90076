//! Randomized self-play CLI.
//!
//! Drives many independent worlds with random players, checks invariants
//! after every call and writes one JSON record per world.
//!
//! Usage:
//!   cargo run --release --bin simulate -- --worlds 32 --steps 5000 --seed 7

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use phantom_risk::simulate::{self, SimConfig};

/// Randomized self-play over many PhantomRisk worlds
#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of independent worlds
    #[arg(short, long, default_value = "8")]
    worlds: usize,

    /// Players joined into each world
    #[arg(short, long, default_value = "12")]
    players: usize,

    /// Random calls made per world
    #[arg(long, default_value = "2000")]
    steps: usize,

    /// Maximum clock advance between calls, in seconds
    #[arg(long, default_value = "7200")]
    max_step: u64,

    /// Grid side length of the generated map
    #[arg(short, long, default_value = "4")]
    grid: u32,

    /// Number of parallel threads
    #[arg(short, long, default_value = "4")]
    threads: usize,

    /// Random seed, 0 for entropy
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Suppress summary output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if args.players == 0 || args.grid < 2 {
        eprintln!("need at least one player and a grid of at least 2");
        return ExitCode::FAILURE;
    }
    let config = SimConfig {
        worlds: args.worlds,
        players: args.players,
        steps: args.steps,
        max_step_seconds: args.max_step,
        grid: args.grid,
        threads: args.threads,
        seed: args.seed,
    };

    let records = match simulate::run_simulation(&config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("failed to build thread pool: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let written = match &args.output {
        Some(path) => File::create(path)
            .and_then(|f| simulate::write_jsonl(&records, &mut BufWriter::new(f))),
        None => simulate::write_jsonl(&records, &mut BufWriter::new(io::stdout().lock())),
    };
    if let Err(e) = written {
        eprintln!("failed to write output: {}", e);
        return ExitCode::FAILURE;
    }

    if !args.quiet {
        simulate::print_summary(&records);
    }
    if records.iter().any(|r| !r.violations.is_empty()) {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
