//! PhantomRisk engine: a territorial-conquest economy behind a text protocol.
//!
//! This binary reads commands from stdin and writes replies to stdout, one
//! line per reply. Logs go to stderr, filtered by `RUST_LOG`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use phantom_risk::config::Config;
use phantom_risk::engine::Engine;
use phantom_risk::protocol::parser::{parse_command, Command};

/// PhantomRisk engine
#[derive(Parser, Debug)]
#[command(name = "phantom-risk")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file (owner, settings, scenario)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON scenario to load at startup; overrides the config's scenario
    #[arg(short, long)]
    scenario: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "bad config");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let mut engine = Engine::new(&config);
    if let Some(path) = args.scenario.or(config.scenario) {
        if let Err(e) = engine.load(&path) {
            tracing::error!(?path, error = %e, "failed to load scenario");
            return ExitCode::FAILURE;
        }
    }

    match run(&mut engine) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "i/o failure");
            ExitCode::FAILURE
        }
    }
}

/// Runs the main protocol loop until `quit` or end of input.
fn run(engine: &mut Engine) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = line?;
        let cmd = match parse_command(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(%line, error = %e, "unparsable command");
                writeln!(out, "error parse: {}", e)?;
                out.flush()?;
                continue;
            }
        };
        if cmd == Command::Quit {
            break;
        }
        engine.execute(cmd, &mut out)?;
    }
    Ok(())
}
