//! Command-line argument parsing and dispatch.
//!
//! The CLI is built on [`clap`] with derive macros, matching the teacher
//! CLI's style. There are no subcommands: `rgverify` takes one positional
//! argument (the program file) and a couple of flags.

use std::path::PathBuf;

use clap::Parser;
use rgverify_engine::{cfg_init, run, run_with_progress, DEFAULT_MAX_ITERATIONS};
use rgverify_oracle::Z3Oracle;

use crate::error::CliError;
use crate::render::{build_report, render_proof_outline, render_verdict};

/// Rely-guarantee proof engine for concurrent integer programs.
#[derive(Parser)]
#[command(name = "rgverify")]
#[command(about = "Derives a proof outline for a rely-guarantee concurrent program", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the program file to verify.
    pub path: PathBuf,

    /// Caps the outer fixpoint loop; exceeding it is reported as a
    /// non-convergence error rather than looping forever.
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    /// Print per-round fixpoint progress to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit the proof outline and verdict as JSON instead of the default
    /// human-readable rendering, for consumption by other tooling.
    #[arg(long)]
    pub json: bool,
}

/// Parses arguments and runs the tool. See the crate-level docs for exit
/// code policy.
pub fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    run_with(cli)
}

fn run_with(cli: Cli) -> Result<(), CliError> {
    let source = std::fs::read_to_string(&cli.path)?;
    let mut program = rgverify_parser::parse_program(&source)?;

    let oracle = Z3Oracle::new();
    cfg_init(&mut program, &oracle)?;

    let outcome = if cli.verbose {
        run_with_progress(&mut program, &oracle, cli.max_iterations, |round| {
            eprintln!("round {round}: checking for stability...");
        })?
    } else {
        run(&mut program, &oracle, cli.max_iterations)?
    };

    if cli.json {
        let report = build_report(&program, &outcome);
        let rendered = serde_json::to_string_pretty(&report).map_err(CliError::Json)?;
        println!("{rendered}");
    } else {
        print!("{}", render_proof_outline(&program));
        println!();
        print!("{}", render_verdict(&outcome));
    }
    Ok(())
}
