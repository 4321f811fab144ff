//! rgverify - standalone binary
//!
//! Thin wrapper around [`rgverify_cli::run_cli`]; all command logic lives in
//! the library crate so it can be exercised by tests directly.
//!
//! # Exit codes
//!
//! - `0` - verification ran to completion, whether or not the program
//!   verified.
//! - `1` - the input could not be read or parsed, declared an illegal
//!   variable name, or the oracle hit a fatal internal error.

fn main() {
    if let Err(e) = rgverify_cli::run_cli() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
