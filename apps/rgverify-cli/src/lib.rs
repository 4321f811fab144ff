//! `rgverify` - command-line driver for the rely-guarantee proof engine.
//!
//! Reads a program file, parses it, runs the fixpoint proof engine over it,
//! and prints the resulting proof outline and verdict. See [`cli::run_cli`].

pub mod cli;
pub mod error;
pub mod render;

pub use cli::run_cli;
pub use error::CliError;
