//! Turns program source text into an [`rgverify_ast::Program`].
//!
//! This crate only builds the static shape described in `rgverify-ast`'s data
//! model: symbols, statements, and which block they live in. It does not
//! assign program counters, compute locals, or wire up interference — that
//! is `rgverify-engine`'s `cfg_init` pass, run once parsing succeeds.

mod lexer;
mod parser;

pub use parser::parse_program;
