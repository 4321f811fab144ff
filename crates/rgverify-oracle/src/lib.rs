//! The formula oracle: symbolic terms and formulas over integer variables,
//! and the solver-backed operations (validity, satisfiability, quantifier
//! elimination, simplification) the proof engine builds on.
//!
//! This crate has zero dependency on the AST/CFG model in `rgverify-ast` —
//! it only ever sees [`Formula`]/[`ArithTerm`], never a program statement.
//! `rgverify-engine` is the only place the two meet.

pub mod error;
pub mod formula;
pub mod oracle_trait;
pub mod rewrite;
pub mod symbol;
pub mod term;
pub mod z3_oracle;

pub use error::{OracleError, OracleResult};
pub use formula::{CmpOp, Formula};
pub use oracle_trait::Oracle;
pub use symbol::{fresh_symbol, Symbol};
pub use term::ArithTerm;
pub use z3_oracle::Z3Oracle;
