//! Errors raised by the formula oracle.
//!
//! An [`OracleError`] always indicates a fatal, internal problem — never a
//! property of the program under verification. A well-formed but unprovable
//! program is a *verification failure*, reported as a verdict by
//! `rgverify-engine`, not an `OracleError`.

use crate::symbol::Symbol;
use std::fmt;

#[derive(Debug, Clone)]
pub enum OracleError {
    /// `qelim` could not eliminate every quantifier from a formula the
    /// engine produced. Per the data model, this is a fatal internal bug:
    /// the engine only ever asks the oracle to eliminate quantifiers over
    /// formulas within the linear-integer-arithmetic fragment it generates.
    QelimIncomplete { remaining: Vec<Symbol> },
    /// The underlying solver reported `unknown` rather than sat/unsat.
    SolverUnknown,
    /// The underlying solver failed for a reason unrelated to the formula's
    /// satisfiability (e.g. a configuration problem).
    SolverError(String),
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleError::QelimIncomplete { remaining } => {
                let names: Vec<&str> = remaining.iter().map(|s| s.name()).collect();
                write!(
                    f,
                    "quantifier elimination could not eliminate: {}. this indicates the engine \
                     produced a formula outside the fragment the oracle supports, which is an \
                     internal bug",
                    names.join(", ")
                )
            }
            OracleError::SolverUnknown => {
                write!(f, "the solver returned 'unknown' for a query the engine expected to decide")
            }
            OracleError::SolverError(msg) => write!(f, "solver error: {msg}"),
        }
    }
}

impl std::error::Error for OracleError {}

pub type OracleResult<T> = Result<T, OracleError>;
