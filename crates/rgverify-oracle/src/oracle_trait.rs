//! The formula oracle contract.
//!
//! The engine crate depends only on this trait, never on a concrete solver
//! backend, so that the proof engine's correctness never hinges on exactly
//! how validity/satisfiability/quantifier-elimination are implemented.

use crate::error::OracleResult;
use crate::formula::{CmpOp, Formula};
use crate::symbol::Symbol;
use crate::term::ArithTerm;
use std::collections::{HashMap, HashSet};

/// Thin contract over an SMT solver, specialised to linear integer
/// arithmetic, that the proof engine builds proofs on top of.
pub trait Oracle {
    /// Mints a symbol unique within the run.
    fn fresh_symbol(&self, hint: &str) -> Symbol;

    /// Capture-free substitution. The default implementation is purely
    /// structural and needs no solver call.
    fn substitute(&self, formula: &Formula, subst: &HashMap<Symbol, ArithTerm>) -> Formula {
        formula.substitute(subst)
    }

    /// Free variables of a formula. Purely structural.
    fn free_vars(&self, formula: &Formula) -> HashSet<Symbol> {
        formula.free_vars()
    }

    /// `true` iff `formula` holds under every assignment to its free
    /// variables. Must terminate on quantifier-free linear integer formulas.
    fn is_valid(&self, formula: &Formula) -> OracleResult<bool>;

    /// `true` iff some assignment to `formula`'s free variables satisfies
    /// it. Must terminate on quantifier-free linear integer formulas.
    fn is_sat(&self, formula: &Formula) -> OracleResult<bool>;

    /// Eliminates every quantifier from `formula`, returning an equivalent
    /// quantifier-free formula. Must succeed for any formula produced by
    /// this workspace's SP/interference transformers; failing on such input
    /// is a fatal, reportable [`OracleError`](crate::error::OracleError).
    fn qelim(&self, formula: &Formula) -> OracleResult<Formula>;

    /// Semantics-preserving, idempotent rewriter.
    fn simplify(&self, formula: &Formula) -> Formula;

    /// The only legal way to ask whether two symbols denote the same
    /// program variable: `is_valid(a == b)`.
    fn symbol_equal(&self, a: &Symbol, b: &Symbol) -> bool {
        self.is_valid(&Formula::cmp(CmpOp::Eq, ArithTerm::var(a.clone()), ArithTerm::var(b.clone())))
            .unwrap_or(false)
    }
}
