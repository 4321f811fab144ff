//! Z3-backed [`Oracle`] implementation.
//!
//! Validity and satisfiability are the only queries handed to Z3: each is a
//! single fresh `Context`/`Solver` pair, the formula's negation (for
//! validity) or the formula itself (for satisfiability) asserted, and the
//! result read off `Solver::check`. This is the exact encode-and-check
//! pattern `logicaffeine_verify::solver::VerificationSession::verify` uses.
//! `qelim` and `simplify` never touch Z3 — see [`crate::rewrite`] for why.

use std::collections::HashMap;

use z3::ast::{Ast, Bool, Int};
use z3::{Config, Context, SatResult, Solver};

use crate::error::{OracleError, OracleResult};
use crate::formula::{CmpOp, Formula};
use crate::oracle_trait::Oracle;
use crate::rewrite::{qelim_formula, simplify_formula};
use crate::symbol::{self, Symbol};
use crate::term::ArithTerm;

/// An [`Oracle`] backed by a Z3 solver, with a fixed query timeout.
pub struct Z3Oracle {
    cfg: Config,
}

impl Z3Oracle {
    /// Builds an oracle with a 10-second solver timeout per query, matching
    /// the teacher crate's `Verifier::new` default.
    pub fn new() -> Self {
        let mut cfg = Config::new();
        cfg.set_param_value("timeout", "10000");
        Z3Oracle { cfg }
    }
}

impl Default for Z3Oracle {
    fn default() -> Self {
        Self::new()
    }
}

impl Oracle for Z3Oracle {
    fn fresh_symbol(&self, hint: &str) -> Symbol {
        symbol::fresh_symbol(hint)
    }

    fn is_valid(&self, formula: &Formula) -> OracleResult<bool> {
        let ctx = Context::new(&self.cfg);
        let solver = Solver::new(&ctx);
        let encoder = Encoder::new(&ctx);
        let assertion = encoder.encode_bool(formula);
        solver.assert(&assertion.not());
        match solver.check() {
            SatResult::Unsat => Ok(true),
            SatResult::Sat => Ok(false),
            SatResult::Unknown => Err(OracleError::SolverUnknown),
        }
    }

    fn is_sat(&self, formula: &Formula) -> OracleResult<bool> {
        let ctx = Context::new(&self.cfg);
        let solver = Solver::new(&ctx);
        let encoder = Encoder::new(&ctx);
        let assertion = encoder.encode_bool(formula);
        solver.assert(&assertion);
        match solver.check() {
            SatResult::Sat => Ok(true),
            SatResult::Unsat => Ok(false),
            SatResult::Unknown => Err(OracleError::SolverUnknown),
        }
    }

    fn qelim(&self, formula: &Formula) -> OracleResult<Formula> {
        let eliminated = qelim_formula(formula)?;
        Ok(simplify_formula(&eliminated))
    }

    fn simplify(&self, formula: &Formula) -> Formula {
        simplify_formula(formula)
    }
}

/// Converts [`Formula`]/[`ArithTerm`] into Z3 ASTs within one `Context`.
/// One-directional only, same as the teacher crate's own encoder: nothing in
/// this workspace ever needs to decode a Z3 AST back into a [`Formula`].
struct Encoder<'ctx> {
    ctx: &'ctx Context,
}

impl<'ctx> Encoder<'ctx> {
    fn new(ctx: &'ctx Context) -> Self {
        Encoder { ctx }
    }

    fn encode_int(&self, term: &ArithTerm) -> Int<'ctx> {
        match term {
            ArithTerm::Int(v) => Int::from_i64(self.ctx, *v),
            ArithTerm::Var(s) => Int::new_const(self.ctx, s.name()),
            ArithTerm::Neg(a) => self.encode_int(a).unary_minus(),
            ArithTerm::Add(a, b) => Int::add(self.ctx, &[&self.encode_int(a), &self.encode_int(b)]),
            ArithTerm::Sub(a, b) => Int::sub(self.ctx, &[&self.encode_int(a), &self.encode_int(b)]),
            ArithTerm::Mul(a, b) => Int::mul(self.ctx, &[&self.encode_int(a), &self.encode_int(b)]),
            ArithTerm::Div(a, b) => self.encode_int(a).div(&self.encode_int(b)),
        }
    }

    fn encode_bool(&self, formula: &Formula) -> Bool<'ctx> {
        match formula {
            Formula::True => Bool::from_bool(self.ctx, true),
            Formula::False => Bool::from_bool(self.ctx, false),
            Formula::Cmp(op, l, r) => {
                let (l, r) = (self.encode_int(l), self.encode_int(r));
                match op {
                    CmpOp::Lt => l.lt(&r),
                    CmpOp::Le => l.le(&r),
                    CmpOp::Gt => l.gt(&r),
                    CmpOp::Ge => l.ge(&r),
                    CmpOp::Eq => l._eq(&r),
                    CmpOp::Ne => l._eq(&r).not(),
                }
            }
            Formula::Not(a) => self.encode_bool(a).not(),
            Formula::And(parts) => {
                let encoded: Vec<Bool<'ctx>> = parts.iter().map(|p| self.encode_bool(p)).collect();
                let refs: Vec<&Bool<'ctx>> = encoded.iter().collect();
                Bool::and(self.ctx, &refs)
            }
            Formula::Or(parts) => {
                let encoded: Vec<Bool<'ctx>> = parts.iter().map(|p| self.encode_bool(p)).collect();
                let refs: Vec<&Bool<'ctx>> = encoded.iter().collect();
                Bool::or(self.ctx, &refs)
            }
            Formula::Implies(a, b) => self.encode_bool(a).implies(&self.encode_bool(b)),
            Formula::Exists(vars, body) => {
                let bound: Vec<Int<'ctx>> = vars.iter().map(|v| Int::new_const(self.ctx, v.name())).collect();
                let bound_refs: Vec<&dyn Ast> = bound.iter().map(|b| b as &dyn Ast).collect();
                z3::ast::exists_const(self.ctx, &bound_refs, &[], &self.encode_bool(body))
            }
            Formula::ForAll(vars, body) => {
                let bound: Vec<Int<'ctx>> = vars.iter().map(|v| Int::new_const(self.ctx, v.name())).collect();
                let bound_refs: Vec<&dyn Ast> = bound.iter().map(|b| b as &dyn Ast).collect();
                z3::ast::forall_const(self.ctx, &bound_refs, &[], &self.encode_bool(body))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Symbol {
        Symbol::new(name)
    }

    #[test]
    fn is_valid_accepts_tautology() {
        let oracle = Z3Oracle::new();
        let x = sym("x");
        let f = Formula::cmp(CmpOp::Ge, ArithTerm::var(x.clone()), ArithTerm::var(x)).or(Formula::False);
        assert!(oracle.is_valid(&f).unwrap());
    }

    #[test]
    fn is_valid_rejects_contingent_formula() {
        let oracle = Z3Oracle::new();
        let x = sym("x");
        let f = Formula::cmp(CmpOp::Gt, ArithTerm::var(x), ArithTerm::int(0));
        assert!(!oracle.is_valid(&f).unwrap());
    }

    #[test]
    fn is_sat_detects_contradiction() {
        let oracle = Z3Oracle::new();
        let x = sym("x");
        let f = Formula::cmp(CmpOp::Lt, ArithTerm::var(x.clone()), ArithTerm::int(0))
            .and(Formula::cmp(CmpOp::Gt, ArithTerm::var(x), ArithTerm::int(10)));
        assert!(!oracle.is_sat(&f).unwrap());
    }

    #[test]
    fn symbol_equal_uses_solver_for_semantic_identity() {
        let oracle = Z3Oracle::new();
        let x = sym("x");
        assert!(oracle.symbol_equal(&x, &x));
    }
}
