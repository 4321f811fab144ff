//! Native term rewriting for [`simplify`](crate::Oracle::simplify) and
//! [`qelim`](crate::Oracle::qelim).
//!
//! `predicate_simplifier.py` in the original implementation sketches, but
//! never finishes, a recipe for eliminating existential quantifiers without
//! calling out to an SMT tactic: convert to disjunctive normal form,
//! distribute the quantifier over each disjunct, drop bound variables that
//! turn out unused, derive a contiguous range `[lo, hi]` for each remaining
//! bound variable from its atoms, and apply an interval-aware one-point
//! rule. This module is that recipe, finished, because it is sound and
//! complete for exactly the shapes this workspace's SP and interference
//! transformers generate: a defining equality for the assignment's fresh
//! variable and the owner thread's `pc` symbol, and a closed or one-sided
//! range for each existentially-hidden local. Anything outside that
//! fragment (for example a bound variable compared with `!=` and no
//! equality elsewhere in the same clause, or one genuinely tied down by two
//! independent lower bounds) is reported as
//! [`OracleError::QelimIncomplete`](crate::error::OracleError::QelimIncomplete)
//! rather than guessed at.

use crate::error::{OracleError, OracleResult};
use crate::formula::{CmpOp, Formula};
use crate::symbol::Symbol;
use crate::term::ArithTerm;
use std::collections::HashMap;

// ---------------------------------------------------------------------
// simplify
// ---------------------------------------------------------------------

pub fn simplify_term(t: &ArithTerm) -> ArithTerm {
    match t {
        ArithTerm::Int(v) => ArithTerm::Int(*v),
        ArithTerm::Var(s) => ArithTerm::Var(s.clone()),
        ArithTerm::Neg(a) => match simplify_term(a) {
            ArithTerm::Int(v) => ArithTerm::Int(-v),
            ArithTerm::Neg(inner) => *inner,
            other => ArithTerm::Neg(Box::new(other)),
        },
        ArithTerm::Add(a, b) => {
            let (a, b) = (simplify_term(a), simplify_term(b));
            match (&a, &b) {
                (ArithTerm::Int(x), ArithTerm::Int(y)) => ArithTerm::Int(x + y),
                (ArithTerm::Int(0), _) => b,
                (_, ArithTerm::Int(0)) => a,
                _ => a.add(b),
            }
        }
        ArithTerm::Sub(a, b) => {
            let (a, b) = (simplify_term(a), simplify_term(b));
            match (&a, &b) {
                (ArithTerm::Int(x), ArithTerm::Int(y)) => ArithTerm::Int(x - y),
                (_, ArithTerm::Int(0)) => a,
                _ => a.sub(b),
            }
        }
        ArithTerm::Mul(a, b) => {
            let (a, b) = (simplify_term(a), simplify_term(b));
            match (&a, &b) {
                (ArithTerm::Int(x), ArithTerm::Int(y)) => ArithTerm::Int(x * y),
                (ArithTerm::Int(0), _) | (_, ArithTerm::Int(0)) => ArithTerm::Int(0),
                (ArithTerm::Int(1), _) => b,
                (_, ArithTerm::Int(1)) => a,
                _ => a.mul(b),
            }
        }
        ArithTerm::Div(a, b) => {
            let (a, b) = (simplify_term(a), simplify_term(b));
            match (&a, &b) {
                (ArithTerm::Int(x), ArithTerm::Int(y)) if *y != 0 => ArithTerm::Int(x / y),
                (_, ArithTerm::Int(1)) => a,
                _ => a.div(b),
            }
        }
    }
}

/// Semantics-preserving, idempotent simplification: constant folding plus
/// the standard boolean absorption/identity laws, and dropping of bound
/// variables that no longer occur free in their body (`predicate_simplifier.py`'s
/// "eliminate redundant bound vars" step).
pub fn simplify_formula(f: &Formula) -> Formula {
    match f {
        Formula::True => Formula::True,
        Formula::False => Formula::False,
        Formula::Cmp(op, l, r) => {
            let (l, r) = (simplify_term(l), simplify_term(r));
            if let (Some(lv), Some(rv)) = (l.eval_ground(), r.eval_ground()) {
                let truth = match op {
                    CmpOp::Lt => lv < rv,
                    CmpOp::Le => lv <= rv,
                    CmpOp::Gt => lv > rv,
                    CmpOp::Ge => lv >= rv,
                    CmpOp::Eq => lv == rv,
                    CmpOp::Ne => lv != rv,
                };
                if truth {
                    Formula::True
                } else {
                    Formula::False
                }
            } else {
                Formula::Cmp(*op, l, r)
            }
        }
        Formula::Not(a) => match simplify_formula(a) {
            Formula::True => Formula::False,
            Formula::False => Formula::True,
            Formula::Not(inner) => *inner,
            Formula::Cmp(op, l, r) => Formula::Cmp(op.negate(), l, r),
            other => Formula::Not(Box::new(other)),
        },
        Formula::And(parts) => {
            let mut out = Vec::new();
            for p in parts {
                match simplify_formula(p) {
                    Formula::True => {}
                    Formula::False => return Formula::False,
                    Formula::And(inner) => out.extend(inner),
                    other => out.push(other),
                }
            }
            match out.len() {
                0 => Formula::True,
                1 => out.into_iter().next().unwrap(),
                _ => Formula::And(out),
            }
        }
        Formula::Or(parts) => {
            let mut out = Vec::new();
            for p in parts {
                match simplify_formula(p) {
                    Formula::False => {}
                    Formula::True => return Formula::True,
                    Formula::Or(inner) => out.extend(inner),
                    other => out.push(other),
                }
            }
            match out.len() {
                0 => Formula::False,
                1 => out.into_iter().next().unwrap(),
                _ => Formula::Or(out),
            }
        }
        Formula::Implies(a, b) => {
            let a = simplify_formula(a);
            let b = simplify_formula(b);
            match (&a, &b) {
                (Formula::False, _) | (_, Formula::True) => Formula::True,
                (Formula::True, _) => b,
                _ => Formula::Implies(Box::new(a), Box::new(b)),
            }
        }
        Formula::Exists(vars, body) => {
            let body = simplify_formula(body);
            let fv = body.free_vars();
            let remaining: Vec<Symbol> = vars.iter().filter(|v| fv.contains(*v)).cloned().collect();
            Formula::exists(remaining, body)
        }
        Formula::ForAll(vars, body) => {
            let body = simplify_formula(body);
            let fv = body.free_vars();
            let remaining: Vec<Symbol> = vars.iter().filter(|v| fv.contains(*v)).cloned().collect();
            Formula::forall(remaining, body)
        }
    }
}

// ---------------------------------------------------------------------
// quantifier elimination
// ---------------------------------------------------------------------

fn to_nnf(f: &Formula) -> Formula {
    match f {
        Formula::True | Formula::False | Formula::Cmp(..) => f.clone(),
        Formula::Not(inner) => negate_nnf(inner),
        Formula::And(parts) => Formula::And(parts.iter().map(to_nnf).collect()),
        Formula::Or(parts) => Formula::Or(parts.iter().map(to_nnf).collect()),
        Formula::Implies(a, b) => Formula::Or(vec![negate_nnf(a), to_nnf(b)]),
        Formula::Exists(vars, body) => Formula::Exists(vars.clone(), Box::new(to_nnf(body))),
        Formula::ForAll(vars, body) => Formula::ForAll(vars.clone(), Box::new(to_nnf(body))),
    }
}

fn negate_nnf(f: &Formula) -> Formula {
    match f {
        Formula::True => Formula::False,
        Formula::False => Formula::True,
        Formula::Cmp(op, l, r) => Formula::Cmp(op.negate(), l.clone(), r.clone()),
        Formula::Not(inner) => to_nnf(inner),
        Formula::And(parts) => Formula::Or(parts.iter().map(negate_nnf).collect()),
        Formula::Or(parts) => Formula::And(parts.iter().map(negate_nnf).collect()),
        Formula::Implies(a, b) => Formula::And(vec![to_nnf(a), negate_nnf(b)]),
        Formula::Exists(vars, body) => Formula::ForAll(vars.clone(), Box::new(negate_nnf(body))),
        Formula::ForAll(vars, body) => Formula::Exists(vars.clone(), Box::new(negate_nnf(body))),
    }
}

/// Disjunctive normal form of a negation-normal-form formula, as a list of
/// conjunctive clauses (each a list of literals). Nodes this function
/// cannot decompose further (a nested, still-quantified sub-formula) are
/// kept as opaque literals — safe, since `eliminate_var_from_atoms` will
/// reject eliminating a variable through one of those rather than mishandle
/// it.
fn to_dnf(f: &Formula) -> Vec<Vec<Formula>> {
    match f {
        Formula::Or(parts) => parts.iter().flat_map(to_dnf).collect(),
        Formula::And(parts) => {
            let mut acc = vec![Vec::new()];
            for part in parts {
                let part_dnf = to_dnf(part);
                let mut next = Vec::with_capacity(acc.len() * part_dnf.len().max(1));
                for clause in &acc {
                    for pclause in &part_dnf {
                        let mut merged = clause.clone();
                        merged.extend(pclause.iter().cloned());
                        next.push(merged);
                    }
                }
                acc = next;
            }
            acc
        }
        Formula::True => vec![vec![]],
        Formula::False => vec![],
        other => vec![vec![other.clone()]],
    }
}

/// Removes every atom mentioning `v` from `atoms`, using a defining
/// equality if one is present (one-point rule) or, failing that, a
/// contiguous `[lo, hi]` range derived from the remaining comparison atoms.
fn eliminate_var_from_atoms(v: &Symbol, atoms: Vec<Formula>) -> OracleResult<Vec<Formula>> {
    let mut rest = Vec::new();
    let mut mentioning = Vec::new();
    for a in atoms {
        if a.free_vars().contains(v) {
            mentioning.push(a);
        } else {
            rest.push(a);
        }
    }
    if mentioning.is_empty() {
        return Ok(rest);
    }

    let incomplete = || OracleError::QelimIncomplete {
        remaining: vec![v.clone()],
    };

    // Normalise every atom mentioning `v` into `v <op> bound`.
    let mut eq_term: Option<ArithTerm> = None;
    let mut bounds: Vec<(CmpOp, ArithTerm)> = Vec::new();
    for atom in &mentioning {
        let (op, l, r) = match atom {
            Formula::Cmp(op, l, r) => (*op, l, r),
            _ => return Err(incomplete()),
        };
        let diff = l.clone().sub(r.clone());
        let (coeff, rem) = diff.linear_coeff(v).ok_or_else(incomplete)?;
        if coeff == 0 {
            // `v` cancelled out algebraically; the atom doesn't actually
            // constrain it.
            rest.push(atom.clone());
            continue;
        }
        let bound = rem.neg().div(ArithTerm::Int(coeff));
        let op = if coeff > 0 { op } else { op.flip_operands() };
        if op == CmpOp::Eq {
            eq_term = Some(bound);
        } else {
            bounds.push((op, bound));
        }
    }

    if let Some(term) = eq_term {
        let mut subst = HashMap::new();
        subst.insert(v.clone(), term);
        rest.extend(mentioning.iter().map(|a| a.substitute(&subst)));
        return Ok(rest);
    }

    let mut lower: Option<ArithTerm> = None;
    let mut upper: Option<ArithTerm> = None;
    for (op, bound) in bounds {
        match op {
            CmpOp::Ge if lower.is_none() => lower = Some(bound),
            CmpOp::Gt if lower.is_none() => lower = Some(bound.add(ArithTerm::Int(1))),
            CmpOp::Le if upper.is_none() => upper = Some(bound),
            CmpOp::Lt if upper.is_none() => upper = Some(bound.sub(ArithTerm::Int(1))),
            // A second independent bound on the same side, or a `!=`
            // constraint with no defining equality elsewhere: genuinely
            // needs disjunctive case-splitting this recipe does not
            // perform.
            _ => return Err(incomplete()),
        }
    }

    match (lower, upper) {
        (Some(lo), Some(hi)) => rest.push(Formula::cmp(CmpOp::Le, lo, hi)),
        // Bounded on one side only: always satisfiable for an unbounded
        // integer, so the quantifier vanishes with no residual constraint.
        (Some(_), None) | (None, Some(_)) => {}
        (None, None) => unreachable!("mentioning is non-empty and every atom is Eq, a bound, or an error"),
    }
    Ok(rest)
}

fn eliminate_exists(vars: &[Symbol], body: &Formula) -> OracleResult<Formula> {
    let nnf_body = to_nnf(body);
    let clauses = to_dnf(&nnf_body);
    let mut processed = Vec::with_capacity(clauses.len());
    for clause in clauses {
        let mut atoms = clause;
        for v in vars {
            atoms = eliminate_var_from_atoms(v, atoms)?;
        }
        processed.push(Formula::and_all(atoms));
    }
    Ok(simplify_formula(&Formula::or_all(processed)))
}

/// Eliminates every quantifier in `formula`, innermost first.
pub fn qelim_formula(formula: &Formula) -> OracleResult<Formula> {
    match formula {
        Formula::True | Formula::False | Formula::Cmp(..) => Ok(formula.clone()),
        Formula::Not(a) => Ok(Formula::Not(Box::new(qelim_formula(a)?))),
        Formula::And(parts) => Ok(Formula::And(
            parts.iter().map(qelim_formula).collect::<OracleResult<Vec<_>>>()?,
        )),
        Formula::Or(parts) => Ok(Formula::Or(
            parts.iter().map(qelim_formula).collect::<OracleResult<Vec<_>>>()?,
        )),
        Formula::Implies(a, b) => Ok(Formula::Implies(
            Box::new(qelim_formula(a)?),
            Box::new(qelim_formula(b)?),
        )),
        Formula::Exists(vars, body) => {
            let inner = qelim_formula(body)?;
            eliminate_exists(vars, &inner)
        }
        Formula::ForAll(vars, body) => {
            let negated = Formula::Not(Box::new((**body).clone()));
            let inner = qelim_formula(&negated)?;
            let eliminated = eliminate_exists(vars, &inner)?;
            Ok(simplify_formula(&Formula::Not(Box::new(eliminated))))
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
    fn simplify_term_folds_constants() {
        let t = ArithTerm::int(2).add(ArithTerm::int(3)).mul(ArithTerm::int(1));
        assert_eq!(simplify_term(&t).eval_ground(), Some(5));
    }

    #[test]
    fn simplify_formula_drops_true_conjuncts() {
        let x = sym("x");
        let f = Formula::And(vec![
            Formula::True,
            Formula::cmp(CmpOp::Eq, ArithTerm::var(x.clone()), ArithTerm::int(1)),
        ]);
        let simplified = simplify_formula(&f);
        assert_eq!(simplified.to_string(), "x == 1");
    }

    #[test]
    fn qelim_one_point_rule_substitutes_defining_equality() {
        // exists y . x == y + 1 && y == 2  ==>  x == 3
        let x = sym("x");
        let y = sym("y");
        let body = Formula::And(vec![
            Formula::cmp(CmpOp::Eq, ArithTerm::var(x.clone()), ArithTerm::var(y.clone()).add(ArithTerm::int(1))),
            Formula::cmp(CmpOp::Eq, ArithTerm::var(y.clone()), ArithTerm::int(2)),
        ]);
        let quantified = Formula::exists(vec![y], body);
        let eliminated = qelim_formula(&quantified).unwrap();
        assert!(eliminated.is_quantifier_free());
        let simplified = simplify_formula(&eliminated);
        assert_eq!(simplified.to_string(), "x == 3");
    }

    #[test]
    fn qelim_range_elimination_drops_bounded_local() {
        // exists y . y >= 0 && y <= 5 && x == y  -- not a pure range case
        // since x==y is itself an equality defining y; check the pure-range
        // path instead: exists y . y >= 0 && y <= 5  ==> 0 <= 5 (true)
        let y = sym("y");
        let body = Formula::And(vec![
            Formula::cmp(CmpOp::Ge, ArithTerm::var(y.clone()), ArithTerm::int(0)),
            Formula::cmp(CmpOp::Le, ArithTerm::var(y.clone()), ArithTerm::int(5)),
        ]);
        let quantified = Formula::exists(vec![y], body);
        let eliminated = qelim_formula(&quantified).unwrap();
        assert!(eliminated.is_quantifier_free());
        assert_eq!(simplify_formula(&eliminated).to_string(), "true");
    }

    #[test]
    fn qelim_one_sided_bound_vanishes() {
        let y = sym("y");
        let body = Formula::cmp(CmpOp::Ge, ArithTerm::var(y.clone()), ArithTerm::int(0));
        let quantified = Formula::exists(vec![y], body);
        let eliminated = qelim_formula(&quantified).unwrap();
        assert_eq!(simplify_formula(&eliminated).to_string(), "true");
    }

    #[test]
    fn qelim_reports_incomplete_for_unsupported_shape() {
        let y = sym("y");
        // exists y . y != 3, with nothing else constraining y: not in the
        // supported fragment (no defining equality, and `!=` is not a
        // one-sided range bound).
        let body = Formula::cmp(CmpOp::Ne, ArithTerm::var(y.clone()), ArithTerm::int(3));
        let quantified = Formula::exists(vec![y], body);
        assert!(qelim_formula(&quantified).is_err());
    }

    #[test]
    fn unused_bound_variable_is_dropped() {
        let x = sym("x");
        let y = sym("y");
        let body = Formula::cmp(CmpOp::Eq, ArithTerm::var(x.clone()), ArithTerm::int(1));
        let quantified = Formula::exists(vec![y], body);
        let eliminated = qelim_formula(&quantified).unwrap();
        assert_eq!(eliminated.to_string(), "x == 1");
    }
}
