//! Strongest-postcondition transformers: per `SPEC_FULL.md` §4.4, one
//! function per statement kind, plus the interference transformer used only
//! by assignments.

use std::collections::{HashMap, HashSet};

use rgverify_oracle::{ArithTerm, Formula, Oracle, Symbol};

use crate::error::EngineResult;

/// `sp(x := E, P) = ∃y · x = E[x←y] ∧ P[x←y]`, quantifier-eliminated and
/// simplified.
pub fn sp_assignment(lhs: &Symbol, rhs: &ArithTerm, pre: &Formula, oracle: &dyn Oracle) -> EngineResult<Formula> {
    let y = oracle.fresh_symbol(lhs.name());
    let mut subst = HashMap::new();
    subst.insert(lhs.clone(), ArithTerm::var(y.clone()));

    let lhs_eq_rhs = Formula::eq(ArithTerm::var(lhs.clone()), rhs.substitute(&subst));
    let pre_shifted = pre.substitute(&subst);
    let existential = Formula::exists(vec![y], lhs_eq_rhs.and(pre_shifted));

    let eliminated = oracle.qelim(&existential)?;
    Ok(oracle.simplify(&eliminated))
}

/// `sp(assume E, P) = P ∧ E`.
pub fn sp_assume(cond: &Formula, pre: &Formula) -> Formula {
    pre.clone().and(cond.clone())
}

/// `sp(assert E, P) = E ⇒ P`.
pub fn sp_assert(cond: &Formula, pre: &Formula) -> Formula {
    cond.clone().implies(pre.clone())
}

/// `sp(if B then S, P) = (¬B ∧ P) ∨ block_sp`, where `block_sp` is already
/// the post computed by recursing into whichever branch ran.
pub fn sp_conditional(true_block_post: Formula, false_block_post: Formula) -> Formula {
    true_block_post.or(false_block_post)
}

/// `Eof` is the identity transformer: its postcondition is its precondition.
pub fn sp_eof(pre: &Formula) -> Formula {
    pre.clone()
}

/// Everything `compute_sp_interfere` needs to know about the assignment `a`
/// and the thread that owns it, gathered up front so the caller need not
/// hold a borrow of the whole [`Program`](rgverify_ast::Program) while this
/// runs.
pub struct InterferingAssignment<'a> {
    pub lhs: &'a Symbol,
    pub rhs: &'a ArithTerm,
    /// `a`'s own precondition (`P` in the spec's notation).
    pub pre: &'a Formula,
    pub pc: i64,
    pub reachable_pcs: &'a Formula,
    pub owner_pc_symbol: &'a Symbol,
    pub owner_locals: &'a HashSet<Symbol>,
}

/// `sp_interfere(x := E, A) = (∃y, L, pc · x = E[x←y] ∧ A[x←y] ∧ pc = k) ∧ R`,
/// where `A = a.pre ∧ env_pred` (`env_pred` is the target statement's own
/// current precondition, `Q` in the spec).
pub fn compute_sp_interfere(a: &InterferingAssignment<'_>, env_pred: &Formula, oracle: &dyn Oracle) -> EngineResult<Formula> {
    let y = oracle.fresh_symbol(a.lhs.name());
    let mut subst = HashMap::new();
    subst.insert(a.lhs.clone(), ArithTerm::var(y.clone()));

    let joint_pre = a.pre.clone().and(env_pred.clone());
    let lhs_eq_rhs = Formula::eq(ArithTerm::var(a.lhs.clone()), a.rhs.substitute(&subst));
    let joint_shifted = joint_pre.substitute(&subst);
    let pc_anchor = Formula::eq(ArithTerm::var(a.owner_pc_symbol.clone()), ArithTerm::int(a.pc));

    let mut quantified_vars = vec![y];
    quantified_vars.extend(a.owner_locals.iter().cloned());
    quantified_vars.push(a.owner_pc_symbol.clone());

    let body = lhs_eq_rhs.and(joint_shifted).and(pc_anchor);
    let existential = Formula::exists(quantified_vars, body);

    let eliminated = oracle.qelim(&existential)?;
    let simplified = oracle.simplify(&eliminated);
    Ok(simplified.and(a.reachable_pcs.clone()))
}
