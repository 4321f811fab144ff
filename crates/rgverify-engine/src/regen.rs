//! Proof regeneration: `SPEC_FULL.md` §4.5's per-statement algorithm, driven
//! sequentially over a thread's CFG.

use std::collections::HashSet;

use rgverify_ast::{Program, StatementKind, StmtIdx};
use rgverify_oracle::{Formula, Oracle, Symbol};

use crate::error::EngineResult;
use crate::sp::{self, InterferingAssignment};

/// Regenerates every statement of `block` in order, threading each
/// statement's post as the next statement's incoming precondition, and
/// returns the post of the block's last statement (or `incoming` unchanged
/// if the block is empty).
pub fn regenerate_block(
    program: &mut Program,
    thread: usize,
    block: &[StmtIdx],
    mut incoming: Formula,
    oracle: &dyn Oracle,
) -> EngineResult<Formula> {
    for &idx in block {
        incoming = regenerate_statement(program, thread, idx, incoming, oracle)?;
    }
    Ok(incoming)
}

/// Runs the full regeneration algorithm for one statement and returns its
/// (possibly freshly recomputed) postcondition.
pub fn regenerate_statement(
    program: &mut Program,
    thread: usize,
    idx: StmtIdx,
    incoming_pre: Formula,
    oracle: &dyn Oracle,
) -> EngineResult<Formula> {
    let mut dirty = false;
    let mut pre = program.threads[thread].statement(idx).pre.clone();

    // 1. Absorb incoming.
    if oracle.is_sat(&incoming_pre.clone().and(pre.clone().not()))? {
        let widened = oracle.simplify(pre.clone().or(incoming_pre));
        debug_assert!(
            oracle.is_valid(&pre.clone().implies(widened.clone())).unwrap_or(true),
            "precondition update must weaken, never strengthen"
        );
        pre = widened;
        dirty = true;
    }

    // 2. Stabilise against interference, one pass.
    let interfering = program.threads[thread].statement(idx).interfering.clone();
    for a in interfering {
        let info = read_interfering_assignment(program, a.thread.0, a.stmt);
        let image = sp::compute_sp_interfere(&info.borrow(), &pre, oracle)?;
        if oracle.is_sat(&image.clone().and(pre.clone().not()))? {
            let widened = oracle.simplify(pre.clone().or(image));
            debug_assert!(
                oracle.is_valid(&pre.clone().implies(widened.clone())).unwrap_or(true),
                "interference stabilisation must weaken, never strengthen"
            );
            pre = widened;
            dirty = true;
        }
    }

    program.threads[thread].statement_mut(idx).pre = pre.clone();

    let kind = program.threads[thread].statement(idx).kind.clone();
    let post = match kind {
        StatementKind::Conditional { cond, true_block, false_block } => {
            // 3. Always recurse into both branches, regardless of `dirty`.
            let true_post = regenerate_block(program, thread, &true_block, pre.clone().and(cond.clone()), oracle)?;
            let false_post = regenerate_block(program, thread, &false_block, pre.clone().and(cond.not()), oracle)?;
            sp::sp_conditional(true_post, false_post)
        }
        StatementKind::Assignment { lhs, rhs } if dirty => sp::sp_assignment(&lhs, &rhs, &pre, oracle)?,
        StatementKind::Assume(cond) if dirty => sp::sp_assume(&cond, &pre),
        StatementKind::Assert(cond) if dirty => sp::sp_assert(&cond, &pre),
        StatementKind::Eof if dirty => sp::sp_eof(&pre),
        _ => program.threads[thread].statement(idx).post.clone(),
    };

    program.threads[thread].statement_mut(idx).post = post.clone();
    if dirty {
        program.threads[thread].fixpoint_reached = false;
    }
    Ok(post)
}

/// Snapshots everything [`sp::compute_sp_interfere`] needs about an
/// assignment statement in another thread, so the borrow on `program` ends
/// before the caller mutates the statement under regeneration.
pub(crate) fn read_interfering_assignment(program: &Program, owner_thread: usize, stmt: StmtIdx) -> OwnedInterferingAssignment {
    let owner = &program.threads[owner_thread];
    let node = owner.statement(stmt);
    let (lhs, rhs) = match &node.kind {
        StatementKind::Assignment { lhs, rhs } => (lhs.clone(), rhs.clone()),
        other => unreachable!("interference set may only reference assignments, found {other:?}"),
    };
    OwnedInterferingAssignment {
        lhs,
        rhs,
        pre: node.pre.clone(),
        pc: node.pc,
        reachable_pcs: node.reachable_pcs.clone(),
        owner_pc_symbol: owner.pc_symbol.clone(),
        owner_locals: owner.locals.clone(),
    }
}

pub(crate) struct OwnedInterferingAssignment {
    lhs: Symbol,
    rhs: rgverify_oracle::ArithTerm,
    pre: Formula,
    pc: i64,
    reachable_pcs: Formula,
    owner_pc_symbol: Symbol,
    owner_locals: HashSet<Symbol>,
}

impl OwnedInterferingAssignment {
    pub(crate) fn borrow(&self) -> InterferingAssignment<'_> {
        InterferingAssignment {
            lhs: &self.lhs,
            rhs: &self.rhs,
            pre: &self.pre,
            pc: self.pc,
            reachable_pcs: &self.reachable_pcs,
            owner_pc_symbol: &self.owner_pc_symbol,
            owner_locals: &self.owner_locals,
        }
    }
}

