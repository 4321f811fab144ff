//! CFG Initialiser: the single pass that turns a freshly parsed
//! [`Program`] into one ready for proof regeneration — program counters,
//! reachable-PC formulas, global-assignment lists, interference sets and
//! inferred locals, in that order, per `SPEC_FULL.md` §4.3.

use std::collections::HashSet;

use rgverify_ast::{visit_order, AssignmentRef, Program, StatementKind, StmtIdx, Thread, ThreadIdx};
use rgverify_oracle::{CmpOp, Formula, Oracle, Symbol};

use crate::error::EngineResult;

/// Runs CFG initialisation over every thread of `program`, in place.
/// Must be called exactly once, before any proof regeneration.
pub fn cfg_init(program: &mut Program, oracle: &dyn Oracle) -> EngineResult<()> {
    for thread in &mut program.threads {
        assign_program_counters(thread);
        ReachabilityVisitor::new().run(thread);
    }

    let global_assigns: Vec<Vec<AssignmentRef>> = program
        .threads
        .iter()
        .enumerate()
        .map(|(i, thread)| collect_global_assignments(thread, ThreadIdx(i), &program.globals, oracle))
        .collect();

    for (i, thread) in program.threads.iter_mut().enumerate() {
        let interfering: Vec<AssignmentRef> = global_assigns
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .flat_map(|(_, assigns)| assigns.iter().copied())
            .collect();
        for &idx in &visit_order(thread) {
            thread.statement_mut(idx).interfering = interfering.clone();
        }
    }

    for thread in &mut program.threads {
        thread.locals = infer_locals(thread, &program.globals, oracle);
    }

    program.validate_names()?;
    Ok(())
}

/// Assigns PCs `1, 2, 3, …` in CFG visit order. The `Eof` node never
/// receives one — only statements reachable from `thread.body` are visited,
/// matching the original `recurse_cfg`, which never descends into a
/// procedure's `eof` attribute.
fn assign_program_counters(thread: &mut Thread) {
    for (pc, idx) in visit_order(thread).into_iter().enumerate() {
        thread.statement_mut(idx).pc = (pc + 1) as i64;
    }
}

/// One closed/half-open interval of program counters; `None` denotes an
/// open upper bound (+∞).
type Interval = (i64, Option<i64>);

/// Walks a thread's CFG tracking the ordered interval list described in
/// §4.3, attaching the encoded reachable-PC formula to every `Assignment`
/// node it visits.
struct ReachabilityVisitor {
    intervals: Vec<Interval>,
    branch_stack: Vec<i64>,
}

impl ReachabilityVisitor {
    fn new() -> Self {
        ReachabilityVisitor { intervals: vec![(1, None)], branch_stack: Vec::new() }
    }

    fn run(&mut self, thread: &mut Thread) {
        let body = thread.body.clone();
        self.visit_block(thread, &body);
    }

    fn visit_block(&mut self, thread: &mut Thread, block: &[StmtIdx]) {
        for &idx in block {
            let (is_split_conditional, true_block, false_block) = match &thread.statement(idx).kind {
                StatementKind::Conditional { true_block, false_block, .. } if !false_block.is_empty() => {
                    (true, true_block.clone(), false_block.clone())
                }
                StatementKind::Conditional { true_block, .. } => (false, true_block.clone(), Vec::new()),
                _ => (false, Vec::new(), Vec::new()),
            };

            if is_split_conditional {
                let max_true_pc = last_pc_in_block(thread, &true_block);
                let max_false_pc = last_pc_in_block(thread, &false_block);
                let (a, b) = self.intervals.remove(0);
                self.intervals.insert(0, (max_false_pc + 1, b));
                self.intervals.insert(0, (a + 1, Some(max_true_pc)));
                self.branch_stack.push(max_true_pc + 1);
                self.visit_block(thread, &true_block);
                self.visit_block(thread, &false_block);
                continue;
            }

            self.advance_plain(thread, idx);
            if !true_block.is_empty() {
                // Conditional with an empty false-block: treated as a plain
                // statement, then its one branch is visited in place.
                self.visit_block(thread, &true_block);
            }
        }
    }

    fn advance_plain(&mut self, thread: &mut Thread, idx: StmtIdx) {
        self.intervals[0].0 += 1;
        let mut end_of_block = false;
        if let (lo, Some(hi)) = self.intervals[0] {
            if lo > hi {
                self.intervals.remove(0);
                end_of_block = true;
            }
        }
        if thread.statement(idx).is_assignment() {
            let formula = intervals_to_formula(&self.intervals, &thread.pc_symbol);
            thread.statement_mut(idx).reachable_pcs = formula;
        }
        if end_of_block {
            if let Some(else_pc) = self.branch_stack.pop() {
                self.intervals[0].0 = else_pc;
            }
        }
    }
}

/// "Last PC in a block", recursing into a trailing conditional's own
/// non-empty branch (false preferred, else true) per §4.3.
fn last_pc_in_block(thread: &Thread, block: &[StmtIdx]) -> i64 {
    let last_idx = *block.last().expect("non-empty block");
    match &thread.statement(last_idx).kind {
        StatementKind::Conditional { true_block, false_block, .. } => {
            if !false_block.is_empty() {
                last_pc_in_block(thread, false_block)
            } else if !true_block.is_empty() {
                last_pc_in_block(thread, true_block)
            } else {
                thread.statement(last_idx).pc
            }
        }
        _ => thread.statement(last_idx).pc,
    }
}

fn intervals_to_formula(intervals: &[Interval], pc_symbol: &Symbol) -> Formula {
    let pc_term = rgverify_oracle::ArithTerm::var(pc_symbol.clone());
    Formula::or_all(intervals.iter().map(|&(a, b)| match b {
        None => Formula::cmp(CmpOp::Le, rgverify_oracle::ArithTerm::int(a), pc_term.clone()),
        Some(b) if b == a => Formula::cmp(CmpOp::Eq, pc_term.clone(), rgverify_oracle::ArithTerm::int(a)),
        Some(b) => Formula::cmp(CmpOp::Le, rgverify_oracle::ArithTerm::int(a), pc_term.clone())
            .and(Formula::cmp(CmpOp::Le, pc_term.clone(), rgverify_oracle::ArithTerm::int(b))),
    }))
}

fn collect_global_assignments(
    thread: &Thread,
    thread_idx: ThreadIdx,
    globals: &HashSet<Symbol>,
    oracle: &dyn Oracle,
) -> Vec<AssignmentRef> {
    visit_order(thread)
        .into_iter()
        .filter(|&idx| match &thread.statement(idx).kind {
            StatementKind::Assignment { lhs, .. } => globals.iter().any(|g| oracle.symbol_equal(lhs, g)),
            _ => false,
        })
        .map(|stmt| AssignmentRef { thread: thread_idx, stmt })
        .collect()
}

fn infer_locals(thread: &Thread, globals: &HashSet<Symbol>, oracle: &dyn Oracle) -> HashSet<Symbol> {
    let mut candidates = HashSet::new();
    for &idx in &visit_order(thread) {
        match &thread.statement(idx).kind {
            StatementKind::Assignment { lhs, rhs } => {
                candidates.insert(lhs.clone());
                candidates.extend(rhs.free_vars());
            }
            StatementKind::Assume(cond) | StatementKind::Assert(cond) => {
                candidates.extend(cond.free_vars());
            }
            StatementKind::Conditional { cond, .. } => {
                candidates.extend(cond.free_vars());
            }
            StatementKind::Eof => {}
        }
    }
    candidates.retain(|sym| !globals.iter().any(|g| oracle.symbol_equal(sym, g)));
    candidates
}
