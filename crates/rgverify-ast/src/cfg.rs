//! Control-flow graph traversal.
//!
//! Every pass that needs to visit a thread's statements in CFG order
//! (program-counter assignment, reachable-PC interval computation, global
//! assignment gathering) walks a conditional's own node before descending
//! into its `true_block`, then its `false_block` — matching the original
//! verifier's `recurse_cfg`, which calls `function(node)` on a `Conditional`
//! itself before recursing into either branch.

use crate::statement::{StatementKind, StmtIdx};
use crate::Thread;

/// Returns every statement of `thread` in CFG visit order: a conditional is
/// listed before the statements of its `true_block`, which are listed
/// before those of its `false_block`.
pub fn visit_order(thread: &Thread) -> Vec<StmtIdx> {
    let mut out = Vec::with_capacity(thread.statements.len());
    visit_block(thread, &thread.body, &mut out);
    out
}

fn visit_block(thread: &Thread, block: &[StmtIdx], out: &mut Vec<StmtIdx>) {
    for &idx in block {
        out.push(idx);
        if let StatementKind::Conditional { true_block, false_block, .. } = &thread.statement(idx).kind {
            visit_block(thread, true_block, out);
            visit_block(thread, false_block, out);
        }
    }
}
