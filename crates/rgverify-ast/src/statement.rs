//! Statement nodes and the index types that stand in for pointers between
//! them.
//!
//! The teacher crate's own AST (`logicaffeine_language::ast`) arena-allocates
//! every node behind a `bumpalo::Bump` and threads an `'a` lifetime through
//! the whole tree, because its nodes are genuinely self-referential and
//! outlive several compiler passes. Nothing here needs that: a back-reference
//! is always "the Nth statement of thread T", so a plain `Copy` pair of
//! `usize`s denotes it completely. [`Program`](crate::Program) owns every
//! [`StatementNode`] in flat, per-thread `Vec`s; [`StmtIdx`]/[`ThreadIdx`]
//! index into them.

use rgverify_oracle::{ArithTerm, Formula, Symbol};

/// Index of a thread within a [`Program`](crate::Program)'s thread list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadIdx(pub usize);

/// Index of a statement within a [`Thread`](crate::Thread)'s flat statement
/// storage. Not a program counter — see [`StatementNode::pc`] for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StmtIdx(pub usize);

/// Identifies one specific global-assignment statement: the unit of
/// interference tracked across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssignmentRef {
    pub thread: ThreadIdx,
    pub stmt: StmtIdx,
}

/// The kind of a statement and the data specific to it.
#[derive(Debug, Clone)]
pub enum StatementKind {
    Assignment { lhs: Symbol, rhs: ArithTerm },
    Assume(Formula),
    Assert(Formula),
    Conditional {
        cond: Formula,
        true_block: Vec<StmtIdx>,
        false_block: Vec<StmtIdx>,
    },
    /// Synthetic terminal node closing a thread's procedure. Carries no data
    /// of its own; `regenerate_proof` treats it as the identity transformer
    /// (`post = pre`), and the thread's final `pre` here is what the fixpoint
    /// driver conjoins into the derived program postcondition. Never produced
    /// by the parser directly — `Program` construction appends exactly one
    /// per thread, after the parsed body.
    Eof,
}

/// One node of a thread's control-flow graph, together with the mutable
/// proof-outline state the engine accumulates on it as it iterates towards a
/// fixpoint.
#[derive(Debug, Clone)]
pub struct StatementNode {
    pub kind: StatementKind,
    /// Program counter, unique within the owning thread, assigned in visit
    /// order by `rgverify-engine::cfg_init`. Only assignment statements'
    /// PCs are ever referenced by a formula, but every node gets one, to
    /// match the counter advancing once per CFG node regardless of kind.
    pub pc: i64,
    /// `sp`-derived range of PCs this thread may be at immediately after
    /// executing this statement, used to strengthen interference images.
    /// Meaningful only for `Assignment` nodes; left as `Formula::True` for
    /// every other kind.
    pub reachable_pcs: Formula,
    /// Other threads' global-assignment statements that can destabilise
    /// this statement's precondition.
    pub interfering: Vec<AssignmentRef>,
    /// The statement's precondition in the current proof outline. Starts
    /// at `Formula::False` and only ever weakens as regeneration proceeds.
    pub pre: Formula,
    /// Cached strongest postcondition of `pre` through this statement.
    pub post: Formula,
}

impl StatementNode {
    pub fn new(kind: StatementKind) -> Self {
        StatementNode {
            kind,
            pc: 0,
            reachable_pcs: Formula::True,
            interfering: Vec::new(),
            pre: Formula::False,
            post: Formula::False,
        }
    }

    pub fn is_assignment(&self) -> bool {
        matches!(self.kind, StatementKind::Assignment { .. })
    }

    /// Renders this single node (not its children) the way a proof outline
    /// prints a statement line, e.g. `3: x := x + 1;`.
    pub fn pretty(&self) -> String {
        match &self.kind {
            StatementKind::Assignment { lhs, rhs } => format!("{}: {lhs} := {rhs};", self.pc),
            StatementKind::Assume(cond) => format!("{}: assume {cond};", self.pc),
            StatementKind::Assert(cond) => format!("{}: assert {cond};", self.pc),
            StatementKind::Conditional { cond, .. } => format!("{}: if ({cond}) {{", self.pc),
            StatementKind::Eof => "<eof>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_assignment_true_only_for_assignment_kind() {
        let a = StatementNode::new(StatementKind::Assignment {
            lhs: Symbol::new("x"),
            rhs: ArithTerm::int(1),
        });
        assert!(a.is_assignment());
        let b = StatementNode::new(StatementKind::Eof);
        assert!(!b.is_assignment());
    }

    #[test]
    fn new_statement_starts_at_false_precondition() {
        let node = StatementNode::new(StatementKind::Assume(Formula::True));
        assert_eq!(node.pre.to_string(), "false");
        assert_eq!(node.post.to_string(), "false");
    }
}
