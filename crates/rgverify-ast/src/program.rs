//! A parallel program: a shared precondition/postcondition pair, a set of
//! declared globals, and the parallel procedures (threads) that run under
//! rely-guarantee reasoning.

use std::collections::HashSet;

use rgverify_oracle::Symbol;

use crate::error::{InputError, InputResult};
use crate::statement::{StatementKind, StatementNode, StmtIdx};

/// One parallel procedure: its own `pc` symbol, its own flat statement
/// storage, and the top-level block that roots its control-flow graph.
#[derive(Debug, Clone)]
pub struct Thread {
    pub name: String,
    pub pc_symbol: Symbol,
    /// Flat storage for every statement reachable from `body`, plus the
    /// trailing [`StatementKind::Eof`] node, indexed by [`StmtIdx`].
    pub statements: Vec<StatementNode>,
    /// The thread's top-level block, in program order. Does not include the
    /// closing `Eof` node — see [`Thread::eof`].
    pub body: Vec<StmtIdx>,
    /// Index of this thread's synthetic terminal node, appended by
    /// [`Thread::finalize`] after the parsed body.
    pub eof: StmtIdx,
    pub locals: HashSet<Symbol>,
    /// Cleared at the start of every fixpoint round, set back to `true` by
    /// the driver; a statement's regeneration clears it again the moment it
    /// changes that statement's precondition. The outer loop continues while
    /// any thread's flag is `false` at the end of a round.
    pub fixpoint_reached: bool,
}

impl Thread {
    /// Creates a thread with an empty body and an already-appended `Eof`
    /// node. Callers build up `body` by pushing into `statements` and
    /// recording the resulting [`StmtIdx`]s; `eof` always refers to the one
    /// node appended here, regardless of how many more are pushed afterwards.
    pub fn new(name: impl Into<String>, thread_id: usize) -> Self {
        let mut statements = Vec::new();
        statements.push(StatementNode::new(StatementKind::Eof));
        Thread {
            name: name.into(),
            pc_symbol: Symbol::new(format!("pc_{thread_id}")),
            statements,
            body: Vec::new(),
            eof: StmtIdx(0),
            locals: HashSet::new(),
            fixpoint_reached: true,
        }
    }

    pub fn statement(&self, idx: StmtIdx) -> &StatementNode {
        &self.statements[idx.0]
    }

    pub fn statement_mut(&mut self, idx: StmtIdx) -> &mut StatementNode {
        &mut self.statements[idx.0]
    }

    /// Appends a new statement to this thread's flat storage and returns its
    /// index. Does not place it in `body` or any conditional's branch —
    /// callers (the parser) do that themselves.
    pub fn push_statement(&mut self, kind: StatementKind) -> StmtIdx {
        let idx = StmtIdx(self.statements.len());
        self.statements.push(StatementNode::new(kind));
        idx
    }

    pub fn eof_node(&self) -> &StatementNode {
        self.statement(self.eof)
    }
}

/// A complete parallel program, ready for CFG initialisation.
#[derive(Debug, Clone)]
pub struct Program {
    pub precondition: rgverify_oracle::Formula,
    pub postcondition: rgverify_oracle::Formula,
    pub globals: HashSet<Symbol>,
    pub threads: Vec<Thread>,
}

impl Program {
    /// Checks the naming invariants the data model requires: no declared
    /// name uses the reserved `pc` prefix, no global is declared twice, no
    /// thread declares the same local twice, and no name is both a global
    /// and a local.
    pub fn validate_names(&self) -> InputResult<()> {
        for global in &self.globals {
            if global.is_reserved() {
                return Err(InputError::ReservedIdentifier(global.name().to_string()));
            }
        }
        let mut seen_globals = HashSet::new();
        for global in &self.globals {
            if !seen_globals.insert(global.name().to_string()) {
                return Err(InputError::DuplicateGlobalDeclaration(global.name().to_string()));
            }
        }
        let mut locals_owner: std::collections::HashMap<String, String> = std::collections::HashMap::new();
        for thread in &self.threads {
            for local in &thread.locals {
                if local.is_reserved() {
                    return Err(InputError::ReservedIdentifier(local.name().to_string()));
                }
                if self.globals.contains(local) {
                    return Err(InputError::GlobalLocalNameClash {
                        name: local.name().to_string(),
                        thread: thread.name.clone(),
                    });
                }
                if let Some(owner) = locals_owner.get(local.name()) {
                    if owner != &thread.name {
                        return Err(InputError::CrossThreadLocalClash {
                            name: local.name().to_string(),
                            first_thread: owner.clone(),
                            second_thread: thread.name.clone(),
                        });
                    }
                } else {
                    locals_owner.insert(local.name().to_string(), thread.name.clone());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_reserved_global_name() {
        let mut program = Program {
            precondition: rgverify_oracle::Formula::True,
            postcondition: rgverify_oracle::Formula::True,
            globals: HashSet::new(),
            threads: Vec::new(),
        };
        program.globals.insert(Symbol::new("pc_rogue"));
        assert!(program.validate_names().is_err());
    }

    #[test]
    fn rejects_global_local_clash() {
        let mut thread = Thread::new("t1", 1);
        thread.locals.insert(Symbol::new("x"));
        let mut globals = HashSet::new();
        globals.insert(Symbol::new("x"));
        let program = Program {
            precondition: rgverify_oracle::Formula::True,
            postcondition: rgverify_oracle::Formula::True,
            globals,
            threads: vec![thread],
        };
        assert!(program.validate_names().is_err());
    }

    #[test]
    fn accepts_well_formed_program() {
        let mut thread = Thread::new("t1", 1);
        thread.locals.insert(Symbol::new("y"));
        let mut globals = HashSet::new();
        globals.insert(Symbol::new("x"));
        let program = Program {
            precondition: rgverify_oracle::Formula::True,
            postcondition: rgverify_oracle::Formula::True,
            globals,
            threads: vec![thread],
        };
        assert!(program.validate_names().is_ok());
    }
}
