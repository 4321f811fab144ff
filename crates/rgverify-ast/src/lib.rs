//! The program/thread/statement model: the static shape of a parallel
//! program, before any proof outline has been derived for it.
//!
//! This crate depends on `rgverify-oracle` for [`Formula`]/[`ArithTerm`]/
//! [`Symbol`], but knows nothing about how a proof outline is computed —
//! that's `rgverify-engine`'s job, working over the indices and CFG walker
//! this crate provides.

pub mod cfg;
pub mod error;
pub mod program;
pub mod statement;

pub use cfg::visit_order;
pub use error::{InputError, InputResult};
pub use program::{Program, Thread};
pub use statement::{AssignmentRef, StatementKind, StatementNode, StmtIdx, ThreadIdx};
