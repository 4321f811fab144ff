//! # rgverify-base
//!
//! Structural primitives shared across the rgverify workspace: source
//! [`Span`]s and [`SpannedError`]s. This crate has no knowledge of the
//! program grammar, the proof engine, or the SMT oracle — it is pure,
//! dependency-free infrastructure that every other crate builds on.

pub mod error;
pub mod span;

pub use error::{Result, SpannedError};
pub use span::Span;
