//! Named integer variables.
//!
//! A [`Symbol`] denotes a single integer-sorted variable: a declared global, a
//! thread-local, a thread's program-counter symbol, or a symbol minted fresh
//! during strongest-postcondition computation. Per the data model, symbol
//! identity is *semantic*: two symbols are the same program variable iff
//! [`Oracle::symbol_equal`](crate::Oracle::symbol_equal) proves their equality
//! valid, never because they compare equal structurally.
//!
//! `Symbol` still derives `PartialEq`/`Eq`/`Hash` below, because this crate's
//! substitution maps are keyed by `Symbol` and `HashMap` needs that. That is
//! safe only because of a fact specific to this implementation: every
//! `Symbol` that exists in a running verification is created with a name that
//! is unique for the lifetime of the run (declared names are checked for
//! uniqueness during CFG initialisation; fresh names carry a counter no two
//! calls can share), so struct/name equality and oracle equality coincide
//! here. Do not rely on that coincidence outside `rgverify-oracle` — engine
//! code that needs to know whether two symbols denote the same program
//! variable must still go through `Oracle::symbol_equal`, not `==`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifier prefix reserved for program-counter symbols; user-declared
/// globals and locals may not begin with it.
pub const RESERVED_PREFIX: &str = "pc";

/// A named integer variable.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Creates a symbol with the given name. Does not check for collisions;
    /// callers that need global uniqueness (parsed program variables) should
    /// validate at the point of declaration instead.
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(Arc::from(name.into().into_boxed_str()))
    }

    /// The symbol's name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// `true` if the name begins with the reserved `pc` prefix.
    pub fn is_reserved(&self) -> bool {
        self.0.starts_with(RESERVED_PREFIX)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

static FRESH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Mints a symbol guaranteed not to collide with any other symbol produced
/// by this function during the process lifetime. `hint` is included in the
/// name purely for readability in printed proof outlines.
pub fn fresh_symbol(hint: &str) -> Symbol {
    let n = FRESH_COUNTER.fetch_add(1, Ordering::Relaxed);
    Symbol::new(format!("{hint}${n}"))
}
