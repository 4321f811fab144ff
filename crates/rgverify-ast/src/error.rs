//! Structural validation errors: problems with a program's shape that are
//! not syntax errors (those belong to `rgverify-parser`) and are not
//! properties of whether the program verifies (those are reported by
//! `rgverify-engine` as a verdict, not an error).

use std::fmt;

#[derive(Debug, Clone)]
pub enum InputError {
    /// A declared global or local uses the reserved `pc` prefix.
    ReservedIdentifier(String),
    /// The same name is declared as a global more than once.
    DuplicateGlobalDeclaration(String),
    /// The same name is declared as a local more than once within one thread.
    DuplicateLocalDeclaration { name: String, thread: String },
    /// A name is declared as both a global and a local of some thread.
    GlobalLocalNameClash { name: String, thread: String },
    /// The same local name is declared in more than one thread; local sets
    /// must be disjoint across threads.
    CrossThreadLocalClash { name: String, first_thread: String, second_thread: String },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::ReservedIdentifier(name) => {
                write!(f, "'{name}' uses the reserved 'pc' prefix, which is reserved for program-counter symbols")
            }
            InputError::DuplicateGlobalDeclaration(name) => {
                write!(f, "global variable '{name}' is declared more than once")
            }
            InputError::DuplicateLocalDeclaration { name, thread } => {
                write!(f, "local variable '{name}' is declared more than once in thread '{thread}'")
            }
            InputError::GlobalLocalNameClash { name, thread } => {
                write!(f, "'{name}' is declared as both a global and a local of thread '{thread}'")
            }
            InputError::CrossThreadLocalClash { name, first_thread, second_thread } => {
                write!(
                    f,
                    "local '{name}' is declared in both thread '{first_thread}' and thread \
                     '{second_thread}'; local variable sets must be disjoint across threads"
                )
            }
        }
    }
}

impl std::error::Error for InputError {}

pub type InputResult<T> = Result<T, InputError>;
