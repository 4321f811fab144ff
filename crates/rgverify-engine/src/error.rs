//! Errors the engine itself can raise: either a structural problem with the
//! input program (`rgverify_ast::InputError`) or a fatal internal oracle
//! failure (`rgverify_oracle::OracleError`). Neither represents a
//! verification failure — that is a [`crate::driver::Verdict`], not an error.

use std::fmt;

use rgverify_ast::InputError;
use rgverify_oracle::OracleError;

#[derive(Debug, Clone)]
pub enum EngineError {
    Input(InputError),
    Oracle(OracleError),
    /// The fixpoint loop ran `max_iterations` rounds without every thread's
    /// precondition stabilising. Distinct from both `Input` and `Oracle`:
    /// the program may well be well-formed and provable, the driver just
    /// hasn't been given enough rounds to find out.
    NonConvergent { max_iterations: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Input(e) => write!(f, "{e}"),
            EngineError::Oracle(e) => write!(f, "{e}"),
            EngineError::NonConvergent { max_iterations } => {
                write!(f, "fixpoint did not converge within {max_iterations} iterations")
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<InputError> for EngineError {
    fn from(e: InputError) -> Self {
        EngineError::Input(e)
    }
}

impl From<OracleError> for EngineError {
    fn from(e: OracleError) -> Self {
        EngineError::Oracle(e)
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
