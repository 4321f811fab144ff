//! The CLI's top-level error type: every way `run_cli` can fail, collected
//! into one enum so `main` has a single place to print and exit from.

use std::fmt;

use rgverify_base::SpannedError;
use rgverify_engine::EngineError;

#[derive(Debug)]
pub enum CliError {
    Io(std::io::Error),
    Parse(SpannedError),
    Engine(EngineError),
    /// Serialising a `--json` report failed. Never expected in practice —
    /// every field in `render::VerificationReport` is a plain string or
    /// number — but `serde_json::to_string_pretty` is fallible, so this
    /// still needs a home in the one error enum `main` prints from.
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "could not read program file: {e}"),
            CliError::Parse(e) => write!(f, "parse error: {e}"),
            CliError::Engine(e) => write!(f, "{e}"),
            CliError::Json(e) => write!(f, "could not render JSON report: {e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<SpannedError> for CliError {
    fn from(e: SpannedError) -> Self {
        CliError::Parse(e)
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        CliError::Engine(e)
    }
}
