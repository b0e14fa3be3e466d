use gradgraph_core::GradGraphError;
use thiserror::Error;

/// Errors raised while configuring, training, persisting or reporting on a model.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error(transparent)]
    Core(#[from] GradGraphError),

    #[error("Bad checkpoint magic number {found:#x}, expected {expected:#x}")]
    BadMagic { found: u64, expected: u64 },

    #[error("Unknown {what} code {code}")]
    UnknownCode { what: &'static str, code: i64 },

    #[error("Invalid model configuration: {0}")]
    InvalidConfig(String),

    #[error("Checkpoint truncated while reading {0}")]
    Truncated(&'static str),

    #[error("Data source failed: {0}")]
    DataSource(String),
}
