//! Translation errors.

use y2r_ycp::ReadError;

/// Error raised while translating a YCP tree. Translation stops at the first
/// error and produces no output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The tree violates an invariant of the front end's output.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A valid YCP construct with no Ruby equivalent.
    #[error("unsupported construct: {0}")]
    Unsupported(String),
}

/// Any error of the read-then-translate pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

pub(crate) fn invalid(message: impl Into<String>) -> CompileError {
    CompileError::InvalidInput(message.into())
}

pub(crate) fn unsupported(message: impl Into<String>) -> CompileError {
    CompileError::Unsupported(message.into())
}
