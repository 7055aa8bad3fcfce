//! Fatal error conditions (spec §7).
//!
//! Every error the interpreter can raise is terminal: there is no
//! recovery, so unlike the teacher's `Diagnostic`/`DiagnosticEngine` pair
//! (which accumulates possibly-many non-fatal compiler diagnostics), this
//! is a single `thiserror` enum that `main` converts directly into a
//! stderr message and a non-zero exit code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FatalError {
    #[error("heap allocation failed (requested {requested} cells)")]
    HeapAllocFailed { requested: usize },

    #[error("stack overflow")]
    StackOverflow,

    #[error("unexpected EOF")]
    UnexpectedEof,

    #[error("cannot open {path}: {source}")]
    CannotOpenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid output format (result was not a number)")]
    NotANumber,

    #[error("invalid character {value}")]
    InvalidCharacter { value: i64 },

    #[error("invalid output format (attempted to apply inc to a non-number)")]
    IncNonNumber,

    #[error("invalid output format (attempted to apply a number)")]
    ApplyNumber,

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("write error: {0}")]
    OutputWrite(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FatalError>;
