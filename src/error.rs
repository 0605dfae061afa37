//! Error kinds for the trace codec.
//!
//! Every variant is fatal for the current conversion. The format has no resynchronization
//! marker below the stream level, so nothing in the crate tries to skip a bad record and carry
//! on; errors travel up to the caller untouched.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    /// Tag/end-tag mismatch, array length disagreeing with its sibling count, thread mismatch
    /// between banners, or a root-only field that disagrees with the rank/root relationship.
    #[error("format desync: {0}")]
    FormatDesync(String),

    /// A record-kind name or tag that the registry does not know.
    #[error("unknown record kind: {0}")]
    UnknownKind(String),

    /// A value outside the range the format can carry.
    #[error("range violation: {0}")]
    RangeViolation(String),

    /// ASCII input that does not match the expected line shape or field tokens.
    #[error("line {line}: grammar mismatch: {message}")]
    GrammarMismatch { line: usize, message: String },

    /// The stream version could not be established, so legacy decode paths are undecidable.
    #[error("version ambiguity: {0}")]
    VersionAmbiguity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TraceError>;

impl TraceError {
    pub(crate) fn desync(message: impl Into<String>) -> Self {
        TraceError::FormatDesync(message.into())
    }

    pub(crate) fn range(message: impl Into<String>) -> Self {
        TraceError::RangeViolation(message.into())
    }

    pub(crate) fn grammar(line: usize, message: impl Into<String>) -> Self {
        TraceError::GrammarMismatch {
            line,
            message: message.into(),
        }
    }
}
