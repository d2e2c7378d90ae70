//! Error types for the state store.

use thiserror::Error;

/// Errors that prevent a status line from being attributed to any
/// entity at all. Unrecognized attributes and unparsable values on an
/// otherwise-valid line are not errors — they are logged and skipped,
/// per the protocol's permissive-attribute discipline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The status line's source token doesn't match any known entity.
    #[error("unrecognized status source: {0}")]
    UnknownSource(String),

    /// An entity keyed by an identifier was missing that identifier.
    #[error("{source} status line missing its identifier")]
    MissingIdentifier { source: &'static str },
}

/// Convenience alias for results from this crate.
pub type StateResult<T> = Result<T, StateError>;
