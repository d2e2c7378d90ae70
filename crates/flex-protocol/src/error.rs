//! Error types for the control-channel line grammar.

use thiserror::Error;

/// Errors that can occur while parsing a control-channel line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The line did not match any known message shape.
    #[error("malformed control line: {0:?}")]
    Malformed(String),

    /// A `V` banner's version string was not dotted-decimal.
    #[error("invalid version banner: {0:?}")]
    InvalidVersion(String),

    /// An `H` or `S` line's handle was not 8 hex digits.
    #[error("invalid client handle: {0:?}")]
    InvalidHandle(String),

    /// An `R` line's sequence or code field was not a valid integer.
    #[error("invalid reply line: {0:?}")]
    InvalidReply(String),
}

/// Convenience alias for results from this crate.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
