//! Error types for the session crate.

use thiserror::Error;

use flex_protocol::ReplyCode;

/// Errors surfaced by a command, a connect attempt, or the session
/// lifecycle.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The radio replied with a non-zero code.
    #[error("command rejected: {code:#010X} ({description})", code = code.0)]
    CommandRejected { code: ReplyCode, description: String },

    /// No reply arrived within the command's deadline.
    #[error("command timed out waiting for a reply")]
    CommandTimeout,

    /// The transport closed while the command was outstanding.
    #[error("control channel closed")]
    ChannelClosed,

    /// The handshake (version/handle/sync/data-plane) failed at some
    /// stage.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// An I/O error from the underlying transport.
    #[error("transport error: {0}")]
    TransportError(#[from] std::io::Error),

    /// A control line violated the wire grammar.
    #[error("malformed control line: {0}")]
    Malformed(#[from] flex_protocol::ProtocolError),

    /// The session was disconnected while this operation was pending.
    #[error("operation cancelled: session disconnected")]
    Cancelled,
}

/// Convenience alias for results from this crate.
pub type SessionResult<T> = Result<T, SessionError>;
