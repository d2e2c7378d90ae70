//! Error type for the client facade.

use thiserror::Error;

/// Errors surfaced by [`crate::Client`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// No known radio matches the requested serial.
    #[error("no radio known with serial {0}")]
    UnknownRadio(String),

    /// The endpoint's transport isn't wired up yet (currently only
    /// plain TCP is).
    #[error("unsupported transport: {0}")]
    UnsupportedTransport(&'static str),

    /// The background discovery actor is gone.
    #[error("client actor channel closed")]
    ChannelClosed,

    /// A TCP connect (or other transport I/O) failed.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// A beacon failed to parse into a radio descriptor.
    #[error("discovery error: {0}")]
    Discovery(#[from] flex_discovery::DiscoveryError),

    /// The session handshake failed once connected.
    #[error("session error: {0}")]
    Session(#[from] flex_session::SessionError),
}

/// Convenience alias for results from this crate.
pub type ClientResult<T> = Result<T, ClientError>;
