//! Error types for the VITA-49 codec.

use thiserror::Error;

/// Errors that can occur while decoding or encoding a VITA-49 packet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VitaError {
    /// The buffer is shorter than the fixed preamble implied by the header flags.
    #[error("packet truncated: need at least {need} bytes, got {got}")]
    Truncated {
        /// Minimum number of bytes the declared header flags require.
        need: usize,
        /// Bytes actually available.
        got: usize,
    },

    /// The declared payload extends beyond the buffer.
    #[error("payload out of bounds: declared {declared} words, buffer has {available} words")]
    PayloadOutOfBounds {
        /// Packet size declared in the header, in 32-bit words.
        declared: usize,
        /// Words actually available in the buffer.
        available: usize,
    },

    /// The trailer flag was set but there was no room for a trailer word.
    #[error("trailer flag set but no room for trailer word")]
    MissingTrailer,

    /// An unsupported or reserved packet type bit pattern was encountered.
    #[error("unsupported packet type bits: {0:#06b}")]
    UnsupportedPacketType(u8),

    /// A payload-specific invariant was violated during decode.
    #[error("malformed {class} payload: {reason}")]
    MalformedPayload {
        /// Name of the payload class being decoded.
        class: &'static str,
        /// Human-readable description of what went wrong.
        reason: String,
    },
}

/// Convenience alias for results from this crate.
pub type VitaResult<T> = Result<T, VitaError>;
