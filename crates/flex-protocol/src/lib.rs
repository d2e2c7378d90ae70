//! Control-channel line grammar for the FlexRadio SmartSDR protocol: the
//! newline-delimited ASCII command/reply/status language that rides
//! alongside the binary VITA-49 channel (`flex-vita`).
//!
//! This crate has no notion of a transport or a connection; it only
//! parses and renders lines. Sequencing, timeouts, and the pending-reply
//! table live in `flex-session::command`.

pub mod command_grammar;
pub mod error;
pub mod message;
pub mod reply_code;
pub mod status;

pub use error::{ProtocolError, ProtocolResult};
pub use message::{format_handle, parse, NoticeMessage, ReplyMessage, StatusMessage, WireMessage};
pub use reply_code::{ReplyCategory, ReplyCode};
pub use status::{parse_float_safe, parse_integer_hex, parse_truthy, tokenize, StatusLine};
