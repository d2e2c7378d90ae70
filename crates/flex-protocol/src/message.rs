//! Single-parse classification of a control-channel line into one of the
//! five wire message shapes.

use crate::error::{ProtocolError, ProtocolResult};
use crate::reply_code::ReplyCode;

/// A reply to a previously sent command (`R<seq>|<code>|<message>[|<debug>]`).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ReplyMessage {
    /// Sequence number this reply corresponds to.
    pub seq: u64,
    /// Numeric reply code; see [`ReplyCode`].
    pub code: ReplyCode,
    /// Human-readable message from the radio.
    pub message: String,
    /// Optional debug detail.
    pub debug: Option<String>,
}

/// An asynchronous notice (`M|<severity>|<description>[|<meta>]`).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct NoticeMessage {
    /// Notice severity, as reported by the radio (e.g. `"error"`, `"info"`).
    pub severity: String,
    /// Human-readable description.
    pub description: String,
    /// Optional structured metadata, uninterpreted.
    pub meta: Option<String>,
}

/// A status broadcast (`S<handle>|<payload>`). `handle == 0` means
/// broadcast-to-all; a non-zero handle targets one client.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct StatusMessage {
    /// Target client handle, or `0` for broadcast.
    pub handle: u32,
    /// Everything after the handle, handed to
    /// [`crate::status::tokenize`] for entity-level parsing.
    pub payload: String,
}

/// One parsed control-channel line.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum WireMessage {
    /// Version banner, sent once at connect (`V<dotted-version>`).
    Version(String),
    /// Assigned client handle (`H<8-hex>`).
    Handle(u32),
    /// Reply to a command.
    Reply(ReplyMessage),
    /// Asynchronous notice.
    Notice(NoticeMessage),
    /// Status broadcast.
    Status(StatusMessage),
}

/// Parse a single control-channel line (without its trailing `\n`).
pub fn parse(line: &str) -> ProtocolResult<WireMessage> {
    let line = line.trim_end_matches('\r');
    let mut chars = line.chars();
    let prefix = chars
        .next()
        .ok_or_else(|| ProtocolError::Malformed(line.to_string()))?;
    let rest = &line[prefix.len_utf8()..];

    match prefix {
        'V' => parse_version(rest),
        'H' => parse_hex_handle(rest)
            .map(WireMessage::Handle)
            .map_err(|_| ProtocolError::InvalidHandle(line.to_string())),
        'R' => parse_reply(rest).map(WireMessage::Reply),
        'M' => parse_notice(rest).map(WireMessage::Notice),
        'S' => parse_status(rest).map(WireMessage::Status),
        _ => Err(ProtocolError::Malformed(line.to_string())),
    }
}

fn parse_version(rest: &str) -> ProtocolResult<WireMessage> {
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(ProtocolError::InvalidVersion(rest.to_string()));
    }
    Ok(WireMessage::Version(rest.to_string()))
}

/// Parse a handle token, accepting an optional `0x`/`0X` prefix and
/// variable-width hex (radios print handles zero-padded on the `H` line
/// but unpadded when addressing an `S` line).
fn parse_hex_handle(token: &str) -> Result<u32, ()> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u32::from_str_radix(digits, 16).map_err(|_| ())
}

fn parse_reply(rest: &str) -> ProtocolResult<ReplyMessage> {
    let mut parts = rest.splitn(4, '|');
    let seq_str = parts.next().filter(|s| !s.is_empty());
    let code_str = parts.next();
    let (seq_str, code_str) = match (seq_str, code_str) {
        (Some(s), Some(c)) => (s, c),
        _ => return Err(ProtocolError::InvalidReply(rest.to_string())),
    };
    let message = parts.next().unwrap_or_default().to_string();
    let debug = parts.next().map(|s| s.to_string());

    let seq = seq_str
        .parse::<u64>()
        .map_err(|_| ProtocolError::InvalidReply(rest.to_string()))?;
    let code = parse_hex_handle(code_str).map_err(|_| ProtocolError::InvalidReply(rest.to_string()))?;

    Ok(ReplyMessage {
        seq,
        code: ReplyCode(code),
        message,
        debug,
    })
}

fn parse_notice(rest: &str) -> ProtocolResult<NoticeMessage> {
    let rest = rest
        .strip_prefix('|')
        .ok_or_else(|| ProtocolError::Malformed(format!("M{rest}")))?;
    let mut parts = rest.splitn(3, '|');
    let severity = parts.next().filter(|s| !s.is_empty());
    let description = parts.next();
    let (severity, description) = match (severity, description) {
        (Some(s), Some(d)) => (s.to_string(), d.to_string()),
        _ => return Err(ProtocolError::Malformed(format!("M|{rest}"))),
    };
    let meta = parts.next().map(|s| s.to_string());
    Ok(NoticeMessage {
        severity,
        description,
        meta,
    })
}

fn parse_status(rest: &str) -> ProtocolResult<StatusMessage> {
    let mut parts = rest.splitn(2, '|');
    let handle_str = parts.next().filter(|s| !s.is_empty());
    let payload = parts.next();
    let (handle_str, payload) = match (handle_str, payload) {
        (Some(h), Some(p)) => (h, p),
        _ => return Err(ProtocolError::Malformed(format!("S{rest}"))),
    };
    let handle = parse_hex_handle(handle_str).map_err(|_| ProtocolError::InvalidHandle(handle_str.to_string()))?;
    Ok(StatusMessage {
        handle,
        payload: payload.to_string(),
    })
}

/// Render a client handle the way the wire protocol expects it on
/// command/handle lines: uppercase, zero-padded to eight hex digits,
/// prefixed `0x`.
pub fn format_handle(handle: u32) -> String {
    format!("0x{handle:08X}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_version_banner() {
        assert_eq!(parse("V3.10.10").unwrap(), WireMessage::Version("3.10.10".to_string()));
    }

    #[test]
    fn parses_handle_with_0x_prefix() {
        assert_eq!(parse("H0x7F7C21E0").unwrap(), WireMessage::Handle(0x7F7C21E0));
    }

    #[test]
    fn parses_reply_without_debug() {
        let msg = parse("R1|0|").unwrap();
        assert_eq!(
            msg,
            WireMessage::Reply(ReplyMessage {
                seq: 1,
                code: ReplyCode(0),
                message: String::new(),
                debug: None,
            })
        );
    }

    #[test]
    fn parses_rejected_reply() {
        let msg = parse("R42|50000001|Unable to assign slice").unwrap();
        assert_eq!(
            msg,
            WireMessage::Reply(ReplyMessage {
                seq: 42,
                code: ReplyCode(0x5000_0001),
                message: "Unable to assign slice".to_string(),
                debug: None,
            })
        );
    }

    #[test]
    fn parses_notice_with_meta() {
        let msg = parse("M|error|Lost contact with radio|src=net").unwrap();
        assert_eq!(
            msg,
            WireMessage::Notice(NoticeMessage {
                severity: "error".to_string(),
                description: "Lost contact with radio".to_string(),
                meta: Some("src=net".to_string()),
            })
        );
    }

    #[test]
    fn parses_status_with_unpadded_handle() {
        let msg = parse("S1|slice 0 RF_frequency=14.075000").unwrap();
        assert_eq!(
            msg,
            WireMessage::Status(StatusMessage {
                handle: 1,
                payload: "slice 0 RF_frequency=14.075000".to_string(),
            })
        );
    }

    #[test]
    fn parses_broadcast_status() {
        let msg = parse("S0|radio slices=2").unwrap();
        assert_eq!(
            msg,
            WireMessage::Status(StatusMessage {
                handle: 0,
                payload: "radio slices=2".to_string(),
            })
        );
    }

    #[test]
    fn rejects_unknown_prefix() {
        assert!(matches!(parse("X garbage"), Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn format_handle_is_uppercase_zero_padded() {
        assert_eq!(format_handle(0x7F7C21E0), "0x7F7C21E0");
        assert_eq!(format_handle(1), "0x00000001");
    }
}
