//! Newline-delimited framing for the control channel.
//!
//! The control channel is a line protocol: every command, reply, notice,
//! and status broadcast is one `\n`-terminated ASCII line. TCP (and the
//! simulated transport used in tests) delivers those lines as arbitrary
//! byte chunks with no guarantee the chunk boundaries line up with `\n`,
//! so this codec accumulates bytes and peels off complete lines as they
//! become available.

use std::collections::VecDeque;

/// Default cap on a single line's length, as anti-OOM protection against a
/// transport that never sends a newline.
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;

/// Incremental `\n`-delimited line decoder.
///
/// Unlike a length-prefixed frame, a line has no upfront size — the codec
/// just scans forward from where it last left off each time more bytes
/// arrive, so a single `feed()` call never re-scans bytes it has already
/// checked for a delimiter.
#[derive(Debug)]
pub struct LineCodec {
    buffer: Vec<u8>,
    scanned: usize,
    max_line_len: usize,
    lines_decoded: u64,
    lines_rejected: u64,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}

impl LineCodec {
    /// Create a codec that rejects any line longer than `max_line_len`.
    pub fn new(max_line_len: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            scanned: 0,
            max_line_len,
            lines_decoded: 0,
            lines_rejected: 0,
        }
    }

    /// Number of complete lines decoded so far.
    pub fn lines_decoded(&self) -> u64 {
        self.lines_decoded
    }

    /// Number of lines dropped for exceeding `max_line_len`.
    pub fn lines_rejected(&self) -> u64 {
        self.lines_rejected
    }

    /// Feed newly received bytes into the accumulator.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Pull the next complete line out of the accumulator, if one is
    /// available. Strips a trailing `\r` (CRLF transports) as well as the
    /// `\n` itself. Call repeatedly until it returns `None` to drain every
    /// line a `feed()` made available.
    pub fn decode_buffered(&mut self) -> Option<String> {
        loop {
            let newline_at = self.buffer[self.scanned..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|i| self.scanned + i);

            let Some(at) = newline_at else {
                if self.buffer.len() > self.max_line_len {
                    // No delimiter within the size cap: the sender is
                    // either wedged or hostile. Drop everything buffered
                    // so far and keep scanning from a clean slate.
                    self.lines_rejected += 1;
                    self.buffer.clear();
                    self.scanned = 0;
                }
                return None;
            };

            let mut line: Vec<u8> = self.buffer.drain(..=at).collect();
            line.pop(); // trailing '\n'
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            self.scanned = 0;

            if line.len() > self.max_line_len {
                self.lines_rejected += 1;
                continue;
            }
            self.lines_decoded += 1;
            return Some(String::from_utf8_lossy(&line).into_owned());
        }
    }

    /// Drain every complete line currently buffered.
    pub fn drain_lines(&mut self) -> VecDeque<String> {
        let mut out = VecDeque::new();
        while let Some(line) = self.decode_buffered() {
            out.push_back(line);
        }
        out
    }
}

/// Render a line for transmission: the payload plus its trailing `\n`.
/// Callers pass the line without any `\n` of their own.
pub fn encode_line(line: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(line.len() + 1);
    buf.extend_from_slice(line.as_bytes());
    buf.push(b'\n');
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_one_line_fed_whole() {
        let mut codec = LineCodec::default();
        codec.feed(b"V3.10.10\n");
        assert_eq!(codec.decode_buffered().as_deref(), Some("V3.10.10"));
        assert_eq!(codec.decode_buffered(), None);
    }

    #[test]
    fn accumulates_across_partial_feeds() {
        let mut codec = LineCodec::default();
        codec.feed(b"H0x7F");
        assert_eq!(codec.decode_buffered(), None);
        codec.feed(b"7C21E0\n");
        assert_eq!(codec.decode_buffered().as_deref(), Some("H0x7F7C21E0"));
    }

    #[test]
    fn drains_multiple_lines_from_one_chunk() {
        let mut codec = LineCodec::default();
        codec.feed(b"R1|0|\nS1|slice 0 RF_frequency=14.075000\n");
        let lines = codec.drain_lines();
        assert_eq!(lines, VecDeque::from(vec!["R1|0|".to_string(), "S1|slice 0 RF_frequency=14.075000".to_string()]));
    }

    #[test]
    fn strips_trailing_carriage_return() {
        let mut codec = LineCodec::default();
        codec.feed(b"ping\r\n");
        assert_eq!(codec.decode_buffered().as_deref(), Some("ping"));
    }

    #[test]
    fn oversized_line_without_newline_is_dropped() {
        let mut codec = LineCodec::new(8);
        codec.feed(b"012345678901234");
        assert_eq!(codec.decode_buffered(), None);
        assert_eq!(codec.lines_rejected(), 1);
        // codec recovers once a newline finally shows up for a fresh line
        codec.feed(b"ok\n");
        assert_eq!(codec.decode_buffered().as_deref(), Some("ok"));
    }

    #[test]
    fn encode_line_appends_single_newline() {
        assert_eq!(encode_line("ping"), b"ping\n");
    }
}
