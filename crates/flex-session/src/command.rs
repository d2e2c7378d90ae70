//! Outbound command sequencing and the pending-reply table.
//!
//! Every command sent on the control channel carries a strictly
//! increasing sequence number; the radio's `R<seq>|...` reply echoes it
//! back. This module owns assigning that number and resolving the
//! `oneshot` a caller is waiting on when the matching reply (or a
//! timeout, or a channel teardown) arrives — the same one-reply-per-
//! request shape `cat_mux::actor` uses for its `oneshot`-response
//! commands, generalized from an in-process channel to a wire reply.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;

use flex_protocol::message::ReplyMessage;

use crate::error::{SessionError, SessionResult};

/// Default deadline for a command awaiting its reply.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// One outstanding command: the deadline it must reply by and the
/// channel its result is delivered on.
struct Pending {
    deadline: Instant,
    reply_tx: oneshot::Sender<SessionResult<ReplyMessage>>,
}

/// Assigns sequence numbers and tracks replies still outstanding.
#[derive(Default)]
pub struct PendingReplies {
    next_seq: u64,
    table: HashMap<u64, Pending>,
}

impl PendingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next sequence number without registering a waiter —
    /// used for fire-and-forget commands (keepalive pings) that track
    /// their own ack out of band instead of through this table.
    pub fn reserve_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Reserve the next sequence number and register a waiter for its
    /// reply, due by `now + timeout`.
    pub fn register(
        &mut self,
        now: Instant,
        timeout: Duration,
    ) -> (u64, oneshot::Receiver<SessionResult<ReplyMessage>>) {
        let seq = self.reserve_seq();
        let (tx, rx) = oneshot::channel();
        self.table.insert(
            seq,
            Pending {
                deadline: now + timeout,
                reply_tx: tx,
            },
        );
        (seq, rx)
    }

    /// Resolve a command's waiter with the radio's reply. No-op (besides a
    /// debug log) if `seq` doesn't match anything outstanding — a late
    /// reply for an already-timed-out command, or a duplicate.
    pub fn resolve(&mut self, reply: ReplyMessage) {
        let Some(pending) = self.table.remove(&reply.seq) else {
            tracing::debug!(seq = reply.seq, "reply for unknown or already-resolved command");
            return;
        };
        let result = if reply.code.is_accepted() {
            Ok(reply)
        } else {
            Err(SessionError::CommandRejected {
                code: reply.code,
                description: reply_description(&reply),
            })
        };
        let _ = pending.reply_tx.send(result);
    }

    /// Fail every command whose deadline has passed as of `now`, returning
    /// how many were timed out.
    pub fn expire(&mut self, now: Instant) -> usize {
        let expired: Vec<u64> = self
            .table
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(seq, _)| *seq)
            .collect();
        let count = expired.len();
        for seq in expired {
            if let Some(pending) = self.table.remove(&seq) {
                let _ = pending.reply_tx.send(Err(SessionError::CommandTimeout));
            }
        }
        count
    }

    /// Fail every outstanding command because the control channel is gone.
    pub fn fail_all_channel_closed(&mut self) {
        for (_, pending) in self.table.drain() {
            let _ = pending.reply_tx.send(Err(SessionError::ChannelClosed));
        }
    }

    /// Number of commands still awaiting a reply.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Earliest deadline still outstanding, if any — callers use this to
    /// size a single sleep instead of polling on a fixed tick.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.table.values().map(|p| p.deadline).min()
    }
}

/// Prefer the protocol's own documented meaning for a known code over
/// whatever the radio put on the wire (spec.md §8 scenario 2: code
/// `0x50000001` always describes as "Unable to get foundation receiver
/// assignment", regardless of the reply's own message text). Unknown
/// codes fall back to the wire text, and finally to the generic
/// category description.
fn reply_description(reply: &ReplyMessage) -> String {
    if let Some(known) = reply.code.known_description() {
        return known.to_string();
    }
    if !reply.message.is_empty() {
        reply.message.clone()
    } else {
        reply.code.description()
    }
}

/// Render the full command line for sequence `seq` and body `body`, not
/// including the trailing `\n` (the transport's [`crate::control::encode_line`]
/// adds that).
pub fn render_command_line(seq: u64, body: &str) -> String {
    format!("C{seq}|{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flex_protocol::ReplyCode;
    use tokio::time::Duration as StdDuration;

    fn reply(seq: u64, code: u32, message: &str) -> ReplyMessage {
        ReplyMessage {
            seq,
            code: ReplyCode(code),
            message: message.to_string(),
            debug: None,
        }
    }

    #[tokio::test]
    async fn sequence_numbers_increase_monotonically() {
        let mut table = PendingReplies::new();
        let now = Instant::now();
        let (seq1, _rx1) = table.register(now, DEFAULT_COMMAND_TIMEOUT);
        let (seq2, _rx2) = table.register(now, DEFAULT_COMMAND_TIMEOUT);
        assert_eq!(seq2, seq1 + 1);
    }

    #[tokio::test]
    async fn accepted_reply_resolves_ok() {
        let mut table = PendingReplies::new();
        let now = Instant::now();
        let (seq, rx) = table.register(now, DEFAULT_COMMAND_TIMEOUT);
        table.resolve(reply(seq, 0, ""));
        assert!(rx.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn rejected_reply_resolves_command_rejected() {
        let mut table = PendingReplies::new();
        let now = Instant::now();
        let (seq, rx) = table.register(now, DEFAULT_COMMAND_TIMEOUT);
        table.resolve(reply(seq, 0x5000_0001, "Unable to assign slice"));
        let err = rx.await.unwrap().unwrap_err();
        match err {
            SessionError::CommandRejected { code, description } => {
                assert_eq!(code.0, 0x5000_0001);
                assert_eq!(description, "Unable to get foundation receiver assignment");
            }
            other => panic!("expected CommandRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn expire_times_out_past_deadline_commands() {
        let mut table = PendingReplies::new();
        let now = Instant::now();
        let (_seq, rx) = table.register(now, StdDuration::from_millis(1));
        let later = now + StdDuration::from_millis(5);
        assert_eq!(table.expire(later), 1);
        assert!(matches!(rx.await.unwrap().unwrap_err(), SessionError::CommandTimeout));
    }

    #[tokio::test]
    async fn fail_all_resolves_every_waiter_as_channel_closed() {
        let mut table = PendingReplies::new();
        let now = Instant::now();
        let (_seq1, rx1) = table.register(now, DEFAULT_COMMAND_TIMEOUT);
        let (_seq2, rx2) = table.register(now, DEFAULT_COMMAND_TIMEOUT);
        table.fail_all_channel_closed();
        assert!(matches!(rx1.await.unwrap().unwrap_err(), SessionError::ChannelClosed));
        assert!(matches!(rx2.await.unwrap().unwrap_err(), SessionError::ChannelClosed));
    }

    #[test]
    fn render_command_line_matches_wire_grammar() {
        assert_eq!(render_command_line(7, "slice tune 0 14.075000"), "C7|slice tune 0 14.075000");
    }
}
