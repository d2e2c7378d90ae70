//! The session actor: owns the control-channel transport, the pending-
//! reply table, the entity state store, and the connection state
//! machine. A single task drives all of it — every other task (line
//! reader loop included) only ever talks to it by sending into its
//! command channel, mirroring `cat_mux::actor::run_mux_actor`'s
//! single-actor-owns-all-state shape.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;

use flex_protocol::command_grammar::{ping, subscribe};
use flex_protocol::message::{NoticeMessage, ReplyMessage, WireMessage};
use flex_protocol::{self as protocol, StatusLine};
use flex_state::{Change, EntityEvent, StateStore};

use crate::command::{render_command_line, PendingReplies, DEFAULT_COMMAND_TIMEOUT};
use crate::control::{encode_line, LineCodec};
use crate::error::{SessionError, SessionResult};

/// Interval between keepalive pings once the session is `ready`.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_millis(1000);
/// A missed ping ack for longer than this tears the session down.
pub const KEEPALIVE_TIMEOUT_MULTIPLIER: u32 = 5;

/// Every status source subscribed during the sync phase (spec.md §4.6).
const SUBSCRIBE_SOURCES: &[&str] = &[
    "client",
    "tx",
    "atu",
    "amplifier",
    "meter",
    "pan",
    "slice",
    "gps",
    "audio_stream",
    "cwx",
    "xvtr",
    "memories",
    "daxiq",
    "dax",
    "usb_cable",
    "tnf",
    "spot",
    "rapidm",
    "ale",
    "log_manager",
    "radio",
    "apd",
];

fn sync_commands() -> Vec<String> {
    let mut commands = vec![
        "info".to_string(),
        "version".to_string(),
        "ant list".to_string(),
        "mic list".to_string(),
        "profile global list".to_string(),
        "profile tx list".to_string(),
        "profile mic list".to_string(),
        "profile display list".to_string(),
    ];
    commands.extend(SUBSCRIBE_SOURCES.iter().map(|s| subscribe(s)));
    commands
}

/// The connection's coarse lifecycle state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ConnectionState {
    Disconnected,
    ConnectingControl,
    AwaitingHandle,
    Syncing,
    EstablishingDataPlane,
    Ready,
}

/// Events a session publishes to every subscriber. Bounded broadcast
/// channel — a slow subscriber lags and misses events rather than
/// blocking the actor (the actor itself never waits on a subscriber).
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// The handshake completed; the control channel is subscribed and the
    /// session is waiting for the data plane to attach.
    HandshakeComplete { client_handle: u32 },
    /// The data plane attached; the session is fully `ready`.
    Ready,
    /// An entity's state changed.
    Entity(EntityEvent),
    /// An asynchronous notice line from the radio.
    Notice(NoticeMessage),
    /// The session tore down, with the reason if not a clean disconnect.
    Disconnected { reason: Option<String> },
}

enum ActorCommand {
    SendRaw {
        body: String,
        reply: oneshot::Sender<SessionResult<ReplyMessage>>,
    },
    Snapshot {
        reply: oneshot::Sender<StateStore>,
    },
    /// Fold a locally-synthesized status line onto the slice store ahead
    /// of the radio's own broadcast, so a controller can hand a caller an
    /// optimistic diff distinct from the authoritative one that arrives
    /// later over [`SessionEvent::Entity`] (spec.md §4.6, §9).
    ApplyOptimisticSlice {
        id: String,
        line: StatusLine,
        reply: oneshot::Sender<Vec<&'static str>>,
    },
    AttachDataPlane {
        reply: oneshot::Sender<SessionResult<()>>,
    },
    Disconnect,
}

/// A live connection to a radio's control channel.
///
/// Cloning a handle is cheap (it's a channel sender); every clone talks
/// to the same underlying session.
#[derive(Clone)]
pub struct SessionHandle {
    cmd_tx: mpsc::Sender<ActorCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
    client_handle: u32,
}

impl SessionHandle {
    /// The client handle the radio assigned during handshake.
    pub fn client_handle(&self) -> u32 {
        self.client_handle
    }

    /// Subscribe to this session's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Send a raw command body (without the `C<seq>|` prefix or trailing
    /// `\n`) and await its reply.
    pub async fn send_raw(&self, body: impl Into<String>) -> SessionResult<ReplyMessage> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(ActorCommand::SendRaw { body: body.into(), reply })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        rx.await.map_err(|_| SessionError::Cancelled)?
    }

    /// A point-in-time copy of the entity state store.
    pub async fn snapshot(&self) -> SessionResult<StateStore> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(ActorCommand::Snapshot { reply })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        rx.await.map_err(|_| SessionError::Cancelled)
    }

    /// Fold a synthesized status line onto the slice store immediately,
    /// ahead of the radio's authoritative broadcast. Returns the fields
    /// the optimistic line actually changed, same shape as the diff a
    /// real status broadcast would produce.
    pub(crate) async fn apply_optimistic_slice(&self, id: String, line: StatusLine) -> SessionResult<Vec<&'static str>> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(ActorCommand::ApplyOptimisticSlice { id, line, reply })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        rx.await.map_err(|_| SessionError::Cancelled)
    }

    /// Confirm the data plane (UDP socket or WebRTC data channel) is
    /// attached, moving the session from `establishing_data_plane` to
    /// `ready`.
    pub async fn attach_data_plane(&self) -> SessionResult<()> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(ActorCommand::AttachDataPlane { reply })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        rx.await.map_err(|_| SessionError::Cancelled)?
    }

    /// Disconnect, cancelling any pending commands.
    pub async fn disconnect(&self) {
        let _ = self.cmd_tx.send(ActorCommand::Disconnect).await;
    }

    /// A slice controller for slice `id`.
    pub fn slice(&self, id: impl Into<String>) -> crate::controllers::slice::SliceController {
        crate::controllers::slice::SliceController::new(self.clone(), id.into())
    }

    /// A panadapter controller for the panadapter with stream id `stream_id`.
    pub fn panadapter(&self, stream_id: u32) -> crate::controllers::panadapter::PanadapterController {
        crate::controllers::panadapter::PanadapterController::new(self.clone(), stream_id)
    }

    /// A waterfall controller for the waterfall with stream id `stream_id`.
    pub fn waterfall(&self, stream_id: u32) -> crate::controllers::waterfall::WaterfallController {
        crate::controllers::waterfall::WaterfallController::new(self.clone(), stream_id)
    }

    /// The radio-global controller (name, callsign, GPS, region, ...).
    pub fn radio(&self) -> crate::controllers::radio::RadioController {
        crate::controllers::radio::RadioController::new(self.clone())
    }

    /// The automatic power down controller.
    pub fn apd(&self) -> crate::controllers::apd::ApdController {
        crate::controllers::apd::ApdController::new(self.clone())
    }

    /// The equalizer controller for `chain` (tx or rx).
    pub fn equalizer(
        &self,
        chain: flex_protocol::command_grammar::EqChain,
    ) -> crate::controllers::equalizer::EqualizerController {
        crate::controllers::equalizer::EqualizerController::new(self.clone(), chain)
    }

    /// The interlock controller.
    pub fn interlock(&self) -> crate::controllers::interlock::InterlockController {
        crate::controllers::interlock::InterlockController::new(self.clone())
    }

    /// The transmit controller.
    pub fn transmit(&self) -> crate::controllers::transmit::TransmitController {
        crate::controllers::transmit::TransmitController::new(self.clone())
    }
}

/// Open a session against an already-connected transport (TCP socket,
/// TLS stream, or — in tests — one end of an in-memory duplex). Drives
/// the handshake through `establishing_data_plane` and returns once
/// that point is reached; call [`SessionHandle::attach_data_plane`] to
/// finish the transition to `ready`.
pub async fn connect<T>(transport: T) -> SessionResult<SessionHandle>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    connect_with_timeout(transport, DEFAULT_COMMAND_TIMEOUT).await
}

/// Like [`connect`], overriding the per-command reply timeout used
/// during the sync phase and for every subsequent [`SessionHandle::send_raw`].
pub async fn connect_with_timeout<T>(transport: T, command_timeout: Duration) -> SessionResult<SessionHandle>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel(256);
    let (event_tx, _event_rx) = broadcast::channel(1024);
    let (ready_tx, ready_rx) = oneshot::channel();

    tokio::spawn(run_session_actor(transport, cmd_rx, event_tx.clone(), ready_tx, command_timeout));

    let client_handle = ready_rx
        .await
        .map_err(|_| SessionError::ConnectionFailed("session actor exited during handshake".to_string()))??;

    Ok(SessionHandle { cmd_tx, event_tx, client_handle })
}

struct SyncTracker {
    outstanding: Vec<u64>,
}

impl SyncTracker {
    fn new() -> Self {
        Self { outstanding: Vec::new() }
    }

    fn is_done(&self) -> bool {
        self.outstanding.is_empty()
    }
}

async fn run_session_actor<T>(
    transport: T,
    mut cmd_rx: mpsc::Receiver<ActorCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
    ready_tx: oneshot::Sender<SessionResult<u32>>,
    command_timeout: Duration,
) where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut reader, mut writer) = tokio::io::split(transport);
    let mut codec = LineCodec::default();
    let mut pending = PendingReplies::new();
    let mut store = StateStore::new();
    let mut state = ConnectionState::ConnectingControl;
    let mut client_handle: Option<u32> = None;
    let mut sync_tracker: Option<SyncTracker> = None;
    let mut pending_ping: Option<(u64, Instant)> = None;
    let mut ready_tx = Some(ready_tx);
    let mut read_buf = [0u8; 4096];
    let mut keepalive = tokio::time::interval(KEEPALIVE_INTERVAL);
    keepalive.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    // transport is already open by construction: connecting_control -> awaiting_handle.
    state = ConnectionState::AwaitingHandle;

    let disconnect_reason = loop {
        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    None => break None,
                    Some(ActorCommand::Disconnect) => break None,
                    Some(ActorCommand::Snapshot { reply }) => {
                        let _ = reply.send(store.clone());
                    }
                    Some(ActorCommand::ApplyOptimisticSlice { id, line, reply }) => {
                        let diff = match store.slices.apply(id, &line) {
                            Change::Updated { diff, .. } => diff,
                            Change::Removed => Vec::new(),
                        };
                        let _ = reply.send(diff);
                    }
                    Some(ActorCommand::AttachDataPlane { reply }) => {
                        if state == ConnectionState::EstablishingDataPlane {
                            state = ConnectionState::Ready;
                            let _ = event_tx.send(SessionEvent::Ready);
                            let _ = reply.send(Ok(()));
                        } else {
                            let _ = reply.send(Err(SessionError::ConnectionFailed(
                                "data plane attach requested outside establishing_data_plane".to_string(),
                            )));
                        }
                    }
                    Some(ActorCommand::SendRaw { body, reply }) => {
                        let now = Instant::now();
                        let (seq, rx) = pending.register(now, command_timeout);
                        let line = render_command_line(seq, &body);
                        if let Err(err) = writer.write_all(&encode_line(&line)).await {
                            let _ = reply.send(Err(SessionError::TransportError(err)));
                        } else {
                            tokio::spawn(async move {
                                let result = rx.await.unwrap_or(Err(SessionError::Cancelled));
                                let _ = reply.send(result);
                            });
                        }
                    }
                }
            }

            _ = keepalive.tick(), if state == ConnectionState::Ready => {
                if let Some((seq, sent_at)) = pending_ping {
                    if sent_at.elapsed() > KEEPALIVE_INTERVAL * KEEPALIVE_TIMEOUT_MULTIPLIER {
                        tracing::warn!(seq, "keepalive ack missed past timeout, disconnecting");
                        break Some("keepalive timeout".to_string());
                    }
                }
                let seq = pending.reserve_seq();
                let line = render_command_line(seq, &ping());
                if writer.write_all(&encode_line(&line)).await.is_ok() {
                    pending_ping = Some((seq, Instant::now()));
                }
            }

            now = tokio::time::sleep(Duration::from_millis(200)) => {
                let _ = now;
                if pending.expire(Instant::now()) > 0 {
                    tracing::debug!("expired one or more overdue commands");
                }
            }

            read = reader.read(&mut read_buf) => {
                match read {
                    Ok(0) => break Some("transport closed".to_string()),
                    Ok(n) => {
                        codec.feed(&read_buf[..n]);
                        while let Some(line) = codec.decode_buffered() {
                            match protocol::message::parse(&line) {
                                Ok(msg) => {
                                    handle_wire_message(
                                        msg,
                                        &mut state,
                                        &mut client_handle,
                                        &mut sync_tracker,
                                        &mut pending,
                                        &mut pending_ping,
                                        &mut store,
                                        &event_tx,
                                        &mut writer,
                                        &mut ready_tx,
                                        command_timeout,
                                    ).await;
                                }
                                Err(err) => {
                                    tracing::debug!(error = %err, line, "malformed control line, dropping");
                                }
                            }
                        }
                        if let Some(reason) = check_sync_failure(&state) {
                            break Some(reason);
                        }
                    }
                    Err(err) => break Some(format!("transport read error: {err}")),
                }
            }
        }
    };

    pending.fail_all_channel_closed();
    if let Some(tx) = ready_tx.take() {
        let _ = tx.send(Err(SessionError::ConnectionFailed(
            disconnect_reason.clone().unwrap_or_else(|| "disconnected before handshake completed".to_string()),
        )));
    }
    let _ = event_tx.send(SessionEvent::Disconnected { reason: disconnect_reason });
}

fn check_sync_failure(state: &ConnectionState) -> Option<String> {
    match state {
        ConnectionState::Disconnected => Some("sync command rejected".to_string()),
        _ => None,
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_wire_message<W: AsyncWrite + Unpin>(
    msg: WireMessage,
    state: &mut ConnectionState,
    client_handle: &mut Option<u32>,
    sync_tracker: &mut Option<SyncTracker>,
    pending: &mut PendingReplies,
    pending_ping: &mut Option<(u64, Instant)>,
    store: &mut StateStore,
    event_tx: &broadcast::Sender<SessionEvent>,
    writer: &mut W,
    ready_tx: &mut Option<oneshot::Sender<SessionResult<u32>>>,
    command_timeout: Duration,
) {
    match msg {
        WireMessage::Version(_version) => {
            // informational only; the handle arrives on its own line.
        }
        WireMessage::Handle(handle) => {
            if *state == ConnectionState::AwaitingHandle {
                *client_handle = Some(handle);
                *state = ConnectionState::Syncing;
                let mut outstanding = Vec::new();
                for body in sync_commands() {
                    let seq = pending.reserve_seq();
                    let line = render_command_line(seq, &body);
                    if writer.write_all(&encode_line(&line)).await.is_err() {
                        continue;
                    }
                    outstanding.push(seq);
                }
                *sync_tracker = Some(SyncTracker { outstanding });
                let _ = command_timeout; // sync replies share the actor's normal pending-reply timeout
            }
        }
        WireMessage::Reply(reply) => {
            if let Some((seq, _)) = *pending_ping {
                if seq == reply.seq {
                    if reply.code.is_accepted() {
                        *pending_ping = None;
                    }
                    return;
                }
            }
            if let Some(tracker) = sync_tracker.as_mut() {
                if let Some(pos) = tracker.outstanding.iter().position(|s| *s == reply.seq) {
                    if !reply.code.is_accepted() {
                        tracing::warn!(seq = reply.seq, code = reply.code.0, "sync subscription rejected");
                        *state = ConnectionState::Disconnected;
                        if let Some(tx) = ready_tx.take() {
                            let _ = tx.send(Err(SessionError::ConnectionFailed(format!(
                                "sync command rejected: {}",
                                reply.code.description()
                            ))));
                        }
                    } else {
                        tracker.outstanding.remove(pos);
                        if tracker.is_done() && *state == ConnectionState::Syncing {
                            *state = ConnectionState::EstablishingDataPlane;
                            let handle = client_handle.unwrap_or(0);
                            if let Some(tx) = ready_tx.take() {
                                let _ = tx.send(Ok(handle));
                            }
                            let _ = event_tx.send(SessionEvent::HandshakeComplete { client_handle: handle });
                        }
                    }
                    return;
                }
            }
            // Not a sync reply or ping ack: an application command's reply.
            pending.resolve(reply);
        }
        WireMessage::Notice(notice) => {
            let _ = event_tx.send(SessionEvent::Notice(notice));
        }
        WireMessage::Status(status) => {
            let line: StatusLine = flex_protocol::tokenize(&status.payload);
            let event = store.apply(&line);
            let _ = event_tx.send(SessionEvent::Entity(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radio_lines(client_handle: &str) -> Vec<String> {
        let mut lines = vec!["V3.10.10".to_string(), format!("H{client_handle}")];
        for seq in 1..=(8 + SUBSCRIBE_SOURCES.len()) {
            lines.push(format!("R{seq}|0|"));
        }
        lines
    }

    #[tokio::test]
    async fn handshake_reaches_establishing_data_plane_with_client_handle() {
        let (mut server, client) = tokio::io::duplex(64 * 1024);
        let session = tokio::spawn(connect(client));

        for line in radio_lines("0x7F7C21E0") {
            server.write_all(format!("{line}\n").as_bytes()).await.unwrap();
        }

        let handle = session.await.unwrap().unwrap();
        assert_eq!(handle.client_handle(), 0x7F7C21E0);
        handle.attach_data_plane().await.unwrap();
        let _ = server;
    }

    #[tokio::test]
    async fn rejected_subscription_fails_connect() {
        let (mut server, client) = tokio::io::duplex(64 * 1024);
        let session = tokio::spawn(connect(client));

        server.write_all(b"V3.10.10\n").await.unwrap();
        server.write_all(b"H0x00000001\n").await.unwrap();
        server.write_all(b"R1|50000001|Unable to assign slice\n").await.unwrap();

        let result = session.await.unwrap();
        assert!(result.is_err());
        let _ = server;
    }
}
