//! Top-level facade for this crate family: start/stop discovery, enumerate
//! radios, and vend [`flex_session::SessionHandle`]s keyed by serial.
//!
//! Grounded on the teacher's `cat-desktop` app owning a `Multiplexer` +
//! `PortScanner` side by side, minus every `eframe`/`egui` type: this
//! facade owns a discovery table and a TCP dialer, and nothing else.

pub mod error;

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;

use flex_discovery::{DiscoveryEvent, DiscoveryTable, RadioDescriptor, TransportProtocol, DEFAULT_OFFLINE_TIMEOUT};
use flex_session::SessionHandle;

pub use error::{ClientError, ClientResult};

/// The multicast group FlexRadio discovery beacons are sent to.
pub const DISCOVERY_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 1, 1, 1);
/// The UDP port discovery beacons and a radio's control channel both use.
pub const DISCOVERY_PORT: u16 = 4992;
/// How often the discovery table is swept for offline radios.
const SWEEP_INTERVAL: Duration = Duration::from_millis(1000);

/// A discovery lifecycle event, re-exported from `flex-discovery` so
/// callers only need one crate's event type.
pub type ClientEvent = DiscoveryEvent;

struct DiscoveryTask {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// The application's single entry point: starts/stops discovery,
/// enumerates reachable radios, and opens sessions by serial.
pub struct Client {
    table: Arc<Mutex<DiscoveryTable>>,
    event_tx: broadcast::Sender<ClientEvent>,
    discovery: Option<DiscoveryTask>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Build a client with no discovery running yet.
    pub fn new() -> Self {
        Self::with_offline_timeout(DEFAULT_OFFLINE_TIMEOUT)
    }

    /// Build a client whose discovery table expires radios after
    /// `offline_timeout` without a beacon (spec.md §4.2 default is ~4x the
    /// 1 Hz beacon cadence).
    pub fn with_offline_timeout(offline_timeout: Duration) -> Self {
        let (event_tx, _rx) = broadcast::channel(256);
        Self {
            table: Arc::new(Mutex::new(DiscoveryTable::new(offline_timeout))),
            event_tx,
            discovery: None,
        }
    }

    /// Subscribe to discovery lifecycle events (`online` / `change` /
    /// `offline`).
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.event_tx.subscribe()
    }

    /// The radios currently known to be reachable.
    pub async fn radios(&self) -> Vec<RadioDescriptor> {
        self.table.lock().await.radios().cloned().collect()
    }

    /// A specific radio's descriptor, if known.
    pub async fn radio(&self, serial: &str) -> Option<RadioDescriptor> {
        self.radios().await.into_iter().find(|d| d.serial == serial)
    }

    /// Start listening for discovery beacons on [`DISCOVERY_MULTICAST_ADDR`]
    /// and periodically sweeping the table for offline radios. A no-op if
    /// discovery is already running.
    pub async fn start_discovery(&mut self) -> ClientResult<()> {
        if self.discovery.is_some() {
            return Ok(());
        }
        let socket = bind_discovery_socket().await?;
        self.start_discovery_with_socket(socket)
    }

    /// Like [`Client::start_discovery`], taking an already-bound socket —
    /// useful for tests that bind to an ephemeral port instead of the
    /// well-known multicast group.
    pub fn start_discovery_with_socket(&mut self, socket: UdpSocket) -> ClientResult<()> {
        if self.discovery.is_some() {
            return Ok(());
        }
        let (stop_tx, stop_rx) = watch::channel(false);
        let table = Arc::clone(&self.table);
        let event_tx = self.event_tx.clone();
        let handle = tokio::spawn(run_discovery(socket, table, event_tx, stop_rx));
        self.discovery = Some(DiscoveryTask { stop_tx, handle });
        Ok(())
    }

    /// Stop discovery. Awaitable: completes once the listening task has
    /// actually exited.
    pub async fn stop_discovery(&mut self) {
        if let Some(task) = self.discovery.take() {
            let _ = task.stop_tx.send(true);
            let _ = task.handle.await;
        }
    }

    /// Dial a known radio's control channel and drive it through the
    /// handshake, returning a ready-to-use session handle.
    ///
    /// The caller is still responsible for attaching the data plane
    /// ([`SessionHandle::attach_data_plane`]) once its UDP socket or WebRTC
    /// data channel is wired up; that transport is out of this crate's
    /// scope (spec.md §1).
    pub async fn connect(&self, serial: &str) -> ClientResult<SessionHandle> {
        let descriptor = self.radio(serial).await.ok_or_else(|| ClientError::UnknownRadio(serial.to_string()))?;
        self.connect_descriptor(&descriptor).await
    }

    /// Dial a radio by its discovered descriptor directly, bypassing the
    /// table lookup (useful when the caller already has one, e.g. from a
    /// [`ClientEvent::Online`]).
    pub async fn connect_descriptor(&self, descriptor: &RadioDescriptor) -> ClientResult<SessionHandle> {
        match descriptor.endpoint.protocol {
            TransportProtocol::Tcp => {
                let stream = TcpStream::connect((descriptor.endpoint.host.as_str(), descriptor.endpoint.port)).await?;
                stream.set_nodelay(true).ok();
                Ok(flex_session::connect(stream).await?)
            }
            TransportProtocol::Tls => Err(ClientError::UnsupportedTransport("tls")),
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Some(task) = self.discovery.take() {
            let _ = task.stop_tx.send(true);
            task.handle.abort();
        }
    }
}

async fn bind_discovery_socket() -> ClientResult<UdpSocket> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, DISCOVERY_PORT)).await?;
    socket.join_multicast_v4(DISCOVERY_MULTICAST_ADDR, Ipv4Addr::UNSPECIFIED)?;
    Ok(socket)
}

async fn run_discovery(
    socket: UdpSocket,
    table: Arc<Mutex<DiscoveryTable>>,
    event_tx: broadcast::Sender<ClientEvent>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut buf = [0u8; 2048];
    let mut sweep = tokio::time::interval(SWEEP_INTERVAL);
    sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            changed = stop_rx.changed() => {
                match changed {
                    Ok(()) if *stop_rx.borrow() => break,
                    Ok(()) => continue,
                    Err(_) => break,
                }
            }

            _ = sweep.tick() => {
                let events = table.lock().await.sweep();
                for event in events {
                    let _ = event_tx.send(event);
                }
            }

            received = socket.recv_from(&mut buf) => {
                match received {
                    Ok((n, _addr)) => ingest_datagram(&buf[..n], &table, &event_tx).await,
                    Err(err) => {
                        tracing::debug!(error = %err, "discovery socket read error");
                    }
                }
            }
        }
    }
}

async fn ingest_datagram(datagram: &[u8], table: &Arc<Mutex<DiscoveryTable>>, event_tx: &broadcast::Sender<ClientEvent>) {
    let packet = match flex_vita::Packet::decode(datagram) {
        Ok(packet) => packet,
        Err(err) => {
            tracing::debug!(error = %err, "malformed discovery datagram, dropping");
            return;
        }
    };
    let pairs = match &packet.payload {
        flex_vita::Payload::Discovery(pairs) => pairs,
        _ => return,
    };
    match flex_discovery::beacon::parse(pairs) {
        Ok(descriptor) => {
            if let Some(event) = table.lock().await.ingest(descriptor) {
                let _ = event_tx.send(event);
            }
        }
        Err(err) => {
            tracing::debug!(error = %err, "malformed discovery beacon, dropping");
        }
    }
}

/// In-process radio enumeration keyed by serial, handy for callers that
/// want to track `online`/`offline` transitions without re-deriving them
/// from a raw event stream.
#[derive(Default, Debug, Clone)]
pub struct RadioTable(HashMap<String, RadioDescriptor>);

impl RadioTable {
    /// Apply one discovery event, mirroring it into this materialized view.
    pub fn apply(&mut self, event: &ClientEvent) {
        match event {
            DiscoveryEvent::Online(descriptor) | DiscoveryEvent::Change { descriptor, .. } => {
                self.0.insert(descriptor.serial.clone(), descriptor.clone());
            }
            DiscoveryEvent::Offline { serial, .. } => {
                self.0.remove(serial);
            }
        }
    }

    /// The radios currently tracked.
    pub fn radios(&self) -> impl Iterator<Item = &RadioDescriptor> {
        self.0.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn connect_to_unknown_serial_is_an_error() {
        let client = Client::new();
        let err = client.connect("NOPE-0000").await.unwrap_err();
        assert!(matches!(err, ClientError::UnknownRadio(serial) if serial == "NOPE-0000"));
    }

    #[tokio::test]
    async fn radios_reflects_ingested_beacons_via_loopback_socket() {
        let server = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let server_addr = server.local_addr().unwrap();

        let mut client = Client::with_offline_timeout(StdDuration::from_secs(30));
        let listener = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let listener_addr = listener.local_addr().unwrap();
        client.start_discovery_with_socket(listener).unwrap();

        let pairs = vec![
            ("serial".to_string(), "1234-5678".to_string()),
            ("model".to_string(), "FLEX-6600".to_string()),
            ("ip".to_string(), "192.168.1.50".to_string()),
            ("port".to_string(), "4992".to_string()),
        ];
        let packet = flex_vita::Packet {
            header: flex_vita::Header {
                packet_type: flex_vita::PacketType::ExtData,
                has_class_id: true,
                has_trailer: false,
                tsi: flex_vita::TsiType::None,
                tsf: flex_vita::TsfType::None,
                packet_count: 0,
                packet_size: 0,
            },
            stream_id: None,
            class_id: Some(flex_vita::ClassId {
                oui: 0x00_1234,
                information_class_code: 0x534C,
                packet_class_code: 0xFFFF,
            }),
            integer_timestamp: None,
            fractional_timestamp: None,
            payload: flex_vita::Payload::Discovery(pairs),
            trailer: None,
        };
        let bytes = packet.encode();
        server.send_to(&bytes, listener_addr).await.unwrap();
        let _ = server_addr;

        let mut events = client.subscribe();
        let event = tokio::time::timeout(StdDuration::from_secs(2), events.recv()).await.unwrap().unwrap();
        assert!(matches!(event, DiscoveryEvent::Online(ref d) if d.serial == "1234-5678"));

        let radios = client.radios().await;
        assert_eq!(radios.len(), 1);
        assert_eq!(radios[0].serial, "1234-5678");

        client.stop_discovery().await;
    }
}
