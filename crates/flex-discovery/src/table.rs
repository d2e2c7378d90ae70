//! Deduplicated, time-bounded table of discovered radios.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::beacon::{Endpoint, RadioDescriptor};

/// Default offline timeout: roughly 4x the ~1 Hz beacon cadence.
pub const DEFAULT_OFFLINE_TIMEOUT: Duration = Duration::from_millis(4000);

/// A radio's table membership changed.
#[derive(Clone, Debug)]
pub enum DiscoveryEvent {
    /// A previously unseen serial sent its first beacon.
    Online(RadioDescriptor),
    /// A known serial's descriptor changed.
    Change {
        descriptor: RadioDescriptor,
        changed_fields: Vec<&'static str>,
        /// Set when the radio's endpoint moved (host migration).
        previous_endpoint: Option<Endpoint>,
    },
    /// No beacon arrived within the offline timeout.
    Offline {
        serial: String,
        last_endpoint: Endpoint,
    },
}

struct Entry {
    descriptor: RadioDescriptor,
    last_seen: Instant,
}

/// Tracks radios by serial, diffing beacons and expiring stale entries.
pub struct DiscoveryTable {
    offline_timeout: Duration,
    radios: HashMap<String, Entry>,
}

impl DiscoveryTable {
    /// Create a table with the given offline timeout.
    pub fn new(offline_timeout: Duration) -> Self {
        Self {
            offline_timeout,
            radios: HashMap::new(),
        }
    }

    /// The currently known radios.
    pub fn radios(&self) -> impl Iterator<Item = &RadioDescriptor> {
        self.radios.values().map(|e| &e.descriptor)
    }

    /// Feed a freshly parsed beacon into the table, returning the event
    /// it produced (`Online` for a new serial, `Change` for an updated
    /// one, or nothing if the descriptor is byte-for-byte identical to
    /// what's already on file).
    pub fn ingest(&mut self, descriptor: RadioDescriptor) -> Option<DiscoveryEvent> {
        let now = Instant::now();
        match self.radios.get_mut(&descriptor.serial) {
            None => {
                let event = DiscoveryEvent::Online(descriptor.clone());
                self.radios.insert(
                    descriptor.serial.clone(),
                    Entry {
                        descriptor,
                        last_seen: now,
                    },
                );
                Some(event)
            }
            Some(entry) => {
                entry.last_seen = now;
                let changed_fields = diff_fields(&entry.descriptor, &descriptor);
                if changed_fields.is_empty() {
                    return None;
                }
                let previous_endpoint = if entry.descriptor.endpoint != descriptor.endpoint {
                    Some(entry.descriptor.endpoint.clone())
                } else {
                    None
                };
                entry.descriptor = descriptor.clone();
                Some(DiscoveryEvent::Change {
                    descriptor,
                    changed_fields,
                    previous_endpoint,
                })
            }
        }
    }

    /// Remove and report every radio whose last beacon is older than the
    /// offline timeout. Call this periodically (e.g. once per beacon
    /// interval) to drive `Offline` events.
    pub fn sweep(&mut self) -> Vec<DiscoveryEvent> {
        let now = Instant::now();
        let expired: Vec<String> = self
            .radios
            .iter()
            .filter(|(_, e)| now.duration_since(e.last_seen) >= self.offline_timeout)
            .map(|(serial, _)| serial.clone())
            .collect();

        expired
            .into_iter()
            .filter_map(|serial| {
                self.radios.remove(&serial).map(|entry| DiscoveryEvent::Offline {
                    serial,
                    last_endpoint: entry.descriptor.endpoint,
                })
            })
            .collect()
    }
}

fn diff_fields(old: &RadioDescriptor, new: &RadioDescriptor) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if old.model != new.model {
        fields.push("model");
    }
    if old.version != new.version {
        fields.push("version");
    }
    if old.endpoint != new.endpoint {
        fields.push("endpoint");
    }
    if old.nickname != new.nickname {
        fields.push("nickname");
    }
    if old.callsign != new.callsign {
        fields.push("callsign");
    }
    if old.available_slices != new.available_slices {
        fields.push("available_slices");
    }
    if old.available_panadapters != new.available_panadapters {
        fields.push("available_panadapters");
    }
    if old.wan_connected != new.wan_connected {
        fields.push("wan_connected");
    }
    if old.gui_clients != new.gui_clients {
        fields.push("gui_clients");
    }
    if old.availability != new.availability {
        fields.push("availability");
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon::{RadioAvailability, TransportProtocol};

    fn descriptor(serial: &str, host: &str) -> RadioDescriptor {
        RadioDescriptor {
            serial: serial.to_string(),
            model: "FLEX-6600".to_string(),
            version: "3.10.10.0".to_string(),
            endpoint: Endpoint {
                host: host.to_string(),
                port: 4992,
                protocol: TransportProtocol::Tcp,
            },
            nickname: "Shack".to_string(),
            callsign: "W1AW".to_string(),
            available_slices: 4,
            available_panadapters: 4,
            discovery_protocol: String::new(),
            wan_connected: false,
            gui_clients: Vec::new(),
            availability: RadioAvailability::Available,
        }
    }

    #[test]
    fn first_beacon_for_a_serial_is_online() {
        let mut table = DiscoveryTable::new(Duration::from_millis(1000));
        let event = table.ingest(descriptor("1234", "192.168.1.50")).unwrap();
        assert!(matches!(event, DiscoveryEvent::Online(_)));
    }

    #[test]
    fn identical_repeat_beacon_produces_no_event() {
        let mut table = DiscoveryTable::new(Duration::from_millis(1000));
        table.ingest(descriptor("1234", "192.168.1.50"));
        let event = table.ingest(descriptor("1234", "192.168.1.50"));
        assert!(event.is_none());
    }

    #[test]
    fn host_migration_reports_previous_endpoint() {
        let mut table = DiscoveryTable::new(Duration::from_millis(1000));
        table.ingest(descriptor("1234", "192.168.1.50"));
        let event = table.ingest(descriptor("1234", "192.168.1.99")).unwrap();
        match event {
            DiscoveryEvent::Change {
                changed_fields,
                previous_endpoint,
                ..
            } => {
                assert!(changed_fields.contains(&"endpoint"));
                assert_eq!(previous_endpoint.unwrap().host, "192.168.1.50");
            }
            other => panic!("expected Change, got {other:?}"),
        }
    }

    #[test]
    fn sweep_reports_offline_after_timeout() {
        let mut table = DiscoveryTable::new(Duration::from_millis(1));
        table.ingest(descriptor("1234", "192.168.1.50"));
        std::thread::sleep(Duration::from_millis(5));
        let events = table.sweep();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], DiscoveryEvent::Offline { serial, .. } if serial == "1234"));
        assert_eq!(table.radios().count(), 0);
    }

    #[test]
    fn sweep_leaves_fresh_radios_alone() {
        let mut table = DiscoveryTable::new(Duration::from_millis(1000));
        table.ingest(descriptor("1234", "192.168.1.50"));
        let events = table.sweep();
        assert!(events.is_empty());
        assert_eq!(table.radios().count(), 1);
    }
}
