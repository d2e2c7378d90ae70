//! Parsing a discovery payload's `key=value` pairs into a [`RadioDescriptor`].

use flex_protocol::{parse_truthy, tokenize};

use crate::error::{DiscoveryError, DiscoveryResult};

/// Transport a radio's control channel listens on.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TransportProtocol {
    Tcp,
    Tls,
}

/// Where a radio's control channel can be reached.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub protocol: TransportProtocol,
}

/// Whether a radio is free to connect to or already claimed.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum RadioAvailability {
    Available,
    InUse { host: Option<String>, ip: Option<String> },
}

/// One connected GUI client, as reported in a beacon's parallel
/// `gui_client_*` lists.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct GuiClient {
    pub program: String,
    pub host: String,
    pub station: String,
    pub handle: Option<u32>,
    pub ip: String,
}

/// Everything a discovery beacon reports about one radio.
#[derive(Clone, PartialEq, Debug)]
pub struct RadioDescriptor {
    pub serial: String,
    pub model: String,
    pub version: String,
    pub endpoint: Endpoint,
    pub nickname: String,
    pub callsign: String,
    pub available_slices: u8,
    pub available_panadapters: u8,
    pub discovery_protocol: String,
    pub wan_connected: bool,
    pub gui_clients: Vec<GuiClient>,
    pub availability: RadioAvailability,
}

fn require<'a>(pairs: &'a [(String, String)], key: &'static str) -> DiscoveryResult<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .ok_or(DiscoveryError::MissingKey(key))
}

fn optional<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn parse_u8(field: &'static str, value: &str) -> DiscoveryResult<u8> {
    value.trim().parse::<u8>().map_err(|_| DiscoveryError::InvalidField {
        field,
        value: value.to_string(),
    })
}

fn parse_u16(field: &'static str, value: &str) -> DiscoveryResult<u16> {
    value.trim().parse::<u16>().map_err(|_| DiscoveryError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// Split a comma-separated list, discarding empty trailing entries.
fn csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a beacon's decoded `key=value` pairs (see
/// `flex_vita::payload::discovery::decode`) into a [`RadioDescriptor`].
///
/// Unrecognized keys are ignored, matching the rest of this protocol's
/// permissive-attribute discipline; only `serial`, `model`, `ip`, and
/// `port` are mandatory.
pub fn parse(pairs: &[(String, String)]) -> DiscoveryResult<RadioDescriptor> {
    let serial = require(pairs, "serial")?.to_string();
    let model = require(pairs, "model")?.to_string();
    let ip = require(pairs, "ip")?.to_string();
    let port = parse_u16("port", require(pairs, "port")?)?;

    let protocol = match optional(pairs, "discovery_protocol") {
        Some(v) if v.eq_ignore_ascii_case("tls") => TransportProtocol::Tls,
        _ => TransportProtocol::Tcp,
    };

    let programs = optional(pairs, "gui_client_programs").map(csv).unwrap_or_default();
    let hosts = optional(pairs, "gui_client_hosts").map(csv).unwrap_or_default();
    let stations = optional(pairs, "gui_client_stations").map(csv).unwrap_or_default();
    let handles = optional(pairs, "gui_client_handles").map(csv).unwrap_or_default();
    let ips = optional(pairs, "gui_client_ips").map(csv).unwrap_or_default();

    let gui_client_count = programs.len().max(hosts.len()).max(stations.len()).max(ips.len());
    let mut gui_clients = Vec::with_capacity(gui_client_count);
    for i in 0..gui_client_count {
        gui_clients.push(GuiClient {
            program: programs.get(i).cloned().unwrap_or_default(),
            host: hosts.get(i).cloned().unwrap_or_default(),
            station: stations.get(i).cloned().unwrap_or_default(),
            handle: handles.get(i).and_then(|h| u32::from_str_radix(h.trim_start_matches("0x"), 16).ok()),
            ip: ips.get(i).cloned().unwrap_or_default(),
        });
    }

    let availability = match optional(pairs, "status") {
        Some(s) if s.eq_ignore_ascii_case("in_use") => RadioAvailability::InUse {
            host: optional(pairs, "inuse_host").map(str::to_string),
            ip: optional(pairs, "inuse_ip").map(str::to_string),
        },
        _ => RadioAvailability::Available,
    };

    Ok(RadioDescriptor {
        serial,
        model,
        version: optional(pairs, "version").unwrap_or_default().to_string(),
        endpoint: Endpoint {
            host: ip,
            port,
            protocol,
        },
        nickname: optional(pairs, "nickname").unwrap_or_default().to_string(),
        callsign: optional(pairs, "callsign").unwrap_or_default().to_string(),
        available_slices: optional(pairs, "available_slices")
            .map(|v| parse_u8("available_slices", v))
            .transpose()?
            .unwrap_or(0),
        available_panadapters: optional(pairs, "available_panadapters")
            .map(|v| parse_u8("available_panadapters", v))
            .transpose()?
            .unwrap_or(0),
        discovery_protocol: optional(pairs, "discovery_protocol").unwrap_or_default().to_string(),
        wan_connected: optional(pairs, "wan_connected")
            .and_then(parse_truthy)
            .unwrap_or(false),
        gui_clients,
        availability,
    })
}

/// Parse a beacon's raw space-separated `key=value` payload text
/// directly, reusing the status-line tokenizer since the grammars match.
pub fn parse_text(payload: &str) -> DiscoveryResult<RadioDescriptor> {
    let line = tokenize(payload);
    parse(&line.attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pairs() -> Vec<(String, String)> {
        vec![
            ("serial".to_string(), "1234-5678-9012".to_string()),
            ("model".to_string(), "FLEX-6600".to_string()),
            ("version".to_string(), "3.10.10.0".to_string()),
            ("ip".to_string(), "192.168.1.50".to_string()),
            ("port".to_string(), "4992".to_string()),
            ("nickname".to_string(), "Shack".to_string()),
            ("callsign".to_string(), "W1AW".to_string()),
            ("available_slices".to_string(), "4".to_string()),
            ("available_panadapters".to_string(), "4".to_string()),
            ("wan_connected".to_string(), "0".to_string()),
        ]
    }

    #[test]
    fn parses_required_and_optional_fields() {
        let descriptor = parse(&sample_pairs()).unwrap();
        assert_eq!(descriptor.serial, "1234-5678-9012");
        assert_eq!(descriptor.endpoint.host, "192.168.1.50");
        assert_eq!(descriptor.endpoint.port, 4992);
        assert_eq!(descriptor.available_slices, 4);
        assert!(!descriptor.wan_connected);
        assert_eq!(descriptor.availability, RadioAvailability::Available);
    }

    #[test]
    fn missing_required_key_is_an_error() {
        let pairs = vec![("model".to_string(), "FLEX-6600".to_string())];
        assert_eq!(parse(&pairs).unwrap_err(), DiscoveryError::MissingKey("serial"));
    }

    #[test]
    fn gui_client_lists_zip_into_structs() {
        let mut pairs = sample_pairs();
        pairs.push(("gui_client_programs".to_string(), "SmartSDR,SmartSDR".to_string()));
        pairs.push(("gui_client_hosts".to_string(), "desk1,desk2".to_string()));
        pairs.push(("gui_client_stations".to_string(), "Op1,Op2".to_string()));
        pairs.push(("gui_client_ips".to_string(), "10.0.0.1,10.0.0.2".to_string()));
        let descriptor = parse(&pairs).unwrap();
        assert_eq!(descriptor.gui_clients.len(), 2);
        assert_eq!(descriptor.gui_clients[1].host, "desk2");
    }

    #[test]
    fn in_use_status_carries_inuse_endpoint() {
        let mut pairs = sample_pairs();
        pairs.push(("status".to_string(), "in_use".to_string()));
        pairs.push(("inuse_host".to_string(), "desk1".to_string()));
        pairs.push(("inuse_ip".to_string(), "10.0.0.1".to_string()));
        let descriptor = parse(&pairs).unwrap();
        assert_eq!(
            descriptor.availability,
            RadioAvailability::InUse {
                host: Some("desk1".to_string()),
                ip: Some("10.0.0.1".to_string()),
            }
        );
    }
}
