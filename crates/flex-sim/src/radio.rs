//! A fake radio: just enough of the control-channel grammar and VITA
//! framing to drive a session through handshake, sync, and a handful of
//! commands without a real box on the bench.
//!
//! Mirrors `cat_sim::radio::VirtualRadio`'s shape: mutable state plus a
//! `pending_output` queue that setters push onto only when a value
//! actually changes, drained by the caller via `take_output`.

use std::collections::{HashMap, VecDeque};

use flex_vita::header::{Header, PacketType, TsfType, TsiType};
use flex_vita::payload::meter::MeterSample;
use flex_vita::payload::Payload;
use flex_vita::{ClassId, Packet};

/// Static identity a [`VirtualRadio`] reports at handshake and in its
/// discovery beacon.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct VirtualRadioConfig {
    pub serial: String,
    pub model: String,
    pub version: String,
    pub nickname: String,
    pub callsign: String,
    pub client_handle: u32,
}

impl Default for VirtualRadioConfig {
    fn default() -> Self {
        Self {
            serial: "1234-5678-9012-3456".to_string(),
            model: "FLEX-6600".to_string(),
            version: "3.10.10.0".to_string(),
            nickname: "FlexRadio".to_string(),
            callsign: "N0CALL".to_string(),
            client_handle: 0x7F7C_21E0,
        }
    }
}

/// One slice's tunable state, as tracked by the fake radio.
#[derive(Clone, PartialEq, Debug)]
pub struct SliceState {
    pub frequency_mhz: f64,
    pub mode: String,
    pub filter_lo: i64,
    pub filter_hi: i64,
    pub rf_gain: i32,
    pub active: bool,
}

impl Default for SliceState {
    fn default() -> Self {
        Self {
            frequency_mhz: 14.074,
            mode: "USB".to_string(),
            filter_lo: 100,
            filter_hi: 2_900,
            rf_gain: 0,
            active: true,
        }
    }
}

/// A scripted, in-memory stand-in for a FlexRadio's control channel and
/// VITA data plane.
///
/// Accepts command lines one at a time via [`VirtualRadio::accept_command`]
/// and answers with the reply (and any status broadcasts it provokes);
/// everything else it wants to say unprompted (periodic meter samples,
/// asynchronous slice status) goes through `queue_status` and is drained
/// with [`VirtualRadio::take_output`].
pub struct VirtualRadio {
    config: VirtualRadioConfig,
    handshake_sent: bool,
    slices: HashMap<u32, SliceState>,
    pending_output: VecDeque<String>,
}

impl VirtualRadio {
    pub fn new(config: VirtualRadioConfig) -> Self {
        let mut slices = HashMap::new();
        slices.insert(0, SliceState::default());
        Self {
            config,
            handshake_sent: false,
            slices,
            pending_output: VecDeque::new(),
        }
    }

    pub fn serial(&self) -> &str {
        &self.config.serial
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn client_handle(&self) -> u32 {
        self.config.client_handle
    }

    pub fn slice(&self, id: u32) -> Option<&SliceState> {
        self.slices.get(&id)
    }

    /// `V<version>` and `H<handle>`, sent once at connect. Idempotent:
    /// calling this twice returns the lines only on the first call.
    pub fn handshake_lines(&mut self) -> Vec<String> {
        if self.handshake_sent {
            return Vec::new();
        }
        self.handshake_sent = true;
        vec![
            format!("V{}", self.config.version),
            format!("H0x{:08X}", self.config.client_handle),
        ]
    }

    /// Feed one command line (without its trailing `\n`, `C<seq>|<body>`
    /// shape) and get back the lines to write in response: the reply,
    /// and any status broadcast the command provokes.
    pub fn accept_command(&mut self, raw: &str) -> Vec<String> {
        let Some(rest) = raw.strip_prefix('C') else {
            return Vec::new();
        };
        let Some((seq_str, body)) = rest.split_once('|') else {
            return Vec::new();
        };
        let seq: u64 = seq_str.parse().unwrap_or(0);

        match self.dispatch(body) {
            Ok(Some(status)) => vec![format!("R{seq}|0|"), status],
            Ok(None) => vec![format!("R{seq}|0|")],
            Err(reason) => vec![format!("R{seq}|50000001|{reason}")],
        }
    }

    fn dispatch(&mut self, body: &str) -> Result<Option<String>, String> {
        let mut tokens = body.split_whitespace();
        match tokens.next() {
            Some("slice") => self.dispatch_slice(tokens.collect::<Vec<_>>().as_slice(), body),
            Some("sub") | Some("ping") | Some("keepalive") | Some("client") | Some("info")
            | Some("version") | Some("ant") | Some("mic") | Some("profile") | Some("radio")
            | Some("mixer") | Some("eq") | Some("apd") | Some("interlock") | Some("transmit")
            | Some("display") | Some("stream") => Ok(None),
            _ => Err(format!("unrecognized command: {body}")),
        }
    }

    fn dispatch_slice(&mut self, args: &[&str], body: &str) -> Result<Option<String>, String> {
        match args.first() {
            Some(&"tune") => {
                let id: u32 = args.get(1).and_then(|s| s.parse().ok()).ok_or_else(|| format!("bad slice id in: {body}"))?;
                let freq: f64 = args.get(2).and_then(|s| s.parse().ok()).ok_or_else(|| format!("bad frequency in: {body}"))?;
                let slice = self.slices.entry(id).or_default();
                if slice.frequency_mhz != freq {
                    slice.frequency_mhz = freq;
                    return Ok(Some(format!("S0|slice {id} RF_frequency={freq:.6}")));
                }
                Ok(None)
            }
            Some(&"set") => {
                let id: u32 = args.get(1).and_then(|s| s.parse().ok()).ok_or_else(|| format!("bad slice id in: {body}"))?;
                let slice = self.slices.entry(id).or_default();
                let mut changed = Vec::new();
                for attr in &args[2..] {
                    let Some((key, value)) = attr.split_once('=') else { continue };
                    match key {
                        "mode" => {
                            if slice.mode != value {
                                slice.mode = value.to_string();
                                changed.push(format!("mode={value}"));
                            }
                        }
                        "filter_lo" => {
                            if let Ok(v) = value.parse() {
                                if slice.filter_lo != v {
                                    slice.filter_lo = v;
                                    changed.push(format!("filter_lo={v}"));
                                }
                            }
                        }
                        "filter_hi" => {
                            if let Ok(v) = value.parse() {
                                if slice.filter_hi != v {
                                    slice.filter_hi = v;
                                    changed.push(format!("filter_hi={v}"));
                                }
                            }
                        }
                        "rfgain" => {
                            if let Ok(v) = value.parse() {
                                if slice.rf_gain != v {
                                    slice.rf_gain = v;
                                    changed.push(format!("rfgain={v}"));
                                }
                            }
                        }
                        _ => {}
                    }
                }
                if changed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(format!("S0|slice {id} {}", changed.join(" "))))
                }
            }
            Some(&"lock") | Some(&"unlock") | Some(&"auto_tune") => Ok(None),
            _ => Err(format!("unrecognized slice command: {body}")),
        }
    }

    /// Queue an unprompted status broadcast (e.g. an owner-changed line
    /// from another client), to be picked up by the next `take_output`.
    pub fn queue_status(&mut self, line: impl Into<String>) {
        self.pending_output.push_back(line.into());
    }

    /// Build and queue a meter status VITA packet is overkill for the
    /// control channel; meter samples go out on the data plane instead —
    /// see [`VirtualRadio::encode_meter_packet`].
    pub fn encode_meter_packet(&self, samples: &[MeterSample]) -> Vec<u8> {
        let packet = Packet {
            header: Header {
                packet_type: PacketType::ExtDataWithStream,
                has_class_id: true,
                has_trailer: false,
                tsi: TsiType::None,
                tsf: TsfType::None,
                packet_count: 0,
                packet_size: 0,
            },
            stream_id: Some(0),
            class_id: Some(ClassId {
                oui: 0x00_1C2D,
                information_class_code: 0x534C,
                packet_class_code: 0x8002,
            }),
            integer_timestamp: None,
            fractional_timestamp: None,
            payload: Payload::Meter(samples.to_vec()),
            trailer: None,
        };
        packet.encode()
    }

    /// Encode this radio's current identity as a discovery beacon's
    /// UDP payload (without VITA framing — see `flex_discovery::beacon`
    /// for the decoded shape this payload parses back into).
    pub fn encode_discovery_payload(&self, ip: &str, port: u16) -> Vec<u8> {
        let pairs = vec![
            ("serial".to_string(), self.config.serial.clone()),
            ("model".to_string(), self.config.model.clone()),
            ("version".to_string(), self.config.version.clone()),
            ("nickname".to_string(), self.config.nickname.clone()),
            ("callsign".to_string(), self.config.callsign.clone()),
            ("ip".to_string(), ip.to_string()),
            ("port".to_string(), port.to_string()),
            ("discovery_protocol_version".to_string(), "3.0.0.1".to_string()),
            ("status".to_string(), "Available".to_string()),
            ("max_licensed_version".to_string(), self.config.version.clone()),
            ("radio_license_id".to_string(), "00000000".to_string()),
            ("requires_additional_license".to_string(), "0".to_string()),
            ("fpc_mac".to_string(), "00:1C:2D:00:00:00".to_string()),
            ("wan_connected".to_string(), "0".to_string()),
            ("licensed_clients".to_string(), "2".to_string()),
            ("available_clients".to_string(), "2".to_string()),
            ("max_panadapters".to_string(), "4".to_string()),
            ("available_panadapters".to_string(), "4".to_string()),
            ("max_slices".to_string(), "4".to_string()),
            ("available_slices".to_string(), "4".to_string()),
        ];
        flex_vita::payload::discovery::encode(&pairs)
    }

    pub fn has_output(&self) -> bool {
        !self.pending_output.is_empty()
    }

    pub fn output_count(&self) -> usize {
        self.pending_output.len()
    }

    pub fn take_output(&mut self) -> Vec<String> {
        self.pending_output.drain(..).collect()
    }

    pub fn clear_output(&mut self) {
        self.pending_output.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_is_sent_once() {
        let mut radio = VirtualRadio::new(VirtualRadioConfig::default());
        let first = radio.handshake_lines();
        assert_eq!(first.len(), 2);
        assert!(first[0].starts_with('V'));
        assert!(first[1].starts_with("H0x"));
        assert!(radio.handshake_lines().is_empty());
    }

    #[test]
    fn slice_tune_changes_produce_a_status_broadcast() {
        let mut radio = VirtualRadio::new(VirtualRadioConfig::default());
        let lines = radio.accept_command("C1|slice tune 0 14.250000");
        assert_eq!(lines, vec!["R1|0|".to_string(), "S0|slice 0 RF_frequency=14.250000".to_string()]);
        assert_eq!(radio.slice(0).unwrap().frequency_mhz, 14.25);
    }

    #[test]
    fn slice_tune_to_the_same_frequency_is_silent() {
        let mut radio = VirtualRadio::new(VirtualRadioConfig::default());
        let freq = radio.slice(0).unwrap().frequency_mhz;
        let lines = radio.accept_command(&format!("C1|slice tune 0 {freq:.6}"));
        assert_eq!(lines, vec!["R1|0|".to_string()]);
    }

    #[test]
    fn slice_set_reports_only_changed_attrs() {
        let mut radio = VirtualRadio::new(VirtualRadioConfig::default());
        let lines = radio.accept_command("C2|slice set 0 mode=USB rfgain=20");
        assert_eq!(lines, vec!["R2|0|".to_string(), "S0|slice 0 rfgain=20".to_string()]);
    }

    #[test]
    fn unrecognized_command_is_rejected() {
        let mut radio = VirtualRadio::new(VirtualRadioConfig::default());
        let lines = radio.accept_command("C3|frobnicate");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("R3|50000001|"));
    }

    #[test]
    fn sync_commands_are_acknowledged_without_error() {
        let mut radio = VirtualRadio::new(VirtualRadioConfig::default());
        for (seq, cmd) in ["info", "version", "ant list", "sub slice all", "ping"].iter().enumerate() {
            let lines = radio.accept_command(&format!("C{}|{}", seq + 1, cmd));
            assert_eq!(lines, vec![format!("R{}|0|", seq + 1)]);
        }
    }

    #[test]
    fn discovery_payload_round_trips_through_flex_discovery() {
        let radio = VirtualRadio::new(VirtualRadioConfig::default());
        let bytes = radio.encode_discovery_payload("192.168.1.50", 4992);
        let pairs = flex_vita::payload::discovery::decode(&bytes).unwrap();
        let descriptor = flex_discovery::beacon::parse(&pairs).unwrap();
        assert_eq!(descriptor.serial, "1234-5678-9012-3456");
        assert_eq!(descriptor.endpoint.port, 4992);
    }

    #[test]
    fn meter_packet_encodes_as_meter_class() {
        let radio = VirtualRadio::new(VirtualRadioConfig::default());
        let bytes = radio.encode_meter_packet(&[MeterSample { id: 1, value: -42 }]);
        let packet = Packet::decode(&bytes).unwrap();
        assert_eq!(packet.class_id.unwrap().packet_class(), flex_vita::PacketClass::Meter);
        match packet.payload {
            Payload::Meter(samples) => assert_eq!(samples, vec![MeterSample { id: 1, value: -42 }]),
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
