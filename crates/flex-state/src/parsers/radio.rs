//! Radio entity: the singleton top-level record, plus its
//! context-sensitive sub-entities dispatched by the first positional
//! token (`gps`, `filter_sharpness <domain>`, `static_net_params`,
//! `oscillator`, `atu`). Interlock and transmit arrive as their own
//! top-level sources (see [`crate::parsers::interlock`] and
//! [`crate::parsers::transmit`]) and are not duplicated here.

use flex_protocol::StatusLine;

use crate::attrs::{clamp_i32, float, integer, string, truthy};
use crate::snapshot::EntitySnapshot;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct GpsInfo {
    pub installed: bool,
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
    pub satellites_tracked: u8,
    pub satellites_visible: u8,
    pub speed: f64,
    pub freq_error: f64,
    pub time: String,
    pub track: f64,
    pub status: String,
}

/// Per-domain receive filter sharpness level, `0..=3`.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct FilterSharpnessLevel {
    pub level: u8,
    pub auto_level: bool,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct FilterSharpness {
    pub voice: FilterSharpnessLevel,
    pub cw: FilterSharpnessLevel,
    pub digital: FilterSharpnessLevel,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct StaticNetParams {
    pub ip: String,
    pub gateway: String,
    pub netmask: String,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct OscillatorInfo {
    pub state: String,
    pub offset: i32,
    pub locked: bool,
    pub setting: String,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct AtuInfo {
    pub status: String,
    pub using_mem: bool,
    pub memories_enabled: bool,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct RadioSnapshot {
    pub name: String,
    pub callsign: String,
    pub model: String,
    pub serial: String,
    pub options: String,
    pub region: String,
    pub screensaver: String,
    pub mox: bool,
    pub tnf_enabled: bool,
    pub full_duplex_enabled: bool,
    pub mf_enabled: bool,
    pub low_latency_digital_modes: bool,
    pub gps: GpsInfo,
    pub filter_sharpness: FilterSharpness,
    pub static_net_params: StaticNetParams,
    pub oscillator: OscillatorInfo,
    pub atu: AtuInfo,
}

const SOURCE: &str = "radio";

fn apply_gps(gps: &mut GpsInfo, line: &StatusLine, diff: &mut Vec<&'static str>) {
    if let Some(v) = truthy(line, SOURCE, "gpsinstalled") {
        if gps.installed != v {
            gps.installed = v;
            diff.push("gps.installed");
        }
    }
    if let Some(v) = float(line, SOURCE, "lat") {
        if gps.lat != v {
            gps.lat = v;
            diff.push("gps.lat");
        }
    }
    if let Some(v) = float(line, SOURCE, "lon") {
        if gps.lon != v {
            gps.lon = v;
            diff.push("gps.lon");
        }
    }
    if let Some(v) = float(line, SOURCE, "altitude") {
        if gps.altitude != v {
            gps.altitude = v;
            diff.push("gps.altitude");
        }
    }
    if let Some(v) = integer(line, SOURCE, "tracked") {
        if gps.satellites_tracked != v as u8 {
            gps.satellites_tracked = v as u8;
            diff.push("gps.satellites_tracked");
        }
    }
    if let Some(v) = integer(line, SOURCE, "visible") {
        if gps.satellites_visible != v as u8 {
            gps.satellites_visible = v as u8;
            diff.push("gps.satellites_visible");
        }
    }
    if let Some(v) = float(line, SOURCE, "speed") {
        if gps.speed != v {
            gps.speed = v;
            diff.push("gps.speed");
        }
    }
    if let Some(v) = float(line, SOURCE, "freq_error") {
        if gps.freq_error != v {
            gps.freq_error = v;
            diff.push("gps.freq_error");
        }
    }
    if let Some(v) = string(line, "time") {
        if gps.time != v {
            gps.time = v;
            diff.push("gps.time");
        }
    }
    if let Some(v) = float(line, SOURCE, "track") {
        if gps.track != v {
            gps.track = v;
            diff.push("gps.track");
        }
    }
    if let Some(v) = string(line, "status") {
        if gps.status != v {
            gps.status = v;
            diff.push("gps.status");
        }
    }
}

fn apply_filter_sharpness_level(level: &mut FilterSharpnessLevel, line: &StatusLine, domain: &'static str, diff: &mut Vec<&'static str>) {
    if let Some(v) = integer(line, SOURCE, "level") {
        let clamped = clamp_i32(SOURCE, domain, v as i32, 0, 3) as u8;
        if level.level != clamped {
            level.level = clamped;
            diff.push(domain);
        }
    }
    if let Some(v) = truthy(line, SOURCE, "auto_level") {
        if level.auto_level != v {
            level.auto_level = v;
            diff.push(domain);
        }
    }
}

fn apply_static_net_params(params: &mut StaticNetParams, line: &StatusLine, diff: &mut Vec<&'static str>) {
    if let Some(v) = string(line, "ip") {
        if params.ip != v {
            params.ip = v;
            diff.push("static_net_params.ip");
        }
    }
    if let Some(v) = string(line, "gateway") {
        if params.gateway != v {
            params.gateway = v;
            diff.push("static_net_params.gateway");
        }
    }
    if let Some(v) = string(line, "netmask") {
        if params.netmask != v {
            params.netmask = v;
            diff.push("static_net_params.netmask");
        }
    }
}

fn apply_oscillator(osc: &mut OscillatorInfo, line: &StatusLine, diff: &mut Vec<&'static str>) {
    if let Some(v) = string(line, "state") {
        if osc.state != v {
            osc.state = v;
            diff.push("oscillator.state");
        }
    }
    if let Some(v) = integer(line, SOURCE, "offset") {
        if osc.offset != v as i32 {
            osc.offset = v as i32;
            diff.push("oscillator.offset");
        }
    }
    if let Some(v) = truthy(line, SOURCE, "locked") {
        if osc.locked != v {
            osc.locked = v;
            diff.push("oscillator.locked");
        }
    }
    if let Some(v) = string(line, "setting") {
        if osc.setting != v {
            osc.setting = v;
            diff.push("oscillator.setting");
        }
    }
}

fn apply_atu(atu: &mut AtuInfo, line: &StatusLine, diff: &mut Vec<&'static str>) {
    if let Some(v) = string(line, "status") {
        if atu.status != v {
            atu.status = v;
            diff.push("atu.status");
        }
    }
    if let Some(v) = truthy(line, SOURCE, "using_mem") {
        if atu.using_mem != v {
            atu.using_mem = v;
            diff.push("atu.using_mem");
        }
    }
    if let Some(v) = truthy(line, SOURCE, "memories_enabled") {
        if atu.memories_enabled != v {
            atu.memories_enabled = v;
            diff.push("atu.memories_enabled");
        }
    }
}

impl EntitySnapshot for RadioSnapshot {
    const SOURCE: &'static str = SOURCE;

    fn apply(previous: Option<&Self>, line: &StatusLine) -> (Self, Vec<&'static str>) {
        let mut next = previous.cloned().unwrap_or_default();
        let mut diff = Vec::new();

        match line.positional.first().map(String::as_str) {
            Some("gps") => apply_gps(&mut next.gps, line, &mut diff),
            Some("filter_sharpness") => match line.positional.get(1).map(String::as_str) {
                Some("voice") => apply_filter_sharpness_level(&mut next.filter_sharpness.voice, line, "filter_sharpness.voice", &mut diff),
                Some("cw") => apply_filter_sharpness_level(&mut next.filter_sharpness.cw, line, "filter_sharpness.cw", &mut diff),
                Some("digital") => {
                    apply_filter_sharpness_level(&mut next.filter_sharpness.digital, line, "filter_sharpness.digital", &mut diff)
                }
                other => tracing::debug!(source = SOURCE, domain = ?other, "unknown filter_sharpness domain"),
            },
            Some("static_net_params") => apply_static_net_params(&mut next.static_net_params, line, &mut diff),
            Some("oscillator") => apply_oscillator(&mut next.oscillator, line, &mut diff),
            Some("atu") => apply_atu(&mut next.atu, line, &mut diff),
            Some(other) => tracing::debug!(source = SOURCE, context = other, "unhandled radio sub-entity"),
            None => {
                if let Some(v) = string(line, "name") {
                    if next.name != v {
                        next.name = v;
                        diff.push("name");
                    }
                }
                if let Some(v) = string(line, "callsign") {
                    if next.callsign != v {
                        next.callsign = v;
                        diff.push("callsign");
                    }
                }
                if let Some(v) = string(line, "model") {
                    if next.model != v {
                        next.model = v;
                        diff.push("model");
                    }
                }
                if let Some(v) = string(line, "serial") {
                    if next.serial != v {
                        next.serial = v;
                        diff.push("serial");
                    }
                }
                if let Some(v) = string(line, "options") {
                    if next.options != v {
                        next.options = v;
                        diff.push("options");
                    }
                }
                if let Some(v) = string(line, "region") {
                    if next.region != v {
                        next.region = v;
                        diff.push("region");
                    }
                }
                if let Some(v) = string(line, "screensaver") {
                    if next.screensaver != v {
                        next.screensaver = v;
                        diff.push("screensaver");
                    }
                }
                if let Some(v) = truthy(line, SOURCE, "mox") {
                    if next.mox != v {
                        next.mox = v;
                        diff.push("mox");
                    }
                }
                if let Some(v) = truthy(line, SOURCE, "tnf_enabled") {
                    if next.tnf_enabled != v {
                        next.tnf_enabled = v;
                        diff.push("tnf_enabled");
                    }
                }
                if let Some(v) = truthy(line, SOURCE, "full_duplex_enabled") {
                    if next.full_duplex_enabled != v {
                        next.full_duplex_enabled = v;
                        diff.push("full_duplex_enabled");
                    }
                }
                if let Some(v) = truthy(line, SOURCE, "mf_enabled") {
                    if next.mf_enabled != v {
                        next.mf_enabled = v;
                        diff.push("mf_enabled");
                    }
                }
                if let Some(v) = truthy(line, SOURCE, "low_latency_digital_modes") {
                    if next.low_latency_digital_modes != v {
                        next.low_latency_digital_modes = v;
                        diff.push("low_latency_digital_modes");
                    }
                }
            }
        }

        (next, diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flex_protocol::tokenize;

    #[test]
    fn gps_sub_entity_updates_under_radio_source() {
        let (snap, diff) = RadioSnapshot::apply(None, &tokenize("radio gps lat=12.34 lon=-98.7"));
        assert_eq!(snap.gps.lat, 12.34);
        assert_eq!(snap.gps.lon, -98.7);
        assert!(diff.contains(&"gps.lat"));
    }

    #[test]
    fn filter_sharpness_level_clamps_to_three() {
        let (snap, diff) = RadioSnapshot::apply(None, &tokenize("radio filter_sharpness voice level=7 auto_level=0"));
        assert_eq!(snap.filter_sharpness.voice.level, 3);
        assert!(diff.contains(&"filter_sharpness.voice"));
    }

    #[test]
    fn bare_radio_line_updates_top_level_fields() {
        let (snap, diff) = RadioSnapshot::apply(None, &tokenize("radio name=Shack callsign=W1AW"));
        assert_eq!(snap.name, "Shack");
        assert_eq!(snap.callsign, "W1AW");
        assert!(diff.contains(&"name"));
    }
}
