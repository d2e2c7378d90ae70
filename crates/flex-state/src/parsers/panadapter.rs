//! Panadapter entity: one spectrum display's span/center and visual
//! settings, keyed by its VITA stream id.

use flex_protocol::StatusLine;

use crate::attrs::{float, integer, string, truthy};
use crate::snapshot::EntitySnapshot;

#[derive(Clone, PartialEq, Debug)]
pub struct PanadapterSnapshot {
    pub stream_id: u32,
    pub center_mhz: f64,
    pub bandwidth_mhz: f64,
    pub min_dbm: f64,
    pub max_dbm: f64,
    pub band_zoom: bool,
    pub segment_zoom: bool,
    pub x_pixels: u32,
    pub y_pixels: u32,
    pub fps: u32,
    pub weighted_average: bool,
    pub loopa: bool,
    pub loopb: bool,
    pub wide: bool,
    pub rxant: String,
    pub client_handle: u32,
}

impl Default for PanadapterSnapshot {
    fn default() -> Self {
        Self {
            stream_id: 0,
            center_mhz: 0.0,
            bandwidth_mhz: 0.0,
            min_dbm: -135.0,
            max_dbm: -40.0,
            band_zoom: false,
            segment_zoom: false,
            x_pixels: 0,
            y_pixels: 0,
            fps: 0,
            weighted_average: false,
            loopa: false,
            loopb: false,
            wide: false,
            rxant: String::new(),
            client_handle: 0,
        }
    }
}

const SOURCE: &str = "pan";

impl EntitySnapshot for PanadapterSnapshot {
    const SOURCE: &'static str = SOURCE;

    fn apply(previous: Option<&Self>, line: &StatusLine) -> (Self, Vec<&'static str>) {
        let mut next = previous.cloned().unwrap_or_default();
        let mut diff = Vec::new();

        if let Some(id) = line.positional.first().and_then(|t| u32::from_str_radix(t, 16).ok()) {
            if next.stream_id != id {
                next.stream_id = id;
                diff.push("stream_id");
            }
        }
        if let Some(v) = float(line, SOURCE, "center") {
            if next.center_mhz != v {
                next.center_mhz = v;
                diff.push("center_mhz");
            }
        }
        if let Some(v) = float(line, SOURCE, "bandwidth") {
            if next.bandwidth_mhz != v {
                next.bandwidth_mhz = v;
                diff.push("bandwidth_mhz");
            }
        }
        if let Some(v) = float(line, SOURCE, "min_dbm") {
            if next.min_dbm != v {
                next.min_dbm = v;
                diff.push("min_dbm");
            }
        }
        if let Some(v) = float(line, SOURCE, "max_dbm") {
            if next.max_dbm != v {
                next.max_dbm = v;
                diff.push("max_dbm");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "band_zoom") {
            if next.band_zoom != v {
                next.band_zoom = v;
                diff.push("band_zoom");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "segment_zoom") {
            if next.segment_zoom != v {
                next.segment_zoom = v;
                diff.push("segment_zoom");
            }
        }
        if let Some(v) = integer(line, SOURCE, "x_pixels") {
            if next.x_pixels != v as u32 {
                next.x_pixels = v as u32;
                diff.push("x_pixels");
            }
        }
        if let Some(v) = integer(line, SOURCE, "y_pixels") {
            if next.y_pixels != v as u32 {
                next.y_pixels = v as u32;
                diff.push("y_pixels");
            }
        }
        if let Some(v) = integer(line, SOURCE, "fps") {
            if next.fps != v as u32 {
                next.fps = v as u32;
                diff.push("fps");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "weighted_average") {
            if next.weighted_average != v {
                next.weighted_average = v;
                diff.push("weighted_average");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "loopa") {
            if next.loopa != v {
                next.loopa = v;
                diff.push("loopa");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "loopb") {
            if next.loopb != v {
                next.loopb = v;
                diff.push("loopb");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "wide") {
            if next.wide != v {
                next.wide = v;
                diff.push("wide");
            }
        }
        if let Some(v) = string(line, "rxant") {
            if next.rxant != v {
                next.rxant = v;
                diff.push("rxant");
            }
        }
        if let Some(v) = integer(line, SOURCE, "client_handle") {
            if next.client_handle != v as u32 {
                next.client_handle = v as u32;
                diff.push("client_handle");
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
    fn stream_id_parsed_as_hex_positional() {
        let (snap, diff) = PanadapterSnapshot::apply(None, &tokenize("pan 40000001 center=14.250000 bandwidth=0.200000"));
        assert_eq!(snap.stream_id, 0x4000_0001);
        assert_eq!(snap.center_mhz, 14.25);
        assert!(diff.contains(&"center_mhz"));
    }
}
