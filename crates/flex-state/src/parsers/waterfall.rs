//! Waterfall entity: a scrolling spectrogram bound to a panadapter.

use flex_protocol::StatusLine;

use crate::attrs::{float, integer, truthy};
use crate::snapshot::EntitySnapshot;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct WaterfallSnapshot {
    pub stream_id: u32,
    pub panadapter_stream_id: u32,
    pub color_gain: u32,
    pub auto_black: bool,
    pub black_level: u32,
    pub gradient_index: u32,
    pub line_duration_ms: u32,
    pub x_pixels: u32,
    pub center_mhz: f64,
    pub bandwidth_mhz: f64,
}

const SOURCE: &str = "waterfall";

impl EntitySnapshot for WaterfallSnapshot {
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
        if let Some(raw) = line.attr("panadapter") {
            if let Ok(id) = u32::from_str_radix(raw, 16) {
                if next.panadapter_stream_id != id {
                    next.panadapter_stream_id = id;
                    diff.push("panadapter_stream_id");
                }
            }
        }
        if let Some(v) = integer(line, SOURCE, "color_gain") {
            if next.color_gain != v as u32 {
                next.color_gain = v as u32;
                diff.push("color_gain");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "auto_black") {
            if next.auto_black != v {
                next.auto_black = v;
                diff.push("auto_black");
            }
        }
        if let Some(v) = integer(line, SOURCE, "black_level") {
            if next.black_level != v as u32 {
                next.black_level = v as u32;
                diff.push("black_level");
            }
        }
        if let Some(v) = integer(line, SOURCE, "gradient_index") {
            if next.gradient_index != v as u32 {
                next.gradient_index = v as u32;
                diff.push("gradient_index");
            }
        }
        if let Some(v) = integer(line, SOURCE, "line_duration") {
            if next.line_duration_ms != v as u32 {
                next.line_duration_ms = v as u32;
                diff.push("line_duration_ms");
            }
        }
        if let Some(v) = integer(line, SOURCE, "x_pixels") {
            if next.x_pixels != v as u32 {
                next.x_pixels = v as u32;
                diff.push("x_pixels");
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

        (next, diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flex_protocol::tokenize;

    #[test]
    fn color_gain_and_black_level_update() {
        let (snap, diff) = WaterfallSnapshot::apply(None, &tokenize("waterfall 40000002 color_gain=50 black_level=10"));
        assert_eq!(snap.color_gain, 50);
        assert_eq!(snap.black_level, 10);
        assert_eq!(diff.len(), 2);
    }
}
