//! Audio stream entity: a remote audio RX/TX stream bound to a slice.

use flex_protocol::StatusLine;

use crate::attrs::{integer, truthy};
use crate::snapshot::EntitySnapshot;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct AudioStreamSnapshot {
    pub stream_id: u32,
    pub slice: String,
    pub client_handle: u32,
    pub ip: String,
    pub port: u16,
    pub compression: String,
    pub in_use: bool,
}

const SOURCE: &str = "audio_stream";

impl EntitySnapshot for AudioStreamSnapshot {
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
        if let Some(v) = line.attr("slice") {
            if next.slice != v {
                next.slice = v.to_string();
                diff.push("slice");
            }
        }
        if let Some(v) = integer(line, SOURCE, "client_handle") {
            if next.client_handle != v as u32 {
                next.client_handle = v as u32;
                diff.push("client_handle");
            }
        }
        if let Some(v) = line.attr("ip") {
            if next.ip != v {
                next.ip = v.to_string();
                diff.push("ip");
            }
        }
        if let Some(v) = integer(line, SOURCE, "port") {
            if next.port != v as u16 {
                next.port = v as u16;
                diff.push("port");
            }
        }
        if let Some(v) = line.attr("compression") {
            if next.compression != v {
                next.compression = v.to_string();
                diff.push("compression");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "in_use") {
            if next.in_use != v {
                next.in_use = v;
                diff.push("in_use");
            }
        }

        (next, diff)
    }
}
