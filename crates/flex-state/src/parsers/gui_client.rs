//! GUI client entity: one connected client program, as reported by
//! `client` status broadcasts (distinct from the discovery beacon's
//! own `gui_client_*` summary lists).

use flex_protocol::StatusLine;

use crate::attrs::{integer, truthy};
use crate::snapshot::EntitySnapshot;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct GuiClientSnapshot {
    pub handle: u32,
    pub program: String,
    pub station: String,
    pub host: String,
    pub is_local_ptt: bool,
    pub is_this_client: bool,
    pub available_panadapters: u8,
    pub available_slices: u8,
}

const SOURCE: &str = "client";

impl EntitySnapshot for GuiClientSnapshot {
    const SOURCE: &'static str = SOURCE;

    fn apply(previous: Option<&Self>, line: &StatusLine) -> (Self, Vec<&'static str>) {
        let mut next = previous.cloned().unwrap_or_default();
        let mut diff = Vec::new();

        if let Some(id) = line.positional.first().and_then(|t| u32::from_str_radix(t, 16).ok()) {
            if next.handle != id {
                next.handle = id;
                diff.push("handle");
            }
        }
        if let Some(v) = line.attr("program") {
            if next.program != v {
                next.program = v.to_string();
                diff.push("program");
            }
        }
        if let Some(v) = line.attr("station") {
            if next.station != v {
                next.station = v.to_string();
                diff.push("station");
            }
        }
        if let Some(v) = line.attr("host") {
            if next.host != v {
                next.host = v.to_string();
                diff.push("host");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "local_ptt") {
            if next.is_local_ptt != v {
                next.is_local_ptt = v;
                diff.push("is_local_ptt");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "this_client") {
            if next.is_this_client != v {
                next.is_this_client = v;
                diff.push("is_this_client");
            }
        }
        if let Some(v) = integer(line, SOURCE, "available_panadapters") {
            if next.available_panadapters != v as u8 {
                next.available_panadapters = v as u8;
                diff.push("available_panadapters");
            }
        }
        if let Some(v) = integer(line, SOURCE, "available_slices") {
            if next.available_slices != v as u8 {
                next.available_slices = v as u8;
                diff.push("available_slices");
            }
        }

        (next, diff)
    }
}
