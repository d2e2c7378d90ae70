//! APD (automatic packet detector) entity: a singleton toggle plus its
//! tuning parameters.

use flex_protocol::StatusLine;

use crate::attrs::{integer, truthy};
use crate::snapshot::EntitySnapshot;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct ApdSnapshot {
    pub enabled: bool,
    pub gain: i32,
    pub threshold: i32,
}

const SOURCE: &str = "apd";

impl EntitySnapshot for ApdSnapshot {
    const SOURCE: &'static str = SOURCE;

    fn apply(previous: Option<&Self>, line: &StatusLine) -> (Self, Vec<&'static str>) {
        let mut next = previous.cloned().unwrap_or_default();
        let mut diff = Vec::new();

        if let Some(v) = truthy(line, SOURCE, "enable") {
            if next.enabled != v {
                next.enabled = v;
                diff.push("enabled");
            }
        }
        if let Some(v) = integer(line, SOURCE, "gain") {
            if next.gain != v as i32 {
                next.gain = v as i32;
                diff.push("gain");
            }
        }
        if let Some(v) = integer(line, SOURCE, "threshold") {
            if next.threshold != v as i32 {
                next.threshold = v as i32;
                diff.push("threshold");
            }
        }

        (next, diff)
    }
}
