//! Transmit entity: the radio's singleton TX chain configuration
//! (mic/tune levels, VOX, ALC, power and antenna selection).

use flex_protocol::StatusLine;

use crate::attrs::{clamp_percent, integer, string, truthy};
use crate::snapshot::EntitySnapshot;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct TransmitSnapshot {
    pub tune_power: u8,
    pub rf_power: u8,
    pub mic_level: u8,
    pub mic_selection: String,
    pub compander: bool,
    pub compander_level: u8,
    pub vox_enabled: bool,
    pub vox_level: u8,
    pub vox_delay_ms: u32,
    pub mon_gain_cw: u8,
    pub mon_gain_sb: u8,
    pub sb_monitor: bool,
    pub cw_monitor: bool,
    pub tx_ant: String,
    pub hwalc_enabled: bool,
    pub am_carrier_level: u8,
    pub speech_processor_enabled: bool,
    pub speech_processor_level: u8,
    pub tune: bool,
}

const SOURCE: &str = "transmit";

impl EntitySnapshot for TransmitSnapshot {
    const SOURCE: &'static str = SOURCE;

    fn apply(previous: Option<&Self>, line: &StatusLine) -> (Self, Vec<&'static str>) {
        let mut next = previous.cloned().unwrap_or_default();
        let mut diff = Vec::new();

        macro_rules! percent {
            ($key:literal, $field:ident, $name:literal) => {
                if let Some(v) = integer(line, SOURCE, $key) {
                    let clamped = clamp_percent(SOURCE, $name, v as i32);
                    if next.$field != clamped {
                        next.$field = clamped;
                        diff.push($name);
                    }
                }
            };
        }
        percent!("tunepower", tune_power, "tune_power");
        percent!("rfpower", rf_power, "rf_power");
        percent!("miclevel", mic_level, "mic_level");
        percent!("compandergain", compander_level, "compander_level");
        percent!("voxlevel", vox_level, "vox_level");
        percent!("mongainsb", mon_gain_sb, "mon_gain_sb");
        percent!("mongaincw", mon_gain_cw, "mon_gain_cw");
        percent!("am_carrier_level", am_carrier_level, "am_carrier_level");
        percent!("speech_processor_level", speech_processor_level, "speech_processor_level");

        if let Some(v) = string(line, "mic_selection") {
            if next.mic_selection != v {
                next.mic_selection = v;
                diff.push("mic_selection");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "compander") {
            if next.compander != v {
                next.compander = v;
                diff.push("compander");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "vox_enable") {
            if next.vox_enabled != v {
                next.vox_enabled = v;
                diff.push("vox_enabled");
            }
        }
        if let Some(v) = integer(line, SOURCE, "voxdelay") {
            if next.vox_delay_ms != v as u32 {
                next.vox_delay_ms = v as u32;
                diff.push("vox_delay_ms");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "sb_monitor") {
            if next.sb_monitor != v {
                next.sb_monitor = v;
                diff.push("sb_monitor");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "cw_monitor") {
            if next.cw_monitor != v {
                next.cw_monitor = v;
                diff.push("cw_monitor");
            }
        }
        if let Some(v) = string(line, "tx_ant") {
            if next.tx_ant != v {
                next.tx_ant = v;
                diff.push("tx_ant");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "hwalc_enabled") {
            if next.hwalc_enabled != v {
                next.hwalc_enabled = v;
                diff.push("hwalc_enabled");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "speech_processor_enable") {
            if next.speech_processor_enabled != v {
                next.speech_processor_enabled = v;
                diff.push("speech_processor_enabled");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "tune") {
            if next.tune != v {
                next.tune = v;
                diff.push("tune");
            }
        }

        (next, diff)
    }
}
