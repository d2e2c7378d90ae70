//! Slice entity: a single demodulator/filter chain tuned within a
//! panadapter's span.

use flex_protocol::command_grammar::AgcMode;
use flex_protocol::StatusLine;

use crate::attrs::{clamp_percent, float, integer, integer_csv, string, truthy};
use crate::snapshot::EntitySnapshot;

/// Demodulation mode, as reported on the wire (uppercase mnemonic).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Mode {
    Usb,
    Lsb,
    Am,
    Cw,
    DigU,
    DigL,
    Rtty,
    Sam,
    Fm,
    NFm,
    Dfm,
    Unknown,
}

impl Mode {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "USB" => Mode::Usb,
            "LSB" => Mode::Lsb,
            "AM" => Mode::Am,
            "CW" => Mode::Cw,
            "DIGU" => Mode::DigU,
            "DIGL" => Mode::DigL,
            "RTTY" => Mode::Rtty,
            "SAM" => Mode::Sam,
            "FM" => Mode::Fm,
            "NFM" => Mode::NFm,
            "DFM" => Mode::Dfm,
            _ => Mode::Unknown,
        }
    }
}

fn parse_agc_mode(raw: &str) -> Option<AgcMode> {
    match raw.to_ascii_lowercase().as_str() {
        "fast" => Some(AgcMode::Fast),
        "med" => Some(AgcMode::Med),
        "slow" => Some(AgcMode::Slow),
        _ => None,
    }
}

/// AGC settings, reported as a threshold/off-level pair alongside mode.
#[derive(Clone, PartialEq, Debug)]
pub struct AgcSettings {
    pub mode: AgcMode,
    pub threshold: i32,
    pub off_level: i32,
}

impl Default for AgcSettings {
    fn default() -> Self {
        Self {
            mode: AgcMode::Med,
            threshold: 0,
            off_level: 0,
        }
    }
}

/// Noise-management attribute set, all independently toggled/leveled.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct NoiseReduction {
    pub nr: bool,
    pub nr2: bool,
    pub anf: bool,
    pub nb: bool,
    pub wnb: bool,
    pub apf: bool,
}

/// One slice's full attribute set, as reassembled from `slice` status
/// broadcasts.
#[derive(Clone, PartialEq, Debug)]
pub struct SliceSnapshot {
    pub id: String,
    pub frequency_mhz: f64,
    pub mode: Mode,
    pub filter_low: i64,
    pub filter_high: i64,
    pub rf_gain: i32,
    pub agc: AgcSettings,
    pub step: i64,
    pub step_list: Vec<i64>,
    pub noise_reduction: NoiseReduction,
    pub cw_auto_tune: bool,
    pub rx_ant: String,
    pub tx_ant: String,
    pub ant_list: Vec<String>,
    pub diversity_child: bool,
    pub diversity_parent: Option<String>,
    pub audio_level: u8,
    pub audio_pan: u8,
    pub audio_mute: bool,
    pub rit_offset: i64,
    pub xit_offset: i64,
    pub fm_tone_value: Option<f64>,
    pub rtty_mark: i64,
    pub rtty_shift: i64,
    pub in_use: bool,
    pub owner: u32,
    pub locked: bool,
}

impl Default for SliceSnapshot {
    fn default() -> Self {
        Self {
            id: String::new(),
            frequency_mhz: 0.0,
            mode: Mode::Usb,
            filter_low: 0,
            filter_high: 0,
            rf_gain: 0,
            agc: AgcSettings::default(),
            step: 0,
            step_list: Vec::new(),
            noise_reduction: NoiseReduction::default(),
            cw_auto_tune: false,
            rx_ant: String::new(),
            tx_ant: String::new(),
            ant_list: Vec::new(),
            diversity_child: false,
            diversity_parent: None,
            audio_level: 0,
            audio_pan: 50,
            audio_mute: false,
            rit_offset: 0,
            xit_offset: 0,
            fm_tone_value: None,
            rtty_mark: 0,
            rtty_shift: 0,
            in_use: false,
            owner: 0,
            locked: false,
        }
    }
}

impl SliceSnapshot {
    /// The filter passband is well-formed and the step matches one of
    /// the advertised step sizes. Violations are logged by the parser,
    /// not enforced here; this is exposed for tests and callers that
    /// want to validate reassembled state.
    pub fn is_valid(&self) -> bool {
        self.filter_low <= self.filter_high && (self.step_list.is_empty() || self.step_list.contains(&self.step))
    }
}

const SOURCE: &str = "slice";

impl EntitySnapshot for SliceSnapshot {
    const SOURCE: &'static str = SOURCE;

    fn apply(previous: Option<&Self>, line: &StatusLine) -> (Self, Vec<&'static str>) {
        let mut next = previous.cloned().unwrap_or_default();
        let mut diff = Vec::new();

        if let Some(id) = line.positional.first() {
            if &next.id != id {
                next.id = id.clone();
                diff.push("id");
            }
        }

        if let Some(v) = float(line, SOURCE, "RF_frequency") {
            if next.frequency_mhz != v {
                next.frequency_mhz = v;
                diff.push("frequency_mhz");
            }
        }
        if let Some(raw) = line.attr("mode") {
            let v = Mode::parse(raw);
            if next.mode != v {
                next.mode = v;
                diff.push("mode");
            }
        }
        if let Some(v) = integer(line, SOURCE, "filter_lo") {
            if next.filter_low != v {
                next.filter_low = v;
                diff.push("filter_low");
            }
        }
        if let Some(v) = integer(line, SOURCE, "filter_hi") {
            if next.filter_high != v {
                next.filter_high = v;
                diff.push("filter_high");
            }
        }
        if next.filter_low > next.filter_high {
            tracing::warn!(
                source = SOURCE,
                low = next.filter_low,
                high = next.filter_high,
                "filter passband inverted"
            );
        }
        if let Some(v) = integer(line, SOURCE, "rfgain") {
            if next.rf_gain != v as i32 {
                next.rf_gain = v as i32;
                diff.push("rf_gain");
            }
        }
        if let Some(raw) = line.attr("agc_mode") {
            if let Some(mode) = parse_agc_mode(raw) {
                if next.agc.mode != mode {
                    next.agc.mode = mode;
                    diff.push("agc_mode");
                }
            }
        }
        if let Some(v) = integer(line, SOURCE, "agc_threshold") {
            if next.agc.threshold != v as i32 {
                next.agc.threshold = v as i32;
                diff.push("agc_threshold");
            }
        }
        if let Some(v) = integer(line, SOURCE, "agc_off_level") {
            if next.agc.off_level != v as i32 {
                next.agc.off_level = v as i32;
                diff.push("agc_off_level");
            }
        }
        if let Some(v) = integer(line, SOURCE, "step") {
            if next.step != v {
                next.step = v;
                diff.push("step");
            }
        }
        if let Some(v) = integer_csv(line, "step_list") {
            if next.step_list != v {
                next.step_list = v;
                diff.push("step_list");
            }
        }
        if !next.step_list.is_empty() && !next.step_list.contains(&next.step) {
            tracing::warn!(source = SOURCE, step = next.step, "step not in step_list");
        }
        if let Some(v) = truthy(line, SOURCE, "nr") {
            if next.noise_reduction.nr != v {
                next.noise_reduction.nr = v;
                diff.push("nr");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "nr2") {
            if next.noise_reduction.nr2 != v {
                next.noise_reduction.nr2 = v;
                diff.push("nr2");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "anf") {
            if next.noise_reduction.anf != v {
                next.noise_reduction.anf = v;
                diff.push("anf");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "nb") {
            if next.noise_reduction.nb != v {
                next.noise_reduction.nb = v;
                diff.push("nb");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "wnb") {
            if next.noise_reduction.wnb != v {
                next.noise_reduction.wnb = v;
                diff.push("wnb");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "apf") {
            if next.noise_reduction.apf != v {
                next.noise_reduction.apf = v;
                diff.push("apf");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "cw_auto_tune") {
            if next.cw_auto_tune != v {
                next.cw_auto_tune = v;
                diff.push("cw_auto_tune");
            }
        }
        if let Some(v) = string(line, "rxant") {
            if next.rx_ant != v {
                next.rx_ant = v;
                diff.push("rx_ant");
            }
        }
        if let Some(v) = string(line, "txant") {
            if next.tx_ant != v {
                next.tx_ant = v;
                diff.push("tx_ant");
            }
        }
        if let Some(raw) = line.attr("ant_list") {
            let list: Vec<String> = raw.split(',').map(str::to_string).collect();
            if next.ant_list != list {
                next.ant_list = list;
                diff.push("ant_list");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "diversity_child") {
            if next.diversity_child != v {
                next.diversity_child = v;
                diff.push("diversity_child");
            }
        }
        if let Some(v) = string(line, "diversity_parent") {
            let v = Some(v);
            if next.diversity_parent != v {
                next.diversity_parent = v;
                diff.push("diversity_parent");
            }
        }
        if let Some(v) = integer(line, SOURCE, "audio_level") {
            let clamped = clamp_percent(SOURCE, "audio_level", v as i32);
            if next.audio_level != clamped {
                next.audio_level = clamped;
                diff.push("audio_level");
            }
        }
        if let Some(v) = integer(line, SOURCE, "audio_pan") {
            let clamped = clamp_percent(SOURCE, "audio_pan", v as i32);
            if next.audio_pan != clamped {
                next.audio_pan = clamped;
                diff.push("audio_pan");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "audio_mute") {
            if next.audio_mute != v {
                next.audio_mute = v;
                diff.push("audio_mute");
            }
        }
        if let Some(v) = integer(line, SOURCE, "rit_freq") {
            if next.rit_offset != v {
                next.rit_offset = v;
                diff.push("rit_offset");
            }
        }
        if let Some(v) = integer(line, SOURCE, "xit_freq") {
            if next.xit_offset != v {
                next.xit_offset = v;
                diff.push("xit_offset");
            }
        }
        if let Some(v) = float(line, SOURCE, "fm_tone_value") {
            let v = Some(v);
            if next.fm_tone_value != v {
                next.fm_tone_value = v;
                diff.push("fm_tone_value");
            }
        }
        if let Some(v) = float(line, SOURCE, "rtty_mark") {
            // Commanded in Hz but occasionally broadcast with fractional
            // jitter; the mark frequency is only ever meaningful as an
            // integer offset.
            let v = v.round() as i64;
            if next.rtty_mark != v {
                next.rtty_mark = v;
                diff.push("rtty_mark");
            }
        }
        if let Some(v) = integer(line, SOURCE, "rtty_shift") {
            if next.rtty_shift != v {
                next.rtty_shift = v;
                diff.push("rtty_shift");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "in_use") {
            if next.in_use != v {
                next.in_use = v;
                diff.push("in_use");
            }
        }
        if let Some(v) = integer(line, SOURCE, "owner") {
            if next.owner != v as u32 {
                next.owner = v as u32;
                diff.push("owner");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "lock") {
            if next.locked != v {
                next.locked = v;
                diff.push("locked");
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
    fn tune_and_mode_update_produce_matching_diff() {
        let (snap, diff) = SliceSnapshot::apply(
            None,
            &tokenize("slice 0 RF_frequency=14.075000 mode=USB in_use=1"),
        );
        assert_eq!(snap.frequency_mhz, 14.075);
        assert_eq!(snap.mode, Mode::Usb);
        assert!(snap.in_use);
        assert!(diff.contains(&"frequency_mhz"));
        assert!(diff.contains(&"mode"));
    }

    #[test]
    fn filter_clamp_and_step_list_invariants() {
        let (snap, _) = SliceSnapshot::apply(
            None,
            &tokenize("slice 0 filter_lo=-1500 filter_hi=1500 step=100 step_list=10,100,1000"),
        );
        assert!(snap.is_valid());
    }

    #[test]
    fn audio_level_clamps_above_one_hundred() {
        let (snap, diff) = SliceSnapshot::apply(None, &tokenize("slice 0 audio_level=150"));
        assert_eq!(snap.audio_level, 100);
        assert!(diff.contains(&"audio_level"));
    }

    #[test]
    fn repeated_identical_line_has_empty_diff() {
        let (first, _) = SliceSnapshot::apply(None, &tokenize("slice 0 RF_frequency=14.075000"));
        let (_, diff) = SliceSnapshot::apply(Some(&first), &tokenize("slice 0 RF_frequency=14.075000"));
        assert!(diff.is_empty());
    }
}
