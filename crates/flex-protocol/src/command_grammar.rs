//! Typed builders for the outbound command catalogue (§6).
//!
//! Each function returns the command body exactly as it must appear
//! after `C<seq>|` on the wire — callers (`flex-session::command`) own
//! sequence assignment and the trailing `\n`.

/// AGC operating mode for `slice set agc_mode=...`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AgcMode {
    Fast,
    Med,
    Slow,
}

impl AgcMode {
    fn as_str(self) -> &'static str {
        match self {
            AgcMode::Fast => "fast",
            AgcMode::Med => "med",
            AgcMode::Slow => "slow",
        }
    }
}

/// One attribute in a `slice set <id> ...` command.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum SliceSetAttr {
    Mode(String),
    FilterLo(i64),
    FilterHi(i64),
    RfGain(i32),
    AgcMode(AgcMode),
    Nr(bool),
    NrLevel(i32),
    StepList(Vec<i64>),
    AudioLevel(u8),
    Loopa(bool),
    TxOffsetFreq(f64),
}

impl SliceSetAttr {
    fn render(&self) -> String {
        match self {
            SliceSetAttr::Mode(m) => format!("mode={m}"),
            SliceSetAttr::FilterLo(hz) => format!("filter_lo={hz}"),
            SliceSetAttr::FilterHi(hz) => format!("filter_hi={hz}"),
            SliceSetAttr::RfGain(g) => format!("rfgain={g}"),
            SliceSetAttr::AgcMode(mode) => format!("agc_mode={}", mode.as_str()),
            SliceSetAttr::Nr(on) => format!("nr={}", bit(*on)),
            SliceSetAttr::NrLevel(level) => format!("nr_level={level}"),
            SliceSetAttr::StepList(steps) => {
                let csv = steps.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(",");
                format!("step_list={csv}")
            }
            SliceSetAttr::AudioLevel(level) => format!("audio_level={}", (*level).min(100)),
            SliceSetAttr::Loopa(on) => format!("loopa={}", bit(*on)),
            SliceSetAttr::TxOffsetFreq(mhz) => format!("tx_offset_freq={mhz:.6}"),
        }
    }
}

fn bit(on: bool) -> u8 {
    on as u8
}

/// `slice tune <id> <freq_mhz_6dp>`
pub fn slice_tune(id: u32, freq_mhz: f64) -> String {
    format!("slice tune {id} {freq_mhz:.6}")
}

/// `slice set <id> <attr1> <attr2> ...`
pub fn slice_set(id: u32, attrs: &[SliceSetAttr]) -> String {
    let rendered = attrs.iter().map(SliceSetAttr::render).collect::<Vec<_>>().join(" ");
    format!("slice set {id} {rendered}")
}

/// `slice lock <id>`
pub fn slice_lock(id: u32) -> String {
    format!("slice lock {id}")
}

/// `slice unlock <id>`
pub fn slice_unlock(id: u32) -> String {
    format!("slice unlock {id}")
}

/// `slice auto_tune <id> int=<0|1>`
pub fn slice_auto_tune(id: u32, interpolate: bool) -> String {
    format!("slice auto_tune {id} int={}", bit(interpolate))
}

/// One attribute in a `display pan s <streamIdHex> ...` command.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum PanAttr {
    CenterMhz(f64),
    BandwidthMhz(f64),
    BandZoom(bool),
    SegmentZoom(bool),
    Xpixels(u32),
    Ypixels(u32),
}

impl PanAttr {
    fn render(&self) -> String {
        match self {
            PanAttr::CenterMhz(mhz) => format!("center={mhz:.6}"),
            PanAttr::BandwidthMhz(mhz) => format!("bandwidth={mhz}"),
            PanAttr::BandZoom(on) => format!("band_zoom={}", bit(*on)),
            PanAttr::SegmentZoom(on) => format!("segment_zoom={}", bit(*on)),
            PanAttr::Xpixels(n) => format!("xpixels={n}"),
            PanAttr::Ypixels(n) => format!("ypixels={n}"),
        }
    }
}

/// `display pan s <streamIdHex> <attr1> <attr2> ...`
pub fn display_pan(stream_id: u32, attrs: &[PanAttr]) -> String {
    let rendered = attrs.iter().map(PanAttr::render).collect::<Vec<_>>().join(" ");
    format!("display pan s 0x{stream_id:08X} {rendered}")
}

/// One attribute in a `display panafall set <streamIdHex> ...` command.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum WaterfallAttr {
    ColorGain(u32),
    BlackLevel(u32),
    AutoBlack(bool),
    GradientIndex(u32),
}

impl WaterfallAttr {
    fn render(&self) -> String {
        match self {
            WaterfallAttr::ColorGain(v) => format!("color_gain={v}"),
            WaterfallAttr::BlackLevel(v) => format!("black_level={v}"),
            WaterfallAttr::AutoBlack(on) => format!("auto_black={}", bit(*on)),
            WaterfallAttr::GradientIndex(v) => format!("gradient_index={v}"),
        }
    }
}

/// `display panafall set <streamIdHex> <attr1> <attr2> ...`
pub fn display_panafall(stream_id: u32, attrs: &[WaterfallAttr]) -> String {
    let rendered = attrs.iter().map(WaterfallAttr::render).collect::<Vec<_>>().join(" ");
    format!("display panafall set 0x{stream_id:08X} {rendered}")
}

/// `radio name <unescaped-string>`
pub fn radio_name(name: &str) -> String {
    format!("radio name {name}")
}

/// `radio callsign <uppercase>`
pub fn radio_callsign(callsign: &str) -> String {
    format!("radio callsign {}", callsign.to_ascii_uppercase())
}

/// `radio set <key>=<value>`
pub fn radio_set(key: &str, value: &str) -> String {
    format!("radio set {key}={value}")
}

/// `mixer lineout gain <0..100>`
pub fn mixer_lineout_gain(gain: u8) -> String {
    format!("mixer lineout gain {}", gain.min(100))
}

/// `mixer headphone mute <0|1>`
pub fn mixer_headphone_mute(muted: bool) -> String {
    format!("mixer headphone mute {}", bit(muted))
}

/// `profile autosave <on|off>`
pub fn profile_autosave(enabled: bool) -> String {
    format!("profile autosave {}", if enabled { "on" } else { "off" })
}

/// Which equalizer chain a `eq` command targets.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EqChain {
    Tx,
    Rx,
}

impl EqChain {
    fn as_str(self) -> &'static str {
        match self {
            EqChain::Tx => "tx",
            EqChain::Rx => "rx",
        }
    }
}

/// `eq <tx|rx>sc mode=<0|1>`
pub fn eq_mode(chain: EqChain, enabled: bool) -> String {
    format!("eq {}sc mode={}", chain.as_str(), bit(enabled))
}

/// `eq <tx|rx>sc <band>=<-10..10>`
pub fn eq_band(chain: EqChain, band: &str, level: i8) -> String {
    format!("eq {}sc {band}={}", chain.as_str(), level.clamp(-10, 10))
}

/// `interlock <key>=<value>` — generic setter for interlock's
/// TX-enable/delay/timeout attributes, mirroring `radio set`'s
/// `key=value` shape.
pub fn interlock_set(key: &str, value: &str) -> String {
    format!("interlock {key}={value}")
}

/// `transmit <key>=<value>` — generic setter for the transmit chain's
/// level/VOX/monitor attributes, mirroring `radio set`'s `key=value`
/// shape.
pub fn transmit_set(key: &str, value: &str) -> String {
    format!("transmit {key}={value}")
}

/// `apd enable=<0|1>`
pub fn apd_enable(enabled: bool) -> String {
    format!("apd enable={}", bit(enabled))
}

/// `sub <source> all`
pub fn subscribe(source: &str) -> String {
    format!("sub {source} all")
}

/// `keepalive enable`
pub fn keepalive_enable() -> String {
    "keepalive enable".to_string()
}

/// `ping`
pub fn ping() -> String {
    "ping".to_string()
}

/// `client gui`
pub fn client_gui() -> String {
    "client gui".to_string()
}

/// `stream create type=remote_audio_rx compression=OPUS`
pub fn stream_create_remote_audio_rx() -> String {
    "stream create type=remote_audio_rx compression=OPUS".to_string()
}
