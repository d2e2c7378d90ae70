//! Slice controller: tune, mode/filter/AGC/noise-management setters,
//! lock/unlock, and CW auto-tune.

use flex_protocol::command_grammar::{self, AgcMode, SliceSetAttr};
use flex_protocol::message::ReplyMessage;
use flex_protocol::StatusLine;

use crate::handle::SessionHandle;
use crate::error::SessionResult;

/// The result of a slice attribute command: the radio's own reply, plus
/// the fields the matching optimistic snapshot update touched.
///
/// `optimistic_diff` is produced locally, before the radio's reply even
/// arrives, from the same attributes the command carries — it is never
/// the authoritative diff. The radio's own status broadcast still
/// follows and produces its own [`flex_state::Change`] through the
/// ordinary [`crate::handle::SessionEvent::Entity`] stream; callers that
/// need to tell the two apart can assert on both.
#[derive(Debug)]
pub struct SliceCommandOutcome {
    pub reply: ReplyMessage,
    pub optimistic_diff: Vec<&'static str>,
}

/// A view over one slice, identified by its wire id (`"0"`, `"1"`, ...).
pub struct SliceController {
    session: SessionHandle,
    id: String,
}

impl SliceController {
    pub(crate) fn new(session: SessionHandle, id: String) -> Self {
        Self { session, id }
    }

    /// This controller's slice id.
    pub fn id(&self) -> &str {
        &self.id
    }

    fn numeric_id(&self) -> SessionResult<u32> {
        self.id
            .parse::<u32>()
            .map_err(|_| crate::error::SessionError::ConnectionFailed(format!("slice id {} is not numeric", self.id)))
    }

    /// Fold a synthesized `slice <id> <key>=<value>...` line onto the
    /// store ahead of the radio's reply, returning the fields it touched.
    /// `pairs` empty means the command has no locally-known status
    /// counterpart (e.g. a one-shot action) — that's a no-op, not an error.
    async fn apply_optimistic(&self, pairs: Vec<(String, String)>) -> SessionResult<Vec<&'static str>> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }
        let line = StatusLine {
            source: "slice".to_string(),
            positional: vec![self.id.clone()],
            attrs: pairs,
        };
        self.session.apply_optimistic_slice(self.id.clone(), line).await
    }

    /// `slice tune <id> <freq_mhz_6dp>`
    pub async fn set_frequency(&self, freq_mhz: f64) -> SessionResult<SliceCommandOutcome> {
        let id = self.numeric_id()?;
        let optimistic_diff = self
            .apply_optimistic(vec![("RF_frequency".to_string(), format!("{freq_mhz:.6}"))])
            .await?;
        let reply = self.session.send_raw(command_grammar::slice_tune(id, freq_mhz)).await?;
        Ok(SliceCommandOutcome { reply, optimistic_diff })
    }

    /// `slice set <id> mode=<MODE>`
    pub async fn set_mode(&self, mode: impl Into<String>) -> SessionResult<SliceCommandOutcome> {
        self.set_attrs(&[SliceSetAttr::Mode(mode.into())]).await
    }

    /// `slice set <id> filter_lo=<hz> filter_hi=<hz>`
    pub async fn set_filter(&self, low_hz: i64, high_hz: i64) -> SessionResult<SliceCommandOutcome> {
        self.set_attrs(&[SliceSetAttr::FilterLo(low_hz), SliceSetAttr::FilterHi(high_hz)]).await
    }

    /// `slice set <id> rfgain=<int>`
    pub async fn set_rf_gain(&self, gain: i32) -> SessionResult<SliceCommandOutcome> {
        self.set_attrs(&[SliceSetAttr::RfGain(gain)]).await
    }

    /// `slice set <id> agc_mode=<fast|med|slow>`
    pub async fn set_agc_mode(&self, mode: AgcMode) -> SessionResult<SliceCommandOutcome> {
        self.set_attrs(&[SliceSetAttr::AgcMode(mode)]).await
    }

    /// `slice set <id> nr=<0|1>`
    pub async fn set_noise_reduction(&self, enabled: bool) -> SessionResult<SliceCommandOutcome> {
        self.set_attrs(&[SliceSetAttr::Nr(enabled)]).await
    }

    /// `slice set <id> nr_level=<int>`. The radio reports no standalone
    /// `nr_level` status field, so this setter carries no optimistic
    /// counterpart — `optimistic_diff` is always empty.
    pub async fn set_noise_reduction_level(&self, level: i32) -> SessionResult<SliceCommandOutcome> {
        self.set_attrs(&[SliceSetAttr::NrLevel(level)]).await
    }

    /// `slice set <id> step_list=<csv-of-hz>`
    pub async fn set_step_list(&self, steps: Vec<i64>) -> SessionResult<SliceCommandOutcome> {
        self.set_attrs(&[SliceSetAttr::StepList(steps)]).await
    }

    /// `slice set <id> audio_level=<0..100>`
    pub async fn set_audio_level(&self, level: u8) -> SessionResult<SliceCommandOutcome> {
        self.set_attrs(&[SliceSetAttr::AudioLevel(level)]).await
    }

    /// `slice set <id> loopa=<0|1>`. No status field mirrors `loopa`, so
    /// `optimistic_diff` is always empty.
    pub async fn set_loop_a(&self, enabled: bool) -> SessionResult<SliceCommandOutcome> {
        self.set_attrs(&[SliceSetAttr::Loopa(enabled)]).await
    }

    /// `slice set <id> tx_offset_freq=<mhz_6dp>`. No status field mirrors
    /// `tx_offset_freq`, so `optimistic_diff` is always empty.
    pub async fn set_tx_offset(&self, freq_mhz: f64) -> SessionResult<SliceCommandOutcome> {
        self.set_attrs(&[SliceSetAttr::TxOffsetFreq(freq_mhz)]).await
    }

    /// Send an arbitrary batch of `slice set` attributes in one command,
    /// applying whichever of them have a known status-line counterpart
    /// as an optimistic update first.
    pub async fn set_attrs(&self, attrs: &[SliceSetAttr]) -> SessionResult<SliceCommandOutcome> {
        let id = self.numeric_id()?;
        let pairs = attrs.iter().filter_map(optimistic_pair).collect();
        let optimistic_diff = self.apply_optimistic(pairs).await?;
        let reply = self.session.send_raw(command_grammar::slice_set(id, attrs)).await?;
        Ok(SliceCommandOutcome { reply, optimistic_diff })
    }

    /// `slice lock <id>`
    pub async fn lock(&self) -> SessionResult<ReplyMessage> {
        let id = self.numeric_id()?;
        self.session.send_raw(command_grammar::slice_lock(id)).await
    }

    /// `slice unlock <id>`
    pub async fn unlock(&self) -> SessionResult<ReplyMessage> {
        let id = self.numeric_id()?;
        self.session.send_raw(command_grammar::slice_unlock(id)).await
    }

    /// `slice auto_tune <id> int=<0|1>`
    pub async fn auto_tune(&self, interpolate: bool) -> SessionResult<ReplyMessage> {
        let id = self.numeric_id()?;
        self.session.send_raw(command_grammar::slice_auto_tune(id, interpolate)).await
    }
}

/// The `slice` status-line key and value a `slice set` attribute would
/// produce on the wire, if the radio reports one back at all.
fn optimistic_pair(attr: &SliceSetAttr) -> Option<(String, String)> {
    match attr {
        SliceSetAttr::Mode(mode) => Some(("mode".to_string(), mode.clone())),
        SliceSetAttr::FilterLo(hz) => Some(("filter_lo".to_string(), hz.to_string())),
        SliceSetAttr::FilterHi(hz) => Some(("filter_hi".to_string(), hz.to_string())),
        SliceSetAttr::RfGain(gain) => Some(("rfgain".to_string(), gain.to_string())),
        SliceSetAttr::AgcMode(mode) => Some(("agc_mode".to_string(), agc_mode_str(*mode).to_string())),
        SliceSetAttr::Nr(on) => Some(("nr".to_string(), (*on as u8).to_string())),
        SliceSetAttr::StepList(steps) => {
            let csv = steps.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
            Some(("step_list".to_string(), csv))
        }
        SliceSetAttr::AudioLevel(level) => Some(("audio_level".to_string(), level.to_string())),
        // No standalone status field mirrors these: left for the
        // authoritative broadcast to report.
        SliceSetAttr::NrLevel(_) | SliceSetAttr::Loopa(_) | SliceSetAttr::TxOffsetFreq(_) => None,
    }
}

fn agc_mode_str(mode: AgcMode) -> &'static str {
    match mode {
        AgcMode::Fast => "fast",
        AgcMode::Med => "med",
        AgcMode::Slow => "slow",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    use crate::handle::connect;
    use flex_sim::{VirtualRadio, VirtualRadioConfig};

    async fn run_fake_radio(transport: tokio::io::DuplexStream, mut radio: VirtualRadio) {
        let (reader, mut writer) = tokio::io::split(transport);
        let mut reader = BufReader::new(reader);
        for line in radio.handshake_lines() {
            writer.write_all(format!("{line}\n").as_bytes()).await.unwrap();
        }
        let mut line = String::new();
        loop {
            line.clear();
            let n = match reader.read_line(&mut line).await {
                Ok(n) => n,
                Err(_) => break,
            };
            if n == 0 {
                break;
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() {
                continue;
            }
            for reply in radio.accept_command(trimmed) {
                if writer.write_all(format!("{reply}\n").as_bytes()).await.is_err() {
                    return;
                }
            }
        }
    }

    async fn connected_session() -> SessionHandle {
        let (server, client) = tokio::io::duplex(64 * 1024);
        let radio = VirtualRadio::new(VirtualRadioConfig::default());
        tokio::spawn(run_fake_radio(server, radio));
        connect(client).await.unwrap()
    }

    #[tokio::test]
    async fn set_frequency_applies_optimistic_diff_ahead_of_the_reply() {
        let session = connected_session().await;

        let outcome = session.slice("0").set_frequency(14.25).await.unwrap();
        assert!(outcome.reply.code.is_accepted());
        assert_eq!(outcome.optimistic_diff, vec!["id", "frequency_mhz"]);

        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(snapshot.slices.get(&"0".to_string()).unwrap().frequency_mhz, 14.25);
    }

    #[tokio::test]
    async fn set_attrs_without_a_known_status_counterpart_has_empty_optimistic_diff() {
        let session = connected_session().await;

        let outcome = session.slice("0").set_loop_a(true).await.unwrap();
        assert!(outcome.reply.code.is_accepted());
        assert!(outcome.optimistic_diff.is_empty());
    }

    #[tokio::test]
    async fn optimistic_diff_and_authoritative_diff_are_independent_updates() {
        use crate::handle::SessionEvent;
        use flex_state::EntityEvent;
        use std::time::Duration;

        let session = connected_session().await;
        let mut events = session.subscribe();

        let outcome = session.slice("0").set_mode("CW").await.unwrap();
        assert_eq!(outcome.optimistic_diff, vec!["id", "mode"]);

        // The radio's own status broadcast for the same change still
        // arrives and updates the store again, independently of the
        // optimistic diff already returned above.
        let event = tokio::time::timeout(Duration::from_secs(1), events.recv()).await.unwrap().unwrap();
        match event {
            SessionEvent::Entity(EntityEvent::Updated { diff, .. }) => assert!(diff.contains(&"mode")),
            other => panic!("expected entity update, got {other:?}"),
        }
    }
}
