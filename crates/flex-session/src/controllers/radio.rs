//! Radio-global controller: name, callsign, generic settings, mixer,
//! and profile autosave.

use flex_protocol::command_grammar;
use flex_protocol::message::ReplyMessage;

use crate::error::SessionResult;
use crate::handle::SessionHandle;

/// The radio's single global controller — there is exactly one per
/// session, vended by [`SessionHandle::radio`].
pub struct RadioController {
    session: SessionHandle,
}

impl RadioController {
    pub(crate) fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// `radio name <unescaped-string>`
    pub async fn set_name(&self, name: &str) -> SessionResult<ReplyMessage> {
        self.session.send_raw(command_grammar::radio_name(name)).await
    }

    /// `radio callsign <uppercase>`
    pub async fn set_callsign(&self, callsign: &str) -> SessionResult<ReplyMessage> {
        self.session.send_raw(command_grammar::radio_callsign(callsign)).await
    }

    /// `radio set <key>=<value>`
    pub async fn set(&self, key: &str, value: &str) -> SessionResult<ReplyMessage> {
        self.session.send_raw(command_grammar::radio_set(key, value)).await
    }

    /// `mixer lineout gain <0..100>`
    pub async fn set_lineout_gain(&self, gain: u8) -> SessionResult<ReplyMessage> {
        self.session.send_raw(command_grammar::mixer_lineout_gain(gain)).await
    }

    /// `mixer headphone mute <0|1>`
    pub async fn set_headphone_mute(&self, muted: bool) -> SessionResult<ReplyMessage> {
        self.session.send_raw(command_grammar::mixer_headphone_mute(muted)).await
    }

    /// `profile autosave <on|off>`
    pub async fn set_profile_autosave(&self, enabled: bool) -> SessionResult<ReplyMessage> {
        self.session.send_raw(command_grammar::profile_autosave(enabled)).await
    }
}
