//! Transmit controller: TX chain levels, VOX, monitor, and antenna
//! selection.

use flex_protocol::command_grammar;
use flex_protocol::message::ReplyMessage;

use crate::error::SessionResult;
use crate::handle::SessionHandle;

pub struct TransmitController {
    session: SessionHandle,
}

impl TransmitController {
    pub(crate) fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// `transmit rfpower=<0..100>`
    pub async fn set_rf_power(&self, power: u8) -> SessionResult<ReplyMessage> {
        self.set("rfpower", &power.min(100).to_string()).await
    }

    /// `transmit tunepower=<0..100>`
    pub async fn set_tune_power(&self, power: u8) -> SessionResult<ReplyMessage> {
        self.set("tunepower", &power.min(100).to_string()).await
    }

    /// `transmit miclevel=<0..100>`
    pub async fn set_mic_level(&self, level: u8) -> SessionResult<ReplyMessage> {
        self.set("miclevel", &level.min(100).to_string()).await
    }

    /// `transmit vox_enable=<0|1>`
    pub async fn set_vox_enabled(&self, enabled: bool) -> SessionResult<ReplyMessage> {
        self.set("vox_enable", if enabled { "1" } else { "0" }).await
    }

    /// `transmit voxlevel=<0..100>`
    pub async fn set_vox_level(&self, level: u8) -> SessionResult<ReplyMessage> {
        self.set("voxlevel", &level.min(100).to_string()).await
    }

    /// `transmit tx_ant=<name>`
    pub async fn set_tx_antenna(&self, ant: &str) -> SessionResult<ReplyMessage> {
        self.set("tx_ant", ant).await
    }

    /// `transmit tune=<0|1>`
    pub async fn set_tune(&self, enabled: bool) -> SessionResult<ReplyMessage> {
        self.set("tune", if enabled { "1" } else { "0" }).await
    }

    /// Send an arbitrary `transmit <key>=<value>` command.
    pub async fn set(&self, key: &str, value: &str) -> SessionResult<ReplyMessage> {
        self.session.send_raw(command_grammar::transmit_set(key, value)).await
    }
}
