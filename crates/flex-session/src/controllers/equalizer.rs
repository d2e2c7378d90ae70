//! Equalizer controller: one chain's (tx/rx) mode toggle and per-band
//! levels.

use flex_protocol::command_grammar::{self, EqChain};
use flex_protocol::message::ReplyMessage;

use crate::error::SessionResult;
use crate::handle::SessionHandle;

/// A view over one equalizer chain (`tx` or `rx`).
pub struct EqualizerController {
    session: SessionHandle,
    chain: EqChain,
}

impl EqualizerController {
    pub(crate) fn new(session: SessionHandle, chain: EqChain) -> Self {
        Self { session, chain }
    }

    pub fn chain(&self) -> EqChain {
        self.chain
    }

    /// `eq <tx|rx>sc mode=<0|1>`
    pub async fn set_enabled(&self, enabled: bool) -> SessionResult<ReplyMessage> {
        self.session.send_raw(command_grammar::eq_mode(self.chain, enabled)).await
    }

    /// `eq <tx|rx>sc <band>=<-10..10>`
    pub async fn set_band(&self, band: &str, level: i8) -> SessionResult<ReplyMessage> {
        self.session.send_raw(command_grammar::eq_band(self.chain, band, level)).await
    }
}
