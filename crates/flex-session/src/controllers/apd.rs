//! Automatic power-down controller.

use flex_protocol::command_grammar;
use flex_protocol::message::ReplyMessage;

use crate::error::SessionResult;
use crate::handle::SessionHandle;

pub struct ApdController {
    session: SessionHandle,
}

impl ApdController {
    pub(crate) fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// `apd enable=<0|1>`
    pub async fn set_enabled(&self, enabled: bool) -> SessionResult<ReplyMessage> {
        self.session.send_raw(command_grammar::apd_enable(enabled)).await
    }
}
