//! Interlock controller: TX-safety relay enables and timing guards.

use flex_protocol::command_grammar;
use flex_protocol::message::ReplyMessage;

use crate::error::SessionResult;
use crate::handle::SessionHandle;

pub struct InterlockController {
    session: SessionHandle,
}

impl InterlockController {
    pub(crate) fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// `interlock tx1_enabled=<0|1>`
    pub async fn set_tx1_enabled(&self, enabled: bool) -> SessionResult<ReplyMessage> {
        self.set("tx1_enabled", if enabled { "1" } else { "0" }).await
    }

    /// `interlock acc_tx_enabled=<0|1>`
    pub async fn set_acc_tx_enabled(&self, enabled: bool) -> SessionResult<ReplyMessage> {
        self.set("acc_tx_enabled", if enabled { "1" } else { "0" }).await
    }

    /// `interlock tx_delay=<ms>`
    pub async fn set_tx_delay_ms(&self, delay_ms: u32) -> SessionResult<ReplyMessage> {
        self.set("tx_delay", &delay_ms.to_string()).await
    }

    /// `interlock timeout=<s>`
    pub async fn set_timeout_s(&self, timeout_s: u32) -> SessionResult<ReplyMessage> {
        self.set("timeout", &timeout_s.to_string()).await
    }

    /// Send an arbitrary `interlock <key>=<value>` command.
    pub async fn set(&self, key: &str, value: &str) -> SessionResult<ReplyMessage> {
        self.session.send_raw(command_grammar::interlock_set(key, value)).await
    }
}
