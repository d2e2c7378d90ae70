//! Waterfall controller: gradient and black-level setters for one
//! waterfall stream.

use flex_protocol::command_grammar::{self, WaterfallAttr};
use flex_protocol::message::ReplyMessage;

use crate::error::SessionResult;
use crate::handle::SessionHandle;

/// A view over one waterfall, identified by its VITA stream id.
pub struct WaterfallController {
    session: SessionHandle,
    stream_id: u32,
}

impl WaterfallController {
    pub(crate) fn new(session: SessionHandle, stream_id: u32) -> Self {
        Self { session, stream_id }
    }

    /// This controller's stream id.
    pub fn stream_id(&self) -> u32 {
        self.stream_id
    }

    /// `display panafall set <streamIdHex> color_gain=<n>`
    pub async fn set_color_gain(&self, gain: u32) -> SessionResult<ReplyMessage> {
        self.set_attrs(&[WaterfallAttr::ColorGain(gain)]).await
    }

    /// `display panafall set <streamIdHex> black_level=<n>`
    pub async fn set_black_level(&self, level: u32) -> SessionResult<ReplyMessage> {
        self.set_attrs(&[WaterfallAttr::BlackLevel(level)]).await
    }

    /// `display panafall set <streamIdHex> auto_black=<0|1>`
    pub async fn set_auto_black(&self, enabled: bool) -> SessionResult<ReplyMessage> {
        self.set_attrs(&[WaterfallAttr::AutoBlack(enabled)]).await
    }

    /// `display panafall set <streamIdHex> gradient_index=<n>`
    pub async fn set_gradient(&self, gradient_index: u32) -> SessionResult<ReplyMessage> {
        self.set_attrs(&[WaterfallAttr::GradientIndex(gradient_index)]).await
    }

    /// Send an arbitrary batch of `display panafall` attributes in one command.
    pub async fn set_attrs(&self, attrs: &[WaterfallAttr]) -> SessionResult<ReplyMessage> {
        self.session.send_raw(command_grammar::display_panafall(self.stream_id, attrs)).await
    }
}
