//! Panadapter controller: center/bandwidth, zoom, and pixel-dimension
//! setters for one panadapter stream.

use flex_protocol::command_grammar::{self, PanAttr};
use flex_protocol::message::ReplyMessage;

use crate::error::SessionResult;
use crate::handle::SessionHandle;

/// A view over one panadapter, identified by its VITA stream id.
pub struct PanadapterController {
    session: SessionHandle,
    stream_id: u32,
}

impl PanadapterController {
    pub(crate) fn new(session: SessionHandle, stream_id: u32) -> Self {
        Self { session, stream_id }
    }

    /// This controller's stream id.
    pub fn stream_id(&self) -> u32 {
        self.stream_id
    }

    /// `display pan s <streamIdHex> center=<mhz_6dp>`
    pub async fn set_center(&self, freq_mhz: f64) -> SessionResult<ReplyMessage> {
        self.set_attrs(&[PanAttr::CenterMhz(freq_mhz)]).await
    }

    /// `display pan s <streamIdHex> bandwidth=<mhz>`
    pub async fn set_bandwidth(&self, bandwidth_mhz: f64) -> SessionResult<ReplyMessage> {
        self.set_attrs(&[PanAttr::BandwidthMhz(bandwidth_mhz)]).await
    }

    /// `display pan s <streamIdHex> band_zoom=<0|1>`
    pub async fn set_band_zoom(&self, enabled: bool) -> SessionResult<ReplyMessage> {
        self.set_attrs(&[PanAttr::BandZoom(enabled)]).await
    }

    /// `display pan s <streamIdHex> segment_zoom=<0|1>`
    pub async fn set_segment_zoom(&self, enabled: bool) -> SessionResult<ReplyMessage> {
        self.set_attrs(&[PanAttr::SegmentZoom(enabled)]).await
    }

    /// `display pan s <streamIdHex> xpixels=<int> ypixels=<int>`
    pub async fn set_pixel_dimensions(&self, x_pixels: u32, y_pixels: u32) -> SessionResult<ReplyMessage> {
        self.set_attrs(&[PanAttr::Xpixels(x_pixels), PanAttr::Ypixels(y_pixels)]).await
    }

    /// Send an arbitrary batch of `display pan` attributes in one command.
    pub async fn set_attrs(&self, attrs: &[PanAttr]) -> SessionResult<ReplyMessage> {
        self.session.send_raw(command_grammar::display_pan(self.stream_id, attrs)).await
    }
}
