//! Per-class payload codecs, dispatched from [`crate::class_id::PacketClass`].

pub mod discovery;
pub mod fft;
pub mod meter;
pub mod waterfall;

/// A decoded payload, tagged by its packet class.
///
/// Classes with no dedicated parser (DAX IQ/audio, and anything unknown)
/// are carried as opaque byte slices; callers that need them decode the
/// bytes themselves (for example DAX audio frames, which `flex-session`
/// feeds straight to an Opus decoder without going through this crate).
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Payload {
    /// Meter samples.
    Meter(Vec<meter::MeterSample>),
    /// Panadapter FFT frame.
    Fft(fft::FftPacket),
    /// Waterfall tile.
    Waterfall(waterfall::WaterfallTile),
    /// Discovery beacon key/value pairs.
    Discovery(Vec<(String, String)>),
    /// Anything else, carried verbatim.
    Opaque(Vec<u8>),
}
