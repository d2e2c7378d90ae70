//! Panadapter FFT payload: a 12-byte header plus `numBins` amplitude samples.

use crate::error::{VitaError, VitaResult};

/// Size of the FFT payload header in bytes.
pub const HEADER_LEN: usize = 12;

/// Header of a panadapter FFT packet.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FftHeader {
    /// Offset, in bins, of the first bin in this packet within the frame.
    pub start_bin_index: u16,
    /// Number of bins carried in this packet.
    pub num_bins: u16,
    /// Bytes per bin value on the wire (typically 2).
    pub bin_size: u16,
    /// Total number of bins in the complete frame.
    pub total_bins_in_frame: u16,
    /// Frame sequence number; chunks sharing a `frame_index` belong to the
    /// same frame (see `flex-session::reassembly`).
    pub frame_index: u32,
}

impl FftHeader {
    /// Decode the 12-byte FFT header from `buf`.
    pub fn decode(buf: &[u8]) -> VitaResult<Self> {
        if buf.len() < HEADER_LEN {
            return Err(VitaError::Truncated {
                need: HEADER_LEN,
                got: buf.len(),
            });
        }
        Ok(FftHeader {
            start_bin_index: u16::from_be_bytes([buf[0], buf[1]]),
            num_bins: u16::from_be_bytes([buf[2], buf[3]]),
            bin_size: u16::from_be_bytes([buf[4], buf[5]]),
            total_bins_in_frame: u16::from_be_bytes([buf[6], buf[7]]),
            frame_index: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
        })
    }

    /// Encode into `out[0..12]`.
    pub fn encode_into(&self, out: &mut [u8]) {
        out[0..2].copy_from_slice(&self.start_bin_index.to_be_bytes());
        out[2..4].copy_from_slice(&self.num_bins.to_be_bytes());
        out[4..6].copy_from_slice(&self.bin_size.to_be_bytes());
        out[6..8].copy_from_slice(&self.total_bins_in_frame.to_be_bytes());
        out[8..12].copy_from_slice(&self.frame_index.to_be_bytes());
    }
}

/// A decoded FFT packet: header plus its bin values.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FftPacket {
    /// The packet header.
    pub header: FftHeader,
    /// Amplitude bins, one per `header.num_bins` (or fewer if the payload
    /// was truncated — missing bins read as zero).
    pub bins: Vec<u16>,
}

/// Decode an FFT payload into `bins`, reusing its existing capacity.
///
/// When `bin_size >= 2` each value is taken from the *last* two bytes of
/// its `bin_size`-byte slot, big-endian. When `bin_size == 1` the value is
/// the single byte, zero-extended. Bins beyond what the (possibly
/// truncated) payload actually contains are filled with zero, per §4.1.
pub fn decode_into(payload: &[u8], out: &mut Vec<u16>) -> VitaResult<FftHeader> {
    let header = FftHeader::decode(payload)?;
    let body = &payload[HEADER_LEN..];
    let bin_size = header.bin_size.max(1) as usize;

    out.clear();
    out.reserve(header.num_bins as usize);
    for i in 0..header.num_bins as usize {
        let offset = i * bin_size;
        if offset + bin_size > body.len() {
            out.push(0);
            continue;
        }
        let slot = &body[offset..offset + bin_size];
        let value = if bin_size >= 2 {
            let hi = slot[bin_size - 2];
            let lo = slot[bin_size - 1];
            u16::from_be_bytes([hi, lo])
        } else {
            slot[0] as u16
        };
        out.push(value);
    }
    Ok(header)
}

/// Decode a complete FFT packet into a freshly allocated [`FftPacket`].
pub fn decode(payload: &[u8]) -> VitaResult<FftPacket> {
    let mut bins = Vec::new();
    let header = decode_into(payload, &mut bins)?;
    Ok(FftPacket { header, bins })
}

/// Encode an FFT packet to its wire form. `bin_size` in the header
/// controls how many bytes each bin occupies (values are right-justified
/// big-endian within their slot, matching the decoder's convention).
pub fn encode(packet: &FftPacket) -> Vec<u8> {
    let bin_size = packet.header.bin_size.max(1) as usize;
    let mut buf = vec![0u8; HEADER_LEN + packet.bins.len() * bin_size];
    packet.header.encode_into(&mut buf[0..HEADER_LEN]);
    for (i, &bin) in packet.bins.iter().enumerate() {
        let offset = HEADER_LEN + i * bin_size;
        let bytes = bin.to_be_bytes();
        if bin_size >= 2 {
            buf[offset + bin_size - 2..offset + bin_size].copy_from_slice(&bytes);
        } else {
            buf[offset] = bytes[1];
        }
    }
    buf
}
