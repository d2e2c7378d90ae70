//! Waterfall payload: a 36-byte header plus a `width * height` grid of
//! intensity samples.

use crate::error::{VitaError, VitaResult};
use crate::timestamp::Q20;

/// Size of the waterfall payload header in bytes.
pub const HEADER_LEN: usize = 36;

/// Header of a waterfall tile packet.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct WaterfallHeader {
    /// Frequency at the left edge of the tile.
    pub frame_low_frequency: Q20,
    /// Frequency spanned by each bin.
    pub bin_bandwidth: Q20,
    /// Duration of one line, in milliseconds.
    pub line_duration_ms: u32,
    /// Tile width, in bins.
    pub width: u16,
    /// Tile height, in lines.
    pub height: u16,
    /// Radio-assigned timecode for this tile.
    pub timecode: u32,
    /// Auto black level suggested by the radio.
    pub auto_black_level: u32,
    /// Total number of bins in the full waterfall frame.
    pub total_bins_in_frame: u16,
    /// Offset, in bins, of the first bin in this tile within the frame.
    pub first_bin_index: u16,
}

impl WaterfallHeader {
    /// Decode the 36-byte waterfall header from `buf`.
    pub fn decode(buf: &[u8]) -> VitaResult<Self> {
        if buf.len() < HEADER_LEN {
            return Err(VitaError::Truncated {
                need: HEADER_LEN,
                got: buf.len(),
            });
        }
        let u64_at = |off: usize| {
            u64::from_be_bytes([
                buf[off],
                buf[off + 1],
                buf[off + 2],
                buf[off + 3],
                buf[off + 4],
                buf[off + 5],
                buf[off + 6],
                buf[off + 7],
            ])
        };
        let u32_at = |off: usize| u32::from_be_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]]);
        let u16_at = |off: usize| u16::from_be_bytes([buf[off], buf[off + 1]]);

        Ok(WaterfallHeader {
            frame_low_frequency: Q20::from_raw(u64_at(0) as i64),
            bin_bandwidth: Q20::from_raw(u64_at(8) as i64),
            line_duration_ms: u32_at(16),
            width: u16_at(20),
            height: u16_at(22),
            timecode: u32_at(24),
            auto_black_level: u32_at(28),
            total_bins_in_frame: u16_at(32),
            first_bin_index: u16_at(34),
        })
    }

    /// Encode into `out[0..36]`.
    pub fn encode_into(&self, out: &mut [u8]) {
        out[0..8].copy_from_slice(&(self.frame_low_frequency.raw() as u64).to_be_bytes());
        out[8..16].copy_from_slice(&(self.bin_bandwidth.raw() as u64).to_be_bytes());
        out[16..20].copy_from_slice(&self.line_duration_ms.to_be_bytes());
        out[20..22].copy_from_slice(&self.width.to_be_bytes());
        out[22..24].copy_from_slice(&self.height.to_be_bytes());
        out[24..28].copy_from_slice(&self.timecode.to_be_bytes());
        out[28..32].copy_from_slice(&self.auto_black_level.to_be_bytes());
        out[32..34].copy_from_slice(&self.total_bins_in_frame.to_be_bytes());
        out[34..36].copy_from_slice(&self.first_bin_index.to_be_bytes());
    }
}

/// A decoded waterfall tile: header plus its sample grid.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct WaterfallTile {
    /// The tile header.
    pub header: WaterfallHeader,
    /// `width * height` intensity samples, row-major.
    pub samples: Vec<u16>,
}

/// Decode a waterfall payload into `samples`, reusing its existing
/// capacity. The sample region is zero-padded to a 32-bit boundary on the
/// wire; any such padding is consumed and discarded.
pub fn decode_into(payload: &[u8], out: &mut Vec<u16>) -> VitaResult<WaterfallHeader> {
    let header = WaterfallHeader::decode(payload)?;
    let body = &payload[HEADER_LEN..];
    let count = header.width as usize * header.height as usize;

    out.clear();
    out.reserve(count);
    for i in 0..count {
        let offset = i * 2;
        if offset + 2 > body.len() {
            out.push(0);
            continue;
        }
        out.push(u16::from_be_bytes([body[offset], body[offset + 1]]));
    }
    Ok(header)
}

/// Decode a complete waterfall tile into a freshly allocated [`WaterfallTile`].
pub fn decode(payload: &[u8]) -> VitaResult<WaterfallTile> {
    let mut samples = Vec::new();
    let header = decode_into(payload, &mut samples)?;
    Ok(WaterfallTile { header, samples })
}

/// Encode a waterfall tile to its wire form, zero-padding the sample
/// region out to a 32-bit boundary.
pub fn encode(tile: &WaterfallTile) -> Vec<u8> {
    let sample_bytes = tile.samples.len() * 2;
    let padded_len = (sample_bytes + 3) & !3;
    let mut buf = vec![0u8; HEADER_LEN + padded_len];
    tile.header.encode_into(&mut buf[0..HEADER_LEN]);
    for (i, &sample) in tile.samples.iter().enumerate() {
        let offset = HEADER_LEN + i * 2;
        buf[offset..offset + 2].copy_from_slice(&sample.to_be_bytes());
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header(width: u16, height: u16) -> WaterfallHeader {
        WaterfallHeader {
            frame_low_frequency: Q20::from_hz(14_000_000),
            bin_bandwidth: Q20::from_hz(100),
            line_duration_ms: 100,
            width,
            height,
            timecode: 7,
            auto_black_level: 12,
            total_bins_in_frame: width,
            first_bin_index: 0,
        }
    }

    #[test]
    fn round_trip() {
        let tile = WaterfallTile {
            header: sample_header(4, 2),
            samples: vec![1, 2, 3, 4, 5, 6, 7, 8],
        };
        let bytes = encode(&tile);
        assert_eq!(decode(&bytes).unwrap(), tile);
    }

    #[test]
    fn pads_sample_region_to_32_bit_boundary() {
        let tile = WaterfallTile {
            header: sample_header(3, 1),
            samples: vec![1, 2, 3],
        };
        let bytes = encode(&tile);
        assert_eq!((bytes.len() - HEADER_LEN) % 4, 0);
    }

    #[test]
    fn truncated_payload_zero_fills_missing_samples() {
        let tile = WaterfallTile {
            header: sample_header(4, 1),
            samples: vec![11, 22, 33, 44],
        };
        let mut bytes = encode(&tile);
        bytes.truncate(HEADER_LEN + 4);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.samples, vec![11, 22, 0, 0]);
    }
}
