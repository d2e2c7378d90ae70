//! VITA-49 packet header (the single 32-bit preamble word).
//!
//! Layout (MSB to LSB): packet-type(4) has-class-id(1) has-trailer(1)
//! reserved(2) tsi(2) tsf(2) packet-count(4) packet-size(16).

use crate::error::{VitaError, VitaResult};

/// Which of the six packet shapes FlexRadio's VITA-49 traffic uses.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PacketType {
    /// Signal/IF data, no stream id.
    IfData,
    /// Signal/IF data, with stream id.
    IfDataWithStream,
    /// Extension data, no stream id.
    ExtData,
    /// Extension data, with stream id.
    ExtDataWithStream,
    /// IF context packet (always carries a stream id).
    IfContext,
    /// Extension context packet (always carries a stream id).
    ExtContext,
}

impl PacketType {
    /// Whether this packet type carries a stream id field.
    pub fn has_stream_id(&self) -> bool {
        !matches!(self, PacketType::IfData | PacketType::ExtData)
    }

    fn from_bits(bits: u8) -> VitaResult<Self> {
        match bits {
            0x0 => Ok(PacketType::IfData),
            0x1 => Ok(PacketType::IfDataWithStream),
            0x2 => Ok(PacketType::ExtData),
            0x3 => Ok(PacketType::ExtDataWithStream),
            0x4 => Ok(PacketType::IfContext),
            0x5 => Ok(PacketType::ExtContext),
            other => Err(VitaError::UnsupportedPacketType(other)),
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            PacketType::IfData => 0x0,
            PacketType::IfDataWithStream => 0x1,
            PacketType::ExtData => 0x2,
            PacketType::ExtDataWithStream => 0x3,
            PacketType::IfContext => 0x4,
            PacketType::ExtContext => 0x5,
        }
    }
}

/// Integer timestamp encoding (bits 23-22).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum TsiType {
    /// No integer timestamp field present.
    #[default]
    None,
    /// UTC seconds.
    Utc,
    /// GPS seconds.
    Gps,
    /// Vendor-defined "other" epoch.
    Other,
}

impl TsiType {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => TsiType::None,
            1 => TsiType::Utc,
            2 => TsiType::Gps,
            _ => TsiType::Other,
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            TsiType::None => 0,
            TsiType::Utc => 1,
            TsiType::Gps => 2,
            TsiType::Other => 3,
        }
    }
}

/// Fractional timestamp encoding (bits 21-20).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum TsfType {
    /// No fractional timestamp field present.
    #[default]
    None,
    /// Sample count.
    SampleCount,
    /// Real time, picoseconds.
    RealTimePicoseconds,
    /// Free-running count, implementation defined units.
    FreeRunning,
}

impl TsfType {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => TsfType::None,
            1 => TsfType::SampleCount,
            2 => TsfType::RealTimePicoseconds,
            _ => TsfType::FreeRunning,
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            TsfType::None => 0,
            TsfType::SampleCount => 1,
            TsfType::RealTimePicoseconds => 2,
            TsfType::FreeRunning => 3,
        }
    }
}

/// The 32-bit VITA-49 packet header preamble.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Header {
    /// Packet shape.
    pub packet_type: PacketType,
    /// Whether a class-id field follows.
    pub has_class_id: bool,
    /// Whether a trailer word follows the payload.
    pub has_trailer: bool,
    /// Integer timestamp encoding.
    pub tsi: TsiType,
    /// Fractional timestamp encoding.
    pub tsf: TsfType,
    /// Packet count modulo 16, incremented per stream by the sender.
    pub packet_count: u8,
    /// Total packet size in 32-bit words, including this header word.
    pub packet_size: u16,
}

/// Header word size in bytes.
pub const HEADER_LEN: usize = 4;

impl Header {
    /// Decode the header word from the first 4 bytes of `buf`.
    pub fn decode(buf: &[u8]) -> VitaResult<Self> {
        if buf.len() < HEADER_LEN {
            return Err(VitaError::Truncated {
                need: HEADER_LEN,
                got: buf.len(),
            });
        }
        let word = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let packet_type = PacketType::from_bits(((word >> 28) & 0xF) as u8)?;
        let has_class_id = (word >> 27) & 0x1 != 0;
        let has_trailer = (word >> 26) & 0x1 != 0;
        let tsi = TsiType::from_bits(((word >> 22) & 0x3) as u8);
        let tsf = TsfType::from_bits(((word >> 20) & 0x3) as u8);
        let packet_count = ((word >> 16) & 0xF) as u8;
        let packet_size = (word & 0xFFFF) as u16;
        Ok(Header {
            packet_type,
            has_class_id,
            has_trailer,
            tsi,
            tsf,
            packet_count,
            packet_size,
        })
    }

    /// Encode the header word into `out[0..4]`.
    pub fn encode_into(&self, out: &mut [u8]) {
        let mut word: u32 = 0;
        word |= (self.packet_type.to_bits() as u32) << 28;
        word |= (self.has_class_id as u32) << 27;
        word |= (self.has_trailer as u32) << 26;
        word |= (self.tsi.to_bits() as u32) << 22;
        word |= (self.tsf.to_bits() as u32) << 20;
        word |= ((self.packet_count & 0xF) as u32) << 16;
        word |= self.packet_size as u32;
        out[0..4].copy_from_slice(&word.to_be_bytes());
    }

    /// Minimum preamble size in bytes implied by this header's flags:
    /// the header word itself, plus stream id, class id, and timestamp
    /// fields when present. Does not include payload or trailer.
    pub fn preamble_len(&self) -> usize {
        let mut len = HEADER_LEN;
        if self.packet_type.has_stream_id() {
            len += 4;
        }
        if self.has_class_id {
            len += 8;
        }
        if self.tsi != TsiType::None {
            len += 4;
        }
        if self.tsf != TsfType::None {
            len += 8;
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_simple() {
        let h = Header {
            packet_type: PacketType::IfDataWithStream,
            has_class_id: true,
            has_trailer: true,
            tsi: TsiType::Utc,
            tsf: TsfType::RealTimePicoseconds,
            packet_count: 7,
            packet_size: 1234,
        };
        let mut buf = [0u8; 4];
        h.encode_into(&mut buf);
        let decoded = Header::decode(&buf).unwrap();
        assert_eq!(h, decoded);
    }

    #[test]
    fn truncated_buffer() {
        let err = Header::decode(&[0u8; 2]).unwrap_err();
        assert_eq!(
            err,
            VitaError::Truncated {
                need: HEADER_LEN,
                got: 2
            }
        );
    }

    #[test]
    fn preamble_len_accounts_for_optional_fields() {
        let h = Header {
            packet_type: PacketType::IfContext,
            has_class_id: true,
            has_trailer: false,
            tsi: TsiType::Utc,
            tsf: TsfType::SampleCount,
            packet_count: 0,
            packet_size: 0,
        };
        // header(4) + stream(4) + class_id(8) + tsi(4) + tsf(8) = 28
        assert_eq!(h.preamble_len(), 28);
    }

    #[test]
    fn unsupported_packet_type_bits() {
        // bits 31-28 = 0xF is reserved
        let buf = [0xF0u8, 0x00, 0x00, 0x00];
        let err = Header::decode(&buf).unwrap_err();
        assert_eq!(err, VitaError::UnsupportedPacketType(0xF));
    }
}
