//! The top-level VITA-49 packet: header, optional stream id/class id/
//! timestamps, payload, and optional trailer.

use crate::class_id::{ClassId, PacketClass, CLASS_ID_LEN};
use crate::error::{VitaError, VitaResult};
use crate::header::{Header, TsfType, TsiType, HEADER_LEN};
use crate::payload::{discovery, fft, meter, waterfall, Payload};
use crate::timestamp;
use crate::trailer::{Trailer, TRAILER_LEN};

/// A fully decoded VITA-49 packet.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Packet {
    /// The fixed 32-bit header word.
    pub header: Header,
    /// Stream id, present when `header.packet_type.has_stream_id()`.
    pub stream_id: Option<u32>,
    /// Class id, present when `header.has_class_id`.
    pub class_id: Option<ClassId>,
    /// Integer timestamp, present when `header.tsi != TsiType::None`.
    pub integer_timestamp: Option<u32>,
    /// Fractional timestamp, present when `header.tsf != TsfType::None`.
    pub fractional_timestamp: Option<u64>,
    /// The decoded payload, dispatched by class id.
    pub payload: Payload,
    /// Trailer word, present when `header.has_trailer`.
    pub trailer: Option<Trailer>,
}

impl Packet {
    /// Decode a complete packet from `buf`.
    ///
    /// `header.packet_size` (in 32-bit words) governs where the packet
    /// ends within `buf`; bytes after it belong to a following packet and
    /// are not consumed. Fails if the declared size is shorter than the
    /// preamble the header flags imply, if `buf` doesn't hold the full
    /// declared size, or if the trailer flag is set but there's no room
    /// for a trailer word.
    pub fn decode(buf: &[u8]) -> VitaResult<Self> {
        let header = Header::decode(buf)?;
        let preamble_len = header.preamble_len();
        if buf.len() < preamble_len {
            return Err(VitaError::Truncated {
                need: preamble_len,
                got: buf.len(),
            });
        }

        let mut offset = HEADER_LEN;
        let stream_id = if header.packet_type.has_stream_id() {
            let id = u32::from_be_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]);
            offset += 4;
            Some(id)
        } else {
            None
        };
        let class_id = if header.has_class_id {
            let c = ClassId::decode(&buf[offset..offset + CLASS_ID_LEN])?;
            offset += CLASS_ID_LEN;
            Some(c)
        } else {
            None
        };
        let integer_timestamp = if header.tsi != TsiType::None {
            let v = timestamp::decode_integer(&buf[offset..offset + 4])?;
            offset += 4;
            Some(v)
        } else {
            None
        };
        let fractional_timestamp = if header.tsf != TsfType::None {
            let v = timestamp::decode_fractional(&buf[offset..offset + 8])?;
            offset += 8;
            Some(v)
        } else {
            None
        };

        let total_bytes = header.packet_size as usize * 4;
        if total_bytes < preamble_len {
            return Err(VitaError::PayloadOutOfBounds {
                declared: header.packet_size as usize,
                available: buf.len() / 4,
            });
        }
        if buf.len() < total_bytes {
            return Err(VitaError::Truncated {
                need: total_bytes,
                got: buf.len(),
            });
        }

        let trailer_len = if header.has_trailer { TRAILER_LEN } else { 0 };
        if total_bytes < preamble_len + trailer_len {
            return Err(VitaError::MissingTrailer);
        }
        let payload_end = total_bytes - trailer_len;
        let payload_bytes = &buf[offset..payload_end];
        let trailer = if header.has_trailer {
            Some(Trailer::decode(&buf[payload_end..payload_end + TRAILER_LEN])?)
        } else {
            None
        };

        let payload = decode_payload(class_id.as_ref().map(ClassId::packet_class), payload_bytes)?;

        Ok(Packet {
            header,
            stream_id,
            class_id,
            integer_timestamp,
            fractional_timestamp,
            payload,
            trailer,
        })
    }

    /// Encode this packet to its wire form.
    ///
    /// `header.packet_size`, `header.has_class_id`, and `header.has_trailer`
    /// are recomputed from the packet's actual fields, never taken from
    /// whatever value a caller may have left on `self.header` — the
    /// encoder is the single source of truth for framing.
    pub fn encode(&self) -> Vec<u8> {
        let payload_bytes = encode_payload(&self.payload);

        let mut preamble_len = HEADER_LEN;
        if self.header.packet_type.has_stream_id() {
            preamble_len += 4;
        }
        if self.class_id.is_some() {
            preamble_len += CLASS_ID_LEN;
        }
        if self.header.tsi != TsiType::None {
            preamble_len += 4;
        }
        if self.header.tsf != TsfType::None {
            preamble_len += 8;
        }
        let trailer_len = if self.trailer.is_some() { TRAILER_LEN } else { 0 };
        let total_len = preamble_len + payload_bytes.len() + trailer_len;
        let padded_len = (total_len + 3) & !3;

        let mut header = self.header;
        header.has_class_id = self.class_id.is_some();
        header.has_trailer = self.trailer.is_some();
        header.packet_size = (padded_len / 4) as u16;

        let mut buf = vec![0u8; padded_len];
        let mut offset = 0;
        header.encode_into(&mut buf[offset..offset + HEADER_LEN]);
        offset += HEADER_LEN;
        if let Some(stream_id) = self.stream_id {
            buf[offset..offset + 4].copy_from_slice(&stream_id.to_be_bytes());
            offset += 4;
        }
        if let Some(class_id) = &self.class_id {
            class_id.encode_into(&mut buf[offset..offset + CLASS_ID_LEN]);
            offset += CLASS_ID_LEN;
        }
        if let Some(ts) = self.integer_timestamp {
            timestamp::encode_integer_into(ts, &mut buf[offset..offset + 4]);
            offset += 4;
        }
        if let Some(ts) = self.fractional_timestamp {
            timestamp::encode_fractional_into(ts, &mut buf[offset..offset + 8]);
            offset += 8;
        }
        buf[offset..offset + payload_bytes.len()].copy_from_slice(&payload_bytes);
        offset += payload_bytes.len();
        if let Some(trailer) = &self.trailer {
            trailer.encode_into(&mut buf[offset..offset + TRAILER_LEN]);
        }
        buf
    }
}

fn decode_payload(class: Option<PacketClass>, bytes: &[u8]) -> VitaResult<Payload> {
    match class {
        Some(PacketClass::Meter) => Ok(Payload::Meter(meter::decode(bytes)?)),
        Some(PacketClass::Panadapter) => Ok(Payload::Fft(fft::decode(bytes)?)),
        Some(PacketClass::Waterfall) => Ok(Payload::Waterfall(waterfall::decode(bytes)?)),
        Some(PacketClass::Discovery) => Ok(Payload::Discovery(discovery::decode(bytes)?)),
        _ => Ok(Payload::Opaque(bytes.to_vec())),
    }
}

fn encode_payload(payload: &Payload) -> Vec<u8> {
    match payload {
        Payload::Meter(samples) => meter::encode(samples),
        Payload::Fft(packet) => fft::encode(packet),
        Payload::Waterfall(tile) => waterfall::encode(tile),
        Payload::Discovery(pairs) => discovery::encode(pairs),
        Payload::Opaque(bytes) => bytes.clone(),
    }
}
