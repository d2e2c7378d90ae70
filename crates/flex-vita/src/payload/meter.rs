//! Meter payload: a sequence of (id, value) pairs.

use crate::error::VitaResult;

/// One meter sample: a numeric meter id paired with its raw signed value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MeterSample {
    /// Meter id.
    pub id: u16,
    /// Raw signed value; scale per unit happens in the state store (see
    /// `flex-state`'s meter unit table), not here.
    pub value: i16,
}

/// Decode a meter payload into `out`, reusing its existing capacity.
///
/// The sample count is `payload.len() / 4`; any trailing odd bytes are
/// ignored (a malformed but harmless truncation).
pub fn decode_into(payload: &[u8], out: &mut Vec<MeterSample>) -> VitaResult<()> {
    out.clear();
    out.reserve(payload.len() / 4);
    for chunk in payload.chunks_exact(4) {
        let id = u16::from_be_bytes([chunk[0], chunk[1]]);
        let value = i16::from_be_bytes([chunk[2], chunk[3]]);
        out.push(MeterSample { id, value });
    }
    Ok(())
}

/// Decode a meter payload into a freshly allocated vector.
pub fn decode(payload: &[u8]) -> VitaResult<Vec<MeterSample>> {
    let mut out = Vec::new();
    decode_into(payload, &mut out)?;
    Ok(out)
}

/// Encode meter samples to their wire form.
pub fn encode(samples: &[MeterSample]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(samples.len() * 4);
    for s in samples {
        buf.extend_from_slice(&s.id.to_be_bytes());
        buf.extend_from_slice(&s.value.to_be_bytes());
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let samples = vec![
            MeterSample { id: 1, value: -12800 },
            MeterSample { id: 2, value: 3328 },
        ];
        let bytes = encode(&samples);
        assert_eq!(bytes.len(), 8);
        assert_eq!(decode(&bytes).unwrap(), samples);
    }

    #[test]
    fn ignores_trailing_odd_bytes() {
        let mut bytes = encode(&[MeterSample { id: 1, value: 2 }]);
        bytes.push(0xFF);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn decode_into_reuses_buffer() {
        let mut out = Vec::with_capacity(16);
        let ptr_before = out.as_ptr();
        let bytes = encode(&[MeterSample { id: 9, value: 9 }]);
        decode_into(&bytes, &mut out).unwrap();
        assert_eq!(out.as_ptr(), ptr_before);
    }
}
