//! Integer and fractional timestamp fields.

use crate::error::{VitaError, VitaResult};

/// 32-bit integer timestamp (seconds, epoch depends on header `tsi`).
pub fn decode_integer(buf: &[u8]) -> VitaResult<u32> {
    if buf.len() < 4 {
        return Err(VitaError::Truncated {
            need: 4,
            got: buf.len(),
        });
    }
    Ok(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]))
}

/// Encode the integer timestamp into `out[0..4]`.
pub fn encode_integer_into(value: u32, out: &mut [u8]) {
    out[0..4].copy_from_slice(&value.to_be_bytes());
}

/// 64-bit fractional timestamp (units depend on header `tsf`).
pub fn decode_fractional(buf: &[u8]) -> VitaResult<u64> {
    if buf.len() < 8 {
        return Err(VitaError::Truncated {
            need: 8,
            got: buf.len(),
        });
    }
    Ok(u64::from_be_bytes([
        buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
    ]))
}

/// Encode the fractional timestamp into `out[0..8]`.
pub fn encode_fractional_into(value: u64, out: &mut [u8]) {
    out[0..8].copy_from_slice(&value.to_be_bytes());
}

/// A Q20 fixed-point value used by waterfall frequency fields: an exact
/// integer scaled by 2^20, giving hertz resolution below 1 Hz without
/// floating point.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Q20(pub i64);

impl Q20 {
    /// Shift amount for the Q20 fixed-point scale.
    pub const SHIFT: u32 = 20;

    /// Construct from an exact hertz value.
    pub fn from_hz(hz: i64) -> Self {
        Q20(hz << Self::SHIFT)
    }

    /// Construct from the raw 64-bit wire value.
    pub fn from_raw(raw: i64) -> Self {
        Q20(raw)
    }

    /// The raw 64-bit wire value.
    pub fn raw(&self) -> i64 {
        self.0
    }

    /// Convert to hertz, truncating any sub-hertz fraction.
    pub fn to_hz(&self) -> i64 {
        self.0 >> Self::SHIFT
    }

    /// Convert to megahertz as a float, for display purposes only.
    pub fn to_mhz(&self) -> f64 {
        (self.0 as f64 / (1i64 << Self::SHIFT) as f64) / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_round_trip() {
        let mut buf = [0u8; 4];
        encode_integer_into(0x0102_0304, &mut buf);
        assert_eq!(decode_integer(&buf).unwrap(), 0x0102_0304);
    }

    #[test]
    fn fractional_round_trip() {
        let mut buf = [0u8; 8];
        encode_fractional_into(0x0102_0304_0506_0708, &mut buf);
        assert_eq!(decode_fractional(&buf).unwrap(), 0x0102_0304_0506_0708);
    }

    #[test]
    fn q20_exact_hz() {
        let q = Q20::from_hz(14_250_000);
        assert_eq!(q.to_hz(), 14_250_000);
        assert!((q.to_mhz() - 14.25).abs() < 1e-9);
    }
}
