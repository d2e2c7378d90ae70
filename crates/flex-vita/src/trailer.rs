//! Trailer word: enable/indicator bit pairs plus an optional associated
//! context packet count.

use crate::error::{VitaError, VitaResult};

/// Size of the trailer field in bytes.
pub const TRAILER_LEN: usize = 4;

/// One enable/indicator bit pair from the trailer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Indicator {
    /// Whether the sender populated this indicator (enable bit).
    pub enabled: bool,
    /// The indicator's value, meaningful only when `enabled`.
    pub value: bool,
}

/// The eight state-and-event indicators carried in the trailer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Trailer {
    /// Calibrated time indicator.
    pub calibrated_time: Indicator,
    /// Valid data indicator.
    pub valid_data: Indicator,
    /// Reference lock indicator.
    pub reference_lock: Indicator,
    /// AGC/MGC indicator (true = AGC, false = MGC).
    pub agc_mgc: Indicator,
    /// Detected signal indicator.
    pub detected_signal: Indicator,
    /// Spectral inversion indicator.
    pub spectral_inversion: Indicator,
    /// Overrange indicator.
    pub overrange: Indicator,
    /// Sample loss indicator.
    pub sample_loss: Indicator,
    /// Associated context packet count, when present (7 bits, 0-127).
    pub associated_context_packet_count: Option<u8>,
}

impl Trailer {
    /// Decode the trailer word from the first 4 bytes of `buf`.
    pub fn decode(buf: &[u8]) -> VitaResult<Self> {
        if buf.len() < TRAILER_LEN {
            return Err(VitaError::MissingTrailer);
        }
        let word = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);

        let bit = |n: u32| (word >> n) & 0x1 != 0;
        let pair = |enable_bit: u32, indicator_bit: u32| Indicator {
            enabled: bit(enable_bit),
            value: bit(indicator_bit),
        };

        let associated_context_packet_count = if bit(7) {
            Some((word & 0x7F) as u8)
        } else {
            None
        };

        Ok(Trailer {
            calibrated_time: pair(31, 19),
            valid_data: pair(30, 18),
            reference_lock: pair(29, 17),
            agc_mgc: pair(28, 16),
            detected_signal: pair(27, 15),
            spectral_inversion: pair(26, 14),
            overrange: pair(25, 13),
            sample_loss: pair(24, 12),
            associated_context_packet_count,
        })
    }

    /// Encode into `out[0..4]`.
    pub fn encode_into(&self, out: &mut [u8]) {
        let mut word: u32 = 0;
        let mut set_pair = |enable_bit: u32, indicator_bit: u32, ind: Indicator| {
            if ind.enabled {
                word |= 1 << enable_bit;
                if ind.value {
                    word |= 1 << indicator_bit;
                }
            }
        };
        set_pair(31, 19, self.calibrated_time);
        set_pair(30, 18, self.valid_data);
        set_pair(29, 17, self.reference_lock);
        set_pair(28, 16, self.agc_mgc);
        set_pair(27, 15, self.detected_signal);
        set_pair(26, 14, self.spectral_inversion);
        set_pair(25, 13, self.overrange);
        set_pair(24, 12, self.sample_loss);
        if let Some(count) = self.associated_context_packet_count {
            word |= 1 << 7;
            word |= (count & 0x7F) as u32;
        }
        out[0..4].copy_from_slice(&word.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_all_set() {
        let t = Trailer {
            calibrated_time: Indicator {
                enabled: true,
                value: true,
            },
            valid_data: Indicator {
                enabled: true,
                value: false,
            },
            reference_lock: Indicator::default(),
            agc_mgc: Indicator {
                enabled: true,
                value: true,
            },
            detected_signal: Indicator::default(),
            spectral_inversion: Indicator::default(),
            overrange: Indicator {
                enabled: true,
                value: true,
            },
            sample_loss: Indicator::default(),
            associated_context_packet_count: Some(42),
        };
        let mut buf = [0u8; 4];
        t.encode_into(&mut buf);
        assert_eq!(Trailer::decode(&buf).unwrap(), t);
    }

    #[test]
    fn missing_trailer_too_short() {
        assert_eq!(Trailer::decode(&[0u8; 2]).unwrap_err(), VitaError::MissingTrailer);
    }
}
