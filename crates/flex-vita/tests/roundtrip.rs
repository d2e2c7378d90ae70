//! Cross-class round-trip coverage for the packet codec: for every
//! packet class this crate knows about, `decode(encode(p)) == p`.

use flex_vita::class_id::{ClassId, PacketClass};
use flex_vita::header::{Header, PacketType, TsfType, TsiType};
use flex_vita::packet::Packet;
use flex_vita::payload::meter::MeterSample;
use flex_vita::payload::{fft, waterfall, Payload};
use flex_vita::timestamp::Q20;
use flex_vita::Trailer;

fn base_header() -> Header {
    Header {
        packet_type: PacketType::ExtDataWithStream,
        has_class_id: true,
        has_trailer: false,
        tsi: TsiType::None,
        tsf: TsfType::None,
        packet_count: 0,
        packet_size: 0,
    }
}

fn class_id_for(class: PacketClass) -> ClassId {
    ClassId {
        oui: 0x00_1C2D,
        information_class_code: 0,
        packet_class_code: class.code(),
    }
}

#[test]
fn meter_packet_round_trips() {
    let packet = Packet {
        header: base_header(),
        stream_id: Some(7),
        class_id: Some(class_id_for(PacketClass::Meter)),
        integer_timestamp: None,
        fractional_timestamp: None,
        payload: Payload::Meter(vec![
            MeterSample { id: 1, value: -12800 },
            MeterSample { id: 2, value: 3328 },
        ]),
        trailer: None,
    };
    assert_eq!(Packet::decode(&packet.encode()).unwrap(), packet);
}

#[test]
fn fft_packet_round_trips() {
    let packet = Packet {
        header: base_header(),
        stream_id: Some(1),
        class_id: Some(class_id_for(PacketClass::Panadapter)),
        integer_timestamp: None,
        fractional_timestamp: None,
        payload: Payload::Fft(fft::FftPacket {
            header: fft::FftHeader {
                start_bin_index: 0,
                num_bins: 16,
                bin_size: 2,
                total_bins_in_frame: 16,
                frame_index: 3,
            },
            bins: (0..16).collect(),
        }),
        trailer: None,
    };
    assert_eq!(Packet::decode(&packet.encode()).unwrap(), packet);
}

#[test]
fn waterfall_packet_round_trips() {
    let packet = Packet {
        header: base_header(),
        stream_id: Some(1),
        class_id: Some(class_id_for(PacketClass::Waterfall)),
        integer_timestamp: None,
        fractional_timestamp: None,
        payload: Payload::Waterfall(waterfall::WaterfallTile {
            header: waterfall::WaterfallHeader {
                frame_low_frequency: Q20::from_hz(14_000_000),
                bin_bandwidth: Q20::from_hz(50),
                line_duration_ms: 100,
                width: 8,
                height: 2,
                timecode: 99,
                auto_black_level: 4,
                total_bins_in_frame: 8,
                first_bin_index: 0,
            },
            samples: (0..16).collect(),
        }),
        trailer: None,
    };
    assert_eq!(Packet::decode(&packet.encode()).unwrap(), packet);
}

#[test]
fn discovery_packet_round_trips_with_timestamp_and_trailer() {
    let mut header = base_header();
    header.tsi = TsiType::Utc;
    header.tsf = TsfType::RealTimePicoseconds;
    let packet = Packet {
        header,
        stream_id: Some(0xABCD),
        class_id: Some(class_id_for(PacketClass::Discovery)),
        integer_timestamp: Some(1_700_000_000),
        fractional_timestamp: Some(500_000_000_000),
        payload: Payload::Discovery(vec![
            ("serial".to_string(), "1234-5678-9012".to_string()),
            ("model".to_string(), "FLEX-6600".to_string()),
        ]),
        trailer: Some(Trailer::default()),
    };
    assert_eq!(Packet::decode(&packet.encode()).unwrap(), packet);
}

#[test]
fn opaque_dax_packet_round_trips() {
    let packet = Packet {
        header: base_header(),
        stream_id: Some(1),
        class_id: Some(class_id_for(PacketClass::Dax(0x02E3))),
        integer_timestamp: None,
        fractional_timestamp: None,
        payload: Payload::Opaque(vec![0xDE, 0xAD, 0xBE, 0xEF]),
        trailer: None,
    };
    assert_eq!(Packet::decode(&packet.encode()).unwrap(), packet);
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn meter_samples() -> impl Strategy<Value = Vec<MeterSample>> {
        prop::collection::vec(
            (any::<u16>(), any::<i16>()).prop_map(|(id, value)| MeterSample { id, value }),
            0..32,
        )
    }

    proptest! {
        #[test]
        fn meter_payload_round_trips(samples in meter_samples()) {
            let packet = Packet {
                header: base_header(),
                stream_id: Some(1),
                class_id: Some(class_id_for(PacketClass::Meter)),
                integer_timestamp: None,
                fractional_timestamp: None,
                payload: Payload::Meter(samples),
                trailer: None,
            };
            let decoded = Packet::decode(&packet.encode()).unwrap();
            prop_assert_eq!(decoded, packet);
        }

        #[test]
        fn discovery_payload_round_trips(
            keys in prop::collection::vec("[a-z_]{1,12}", 0..8),
            values in prop::collection::vec("[A-Za-z0-9.-]{0,16}", 0..8),
        ) {
            let pairs: Vec<(String, String)> = keys.into_iter().zip(values).collect();
            let packet = Packet {
                header: base_header(),
                stream_id: Some(1),
                class_id: Some(class_id_for(PacketClass::Discovery)),
                integer_timestamp: None,
                fractional_timestamp: None,
                payload: Payload::Discovery(pairs),
                trailer: None,
            };
            let decoded = Packet::decode(&packet.encode()).unwrap();
            prop_assert_eq!(decoded, packet);
        }

        #[test]
        fn q20_hz_round_trips_within_sub_hertz_precision(hz in -500_000_000i64..500_000_000i64) {
            let q = Q20::from_hz(hz);
            prop_assert_eq!(q.to_hz(), hz);
        }
    }
}
