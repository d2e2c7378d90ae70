//! Control-line parsing scenarios drawn from the handshake and
//! rejected-command cases.

use flex_protocol::{format_handle, parse, tokenize, ReplyCode, WireMessage};

#[test]
fn handshake_sequence_parses_in_order() {
    let lines = ["V3.10.10", "H0x7F7C21E0", "R1|0|", "R2|0|"];
    let parsed: Vec<WireMessage> = lines.iter().map(|l| parse(l).unwrap()).collect();

    assert_eq!(parsed[0], WireMessage::Version("3.10.10".to_string()));
    assert!(matches!(parsed[1], WireMessage::Handle(h) if h == 0x7F7C21E0));
    for msg in &parsed[2..] {
        match msg {
            WireMessage::Reply(r) => assert!(r.code.is_accepted()),
            other => panic!("expected reply, got {other:?}"),
        }
    }
}

#[test]
fn rejected_command_carries_documented_description() {
    let msg = parse("R7|50000001|Unable to assign slice").unwrap();
    let WireMessage::Reply(reply) = msg else {
        panic!("expected reply");
    };
    assert_eq!(reply.code, ReplyCode(0x5000_0001));
    assert!(!reply.code.is_accepted());
    assert_eq!(
        reply.code.description(),
        "Unable to get foundation receiver assignment"
    );
}

#[test]
fn slice_tune_status_updates_frequency() {
    let msg = parse("S1|slice 0 RF_frequency=14.075000").unwrap();
    let WireMessage::Status(status) = msg else {
        panic!("expected status");
    };
    let line = tokenize(&status.payload);
    assert_eq!(line.source, "slice");
    assert_eq!(line.positional, vec!["0".to_string()]);
    assert_eq!(line.attr("RF_frequency"), Some("14.075000"));
}

#[test]
fn handle_round_trips_through_format_and_parse() {
    let formatted = format_handle(0x7F7C21E0);
    let reparsed = parse(&format!("H{formatted}")).unwrap();
    assert_eq!(reparsed, WireMessage::Handle(0x7F7C21E0));
}
