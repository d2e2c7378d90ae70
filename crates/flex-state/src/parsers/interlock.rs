//! Interlock entity: the radio's singleton TX-safety state machine
//! (PTT arbitration, timeout guards, accessory relay enables).

use flex_protocol::StatusLine;

use crate::attrs::{integer, string, truthy};
use crate::snapshot::EntitySnapshot;

/// Interlock state machine states, as broadcast verbatim.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum InterlockState {
    Receive,
    Ready,
    NotReady,
    PttRequested,
    Transmitting,
    TxFault,
    Timeout,
    StuckInput,
    Unkeyed,
    UnkeyRequested,
    Unknown(String),
}

impl InterlockState {
    fn parse(raw: &str) -> Self {
        match raw {
            "RECEIVE" => InterlockState::Receive,
            "READY" => InterlockState::Ready,
            "NOT_READY" => InterlockState::NotReady,
            "PTT_REQUESTED" => InterlockState::PttRequested,
            "TRANSMITTING" => InterlockState::Transmitting,
            "TX_FAULT" => InterlockState::TxFault,
            "TIMEOUT" => InterlockState::Timeout,
            "STUCK_INPUT" => InterlockState::StuckInput,
            "UNKEYED" => InterlockState::Unkeyed,
            "UNKEY_REQUESTED" => InterlockState::UnkeyRequested,
            other => InterlockState::Unknown(other.to_string()),
        }
    }
}

impl Default for InterlockState {
    fn default() -> Self {
        InterlockState::Receive
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct InterlockSnapshot {
    pub state: InterlockState,
    pub source: String,
    pub tx1_enabled: bool,
    pub tx2_enabled: bool,
    pub tx3_enabled: bool,
    pub acc_tx_enabled: bool,
    pub tx_delay_ms: u32,
    pub timeout_s: u32,
    pub reason: String,
}

const SOURCE: &str = "interlock";

impl EntitySnapshot for InterlockSnapshot {
    const SOURCE: &'static str = SOURCE;

    fn apply(previous: Option<&Self>, line: &StatusLine) -> (Self, Vec<&'static str>) {
        let mut next = previous.cloned().unwrap_or_default();
        let mut diff = Vec::new();

        if let Some(raw) = line.attr("state") {
            let v = InterlockState::parse(raw);
            if next.state != v {
                next.state = v;
                diff.push("state");
            }
        }
        if let Some(v) = string(line, "source") {
            if next.source != v {
                next.source = v;
                diff.push("source");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "tx1_enabled") {
            if next.tx1_enabled != v {
                next.tx1_enabled = v;
                diff.push("tx1_enabled");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "tx2_enabled") {
            if next.tx2_enabled != v {
                next.tx2_enabled = v;
                diff.push("tx2_enabled");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "tx3_enabled") {
            if next.tx3_enabled != v {
                next.tx3_enabled = v;
                diff.push("tx3_enabled");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "acc_tx_enabled") {
            if next.acc_tx_enabled != v {
                next.acc_tx_enabled = v;
                diff.push("acc_tx_enabled");
            }
        }
        if let Some(v) = integer(line, SOURCE, "tx_delay") {
            if next.tx_delay_ms != v as u32 {
                next.tx_delay_ms = v as u32;
                diff.push("tx_delay_ms");
            }
        }
        if let Some(v) = integer(line, SOURCE, "timeout") {
            if next.timeout_s != v as u32 {
                next.timeout_s = v as u32;
                diff.push("timeout_s");
            }
        }
        if let Some(v) = string(line, "reason") {
            if next.reason != v {
                next.reason = v;
                diff.push("reason");
            }
        }

        (next, diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flex_protocol::tokenize;

    #[test]
    fn state_transitions_are_tracked_and_diffed() {
        let (ready, diff) = InterlockSnapshot::apply(None, &tokenize("interlock state=READY"));
        assert_eq!(ready.state, InterlockState::Ready);
        assert!(diff.contains(&"state"));

        let (tx, diff) = InterlockSnapshot::apply(Some(&ready), &tokenize("interlock state=TRANSMITTING"));
        assert_eq!(tx.state, InterlockState::Transmitting);
        assert!(diff.contains(&"state"));
    }
}
