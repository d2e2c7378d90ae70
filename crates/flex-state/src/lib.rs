//! Entity snapshot store: turns the radio's `S<handle>|...` status
//! broadcast stream into typed, diffed snapshots per entity kind.
//!
//! Each entity kind gets its own [`snapshot::Store`] keyed by whatever
//! identifies it on the wire (a slice letter, a stream id, a feature
//! name, or nothing at all for the handful of true singletons). The
//! top-level [`StateStore`] just routes an already-tokenized
//! [`flex_protocol::StatusLine`] to the right one by its `source` word.

pub mod attrs;
pub mod error;
pub mod parsers;
pub mod snapshot;

pub use error::{StateError, StateResult};
pub use snapshot::{Change, EntitySnapshot, Store};

pub use parsers::apd::ApdSnapshot;
pub use parsers::audio_stream::AudioStreamSnapshot;
pub use parsers::equalizer::EqualizerSnapshot;
pub use parsers::gui_client::GuiClientSnapshot;
pub use parsers::interlock::{InterlockSnapshot, InterlockState};
pub use parsers::license::LicenseSnapshot;
pub use parsers::meter::{MeterSnapshot, MeterUnit};
pub use parsers::panadapter::PanadapterSnapshot;
pub use parsers::radio::RadioSnapshot;
pub use parsers::slice::{AgcSettings, Mode, NoiseReduction, SliceSnapshot};
pub use parsers::transmit::TransmitSnapshot;
pub use parsers::waterfall::WaterfallSnapshot;

use flex_protocol::command_grammar::EqChain;
use flex_protocol::StatusLine;

/// Identifies one entity instance across all entity kinds, for event
/// reporting. Carries no borrowed data so callers can hold it past the
/// status line that produced it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum EntityId {
    Slice(String),
    Panadapter(u32),
    Waterfall(u32),
    Meter(u16),
    AudioStream(u32),
    GuiClient(u32),
    Apd,
    Equalizer(EqChain),
    Interlock,
    Transmit,
    Radio,
    License(String),
}

/// The effect one status line had on the store.
#[derive(Clone, Debug)]
pub enum EntityEvent {
    Updated { id: EntityId, diff: Vec<&'static str> },
    Removed { id: EntityId },
    /// The line's source token matched no known entity kind. Logged by
    /// the caller, never a hard error — permissive by design so an
    /// unreleased firmware's new status source doesn't break parsing
    /// of everything else.
    Unknown { source: String },
}

fn hex_key(line: &StatusLine) -> Option<u32> {
    line.positional.first().and_then(|t| u32::from_str_radix(t, 16).ok())
}

fn eq_chain_key(line: &StatusLine) -> Option<EqChain> {
    match line.positional.first().map(String::as_str) {
        Some("rxsc") => Some(EqChain::Rx),
        Some("txsc") => Some(EqChain::Tx),
        _ => None,
    }
}

/// Aggregate store over every entity kind this protocol defines.
#[derive(Default, Clone)]
pub struct StateStore {
    pub slices: Store<String, SliceSnapshot>,
    pub panadapters: Store<u32, PanadapterSnapshot>,
    pub waterfalls: Store<u32, WaterfallSnapshot>,
    pub meters: Store<u16, MeterSnapshot>,
    pub audio_streams: Store<u32, AudioStreamSnapshot>,
    pub gui_clients: Store<u32, GuiClientSnapshot>,
    pub apd: Store<(), ApdSnapshot>,
    pub equalizers: Store<EqChain, EqualizerSnapshot>,
    pub interlock: Store<(), InterlockSnapshot>,
    pub transmit: Store<(), TransmitSnapshot>,
    pub radio: Store<(), RadioSnapshot>,
    pub licenses: Store<String, LicenseSnapshot>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one already-tokenized status line onto the store, routing
    /// by `line.source`.
    pub fn apply(&mut self, line: &StatusLine) -> EntityEvent {
        match line.source.as_str() {
            "slice" => {
                let Some(id) = line.positional.first().cloned() else {
                    return EntityEvent::Unknown {
                        source: line.source.clone(),
                    };
                };
                to_event(EntityId::Slice(id.clone()), self.slices.apply(id, line))
            }
            "pan" => {
                let Some(id) = hex_key(line) else {
                    return EntityEvent::Unknown {
                        source: line.source.clone(),
                    };
                };
                to_event(EntityId::Panadapter(id), self.panadapters.apply(id, line))
            }
            "waterfall" => {
                let Some(id) = hex_key(line) else {
                    return EntityEvent::Unknown {
                        source: line.source.clone(),
                    };
                };
                to_event(EntityId::Waterfall(id), self.waterfalls.apply(id, line))
            }
            "meter" => {
                let Some(id) = line
                    .positional
                    .first()
                    .and_then(|t| t.trim_end_matches('#').parse::<u16>().ok())
                else {
                    return EntityEvent::Unknown {
                        source: line.source.clone(),
                    };
                };
                to_event(EntityId::Meter(id), self.meters.apply(id, line))
            }
            "audio_stream" => {
                let Some(id) = hex_key(line) else {
                    return EntityEvent::Unknown {
                        source: line.source.clone(),
                    };
                };
                to_event(EntityId::AudioStream(id), self.audio_streams.apply(id, line))
            }
            "client" => {
                let Some(id) = hex_key(line) else {
                    return EntityEvent::Unknown {
                        source: line.source.clone(),
                    };
                };
                to_event(EntityId::GuiClient(id), self.gui_clients.apply(id, line))
            }
            "apd" => to_event(EntityId::Apd, self.apd.apply((), line)),
            "eq" => {
                let Some(chain) = eq_chain_key(line) else {
                    return EntityEvent::Unknown {
                        source: line.source.clone(),
                    };
                };
                to_event(EntityId::Equalizer(chain), self.equalizers.apply(chain, line))
            }
            "interlock" => to_event(EntityId::Interlock, self.interlock.apply((), line)),
            "transmit" | "tx" => to_event(EntityId::Transmit, self.transmit.apply((), line)),
            "radio" => to_event(EntityId::Radio, self.radio.apply((), line)),
            "license" => {
                let Some(feature) = line.positional.first().cloned() else {
                    return EntityEvent::Unknown {
                        source: line.source.clone(),
                    };
                };
                to_event(EntityId::License(feature.clone()), self.licenses.apply(feature, line))
            }
            other => {
                tracing::debug!(source = other, "unrecognized status source");
                EntityEvent::Unknown {
                    source: other.to_string(),
                }
            }
        }
    }

    /// Apply a decoded VITA-49 meter sample to its metadata entry, if
    /// the radio has already announced that meter's metadata.
    pub fn apply_meter_sample(&mut self, id: u16, raw: i16) {
        match self.meters.get_mut(&id) {
            Some(meter) => meter.apply_sample(raw),
            None => tracing::debug!(meter_id = id, "sample for unknown meter"),
        }
    }
}

fn to_event<S>(id: EntityId, change: Change<S>) -> EntityEvent {
    match change {
        Change::Updated { diff, .. } => EntityEvent::Updated { id, diff },
        Change::Removed => EntityEvent::Removed { id },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flex_protocol::tokenize;

    #[test]
    fn slice_line_updates_keyed_store() {
        let mut store = StateStore::new();
        let event = store.apply(&tokenize("slice 0 RF_frequency=14.075000 mode=USB"));
        assert!(matches!(event, EntityEvent::Updated { id: EntityId::Slice(ref s), .. } if s == "0"));
        assert_eq!(store.slices.get(&"0".to_string()).unwrap().mode, Mode::Usb);
    }

    #[test]
    fn meter_sample_scales_against_announced_metadata() {
        let mut store = StateStore::new();
        store.apply(&tokenize("meter 1# nam=PA_VOLT src=TX unit=VOLTS low=0 hi=16"));
        store.apply_meter_sample(1, 3328);
        assert_eq!(store.meters.get(&1).unwrap().value, Some(13.0));
    }

    #[test]
    fn unknown_source_is_reported_not_panicked() {
        let mut store = StateStore::new();
        let event = store.apply(&tokenize("some_future_source foo=bar"));
        assert!(matches!(event, EntityEvent::Unknown { .. }));
    }

    #[test]
    fn slice_removal_drops_entry() {
        let mut store = StateStore::new();
        store.apply(&tokenize("slice 0 RF_frequency=14.075000"));
        let event = store.apply(&tokenize("slice 0 removed"));
        assert!(matches!(event, EntityEvent::Removed { id: EntityId::Slice(ref s) } if s == "0"));
        assert!(store.slices.get(&"0".to_string()).is_none());
    }

    #[test]
    fn interlock_singleton_tracked_under_unit_key() {
        let mut store = StateStore::new();
        store.apply(&tokenize("interlock state=READY"));
        assert_eq!(store.interlock.get(&()).unwrap().state, InterlockState::Ready);
    }
}
