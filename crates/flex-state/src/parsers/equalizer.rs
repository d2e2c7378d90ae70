//! Equalizer entity: one chain's (tx/rx) graphic EQ mode and per-band
//! levels.

use std::collections::BTreeMap;

use flex_protocol::StatusLine;

use crate::attrs::truthy;
use crate::snapshot::EntitySnapshot;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct EqualizerSnapshot {
    pub enabled: bool,
    /// Band label (e.g. `"63Hz"`) to level in `[-10, 10]` dB.
    pub bands: BTreeMap<String, i8>,
}

const SOURCE: &str = "eq";

impl EntitySnapshot for EqualizerSnapshot {
    const SOURCE: &'static str = SOURCE;

    fn apply(previous: Option<&Self>, line: &StatusLine) -> (Self, Vec<&'static str>) {
        let mut next = previous.cloned().unwrap_or_default();
        let mut diff = Vec::new();

        if let Some(v) = truthy(line, SOURCE, "mode") {
            if next.enabled != v {
                next.enabled = v;
                diff.push("mode");
            }
        }
        for (key, value) in &line.attrs {
            if key == "mode" {
                continue;
            }
            if let Ok(level) = value.trim().parse::<i8>() {
                let clamped = level.clamp(-10, 10);
                if next.bands.get(key) != Some(&clamped) {
                    next.bands.insert(key.clone(), clamped);
                    diff.push("bands");
                }
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
    fn band_levels_are_clamped_and_tracked() {
        let (snap, diff) = EqualizerSnapshot::apply(None, &tokenize("eq rxsc mode=1 63Hz=12 8000Hz=-12"));
        assert!(snap.enabled);
        assert_eq!(snap.bands.get("63Hz"), Some(&10));
        assert_eq!(snap.bands.get("8000Hz"), Some(&-10));
        assert!(diff.contains(&"bands"));
    }
}
