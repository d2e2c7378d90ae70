//! License entity: per-feature entitlement records, arriving from a
//! distinct status source and kept in their own store (not nested
//! under [`crate::parsers::radio::RadioSnapshot`]) since a radio's
//! license set changes independently of its main attribute set.

use flex_protocol::StatusLine;

use crate::attrs::truthy;
use crate::snapshot::EntitySnapshot;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct LicenseSnapshot {
    pub feature: String,
    pub active: bool,
    pub trial_available: bool,
    pub trial_days_remaining: i32,
}

const SOURCE: &str = "license";

impl EntitySnapshot for LicenseSnapshot {
    const SOURCE: &'static str = SOURCE;

    fn apply(previous: Option<&Self>, line: &StatusLine) -> (Self, Vec<&'static str>) {
        let mut next = previous.cloned().unwrap_or_default();
        let mut diff = Vec::new();

        if let Some(feature) = line.positional.first() {
            if &next.feature != feature {
                next.feature = feature.clone();
                diff.push("feature");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "active") {
            if next.active != v {
                next.active = v;
                diff.push("active");
            }
        }
        if let Some(v) = truthy(line, SOURCE, "TrialIsAvailable") {
            if next.trial_available != v {
                next.trial_available = v;
                diff.push("trial_available");
            }
        }
        if let Some(raw) = line.attr("TrialDaysRemaining") {
            if let Some(v) = flex_protocol::parse_integer_hex(raw) {
                if next.trial_days_remaining != v as i32 {
                    next.trial_days_remaining = v as i32;
                    diff.push("trial_days_remaining");
                }
            }
        }

        (next, diff)
    }
}
