//! Meter entity: a named telemetry channel whose metadata arrives over
//! the control channel but whose live values arrive as raw `i16`
//! samples in a VITA-49 meter payload (`flex_vita::payload::meter`).

use flex_protocol::StatusLine;

use crate::attrs::{float, integer, string};
use crate::snapshot::EntitySnapshot;

/// The physical unit a meter's raw sample is scaled into, per the
/// control protocol's fixed per-unit scale factors.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MeterUnit {
    Db,
    Dbm,
    DbFs,
    Swr,
    Volts,
    Amps,
    DegC,
    DegF,
    Rpm,
    Generic,
}

impl MeterUnit {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "db" => MeterUnit::Db,
            "dbm" => MeterUnit::Dbm,
            "dbfs" => MeterUnit::DbFs,
            "swr" => MeterUnit::Swr,
            "volts" => MeterUnit::Volts,
            "amps" => MeterUnit::Amps,
            "degc" => MeterUnit::DegC,
            "degf" => MeterUnit::DegF,
            "rpm" => MeterUnit::Rpm,
            _ => MeterUnit::Generic,
        }
    }

    /// Divisor turning a raw `i16` sample into its physical unit, per
    /// the radio's fixed per-unit scaling.
    pub fn scale_factor(self) -> f64 {
        match self {
            MeterUnit::Db | MeterUnit::Dbm | MeterUnit::DbFs | MeterUnit::Swr => 128.0,
            MeterUnit::Volts | MeterUnit::Amps => 256.0,
            MeterUnit::DegC | MeterUnit::DegF => 64.0,
            MeterUnit::Rpm | MeterUnit::Generic => 1.0,
        }
    }

    /// Scale a raw sample into its physical unit.
    pub fn scale(self, raw: i16) -> f64 {
        f64::from(raw) / self.scale_factor()
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct MeterSnapshot {
    pub id: u16,
    pub name: String,
    pub source: String,
    pub unit: MeterUnit,
    pub low: f64,
    pub high: f64,
    pub fps: u32,
    pub value: Option<f64>,
}

impl Default for MeterSnapshot {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            source: String::new(),
            unit: MeterUnit::Generic,
            low: 0.0,
            high: 0.0,
            fps: 0,
            value: None,
        }
    }
}

impl MeterSnapshot {
    /// Apply a freshly decoded VITA meter sample, scaling it into this
    /// meter's unit.
    pub fn apply_sample(&mut self, raw: i16) {
        self.value = Some(self.unit.scale(raw));
    }
}

const ENTITY_SOURCE: &str = "meter";

impl EntitySnapshot for MeterSnapshot {
    const SOURCE: &'static str = ENTITY_SOURCE;

    fn apply(previous: Option<&Self>, line: &StatusLine) -> (Self, Vec<&'static str>) {
        let mut next = previous.cloned().unwrap_or_default();
        let mut diff = Vec::new();

        if let Some(id) = line.positional.first().and_then(|t| t.trim_end_matches('#').parse::<u16>().ok()) {
            if next.id != id {
                next.id = id;
                diff.push("id");
            }
        }
        if let Some(v) = string(line, "nam") {
            if next.name != v {
                next.name = v;
                diff.push("name");
            }
        }
        if let Some(v) = string(line, "src") {
            if next.source != v {
                next.source = v;
                diff.push("source");
            }
        }
        if let Some(raw) = line.attr("unit") {
            let v = MeterUnit::parse(raw);
            if next.unit != v {
                next.unit = v;
                diff.push("unit");
            }
        }
        if let Some(v) = float(line, ENTITY_SOURCE, "low") {
            if next.low != v {
                next.low = v;
                diff.push("low");
            }
        }
        if let Some(v) = float(line, ENTITY_SOURCE, "hi") {
            if next.high != v {
                next.high = v;
                diff.push("high");
            }
        }
        if let Some(v) = integer(line, ENTITY_SOURCE, "fps") {
            if next.fps != v as u32 {
                next.fps = v as u32;
                diff.push("fps");
            }
        }

        (next, diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dbm_sample_scales_by_128() {
        let mut meter = MeterSnapshot {
            unit: MeterUnit::Dbm,
            ..MeterSnapshot::default()
        };
        meter.apply_sample(-12800);
        assert_eq!(meter.value, Some(-100.0));
    }

    #[test]
    fn volts_sample_scales_by_256() {
        let mut meter = MeterSnapshot {
            unit: MeterUnit::Volts,
            ..MeterSnapshot::default()
        };
        meter.apply_sample(3328);
        assert_eq!(meter.value, Some(13.0));
    }

    #[test]
    fn metadata_line_sets_name_and_unit() {
        let line = flex_protocol::tokenize("meter 1# nam=PA_VOLT src=TX unit=VOLTS low=0 hi=16");
        let (snap, diff) = MeterSnapshot::apply(None, &line);
        assert_eq!(snap.id, 1);
        assert_eq!(snap.name, "PA_VOLT");
        assert_eq!(snap.unit, MeterUnit::Volts);
        assert!(diff.contains(&"unit"));
    }
}
