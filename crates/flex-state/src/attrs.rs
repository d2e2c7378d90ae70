//! Clamping and rounding helpers layered on `flex_protocol`'s permissive
//! numeric parsers, used by the per-entity parsers in `parsers/`.

use flex_protocol::{parse_float_safe, parse_integer_hex, parse_truthy, StatusLine};

/// Parse an attribute as a permissive float, logging at debug level if
/// the key is present but unparsable (never an error: the line is still
/// otherwise valid).
pub fn float(line: &StatusLine, source: &'static str, key: &str) -> Option<f64> {
    let raw = line.attr(key)?;
    match parse_float_safe(raw) {
        Some(v) => Some(v),
        None => {
            tracing::debug!(source, key, raw, "unparsable float attribute");
            None
        }
    }
}

/// Parse an attribute as a permissive hex-or-decimal integer.
pub fn integer(line: &StatusLine, source: &'static str, key: &str) -> Option<i64> {
    let raw = line.attr(key)?;
    match parse_integer_hex(raw) {
        Some(v) => Some(v),
        None => {
            tracing::debug!(source, key, raw, "unparsable integer attribute");
            None
        }
    }
}

/// Parse an attribute as a truthy boolean.
pub fn truthy(line: &StatusLine, source: &'static str, key: &str) -> Option<bool> {
    let raw = line.attr(key)?;
    match parse_truthy(raw) {
        Some(v) => Some(v),
        None => {
            tracing::debug!(source, key, raw, "unparsable boolean attribute");
            None
        }
    }
}

/// Parse an attribute as a plain string, unescaping nothing (the wire
/// grammar's own unescaping, if any, happens in `flex-protocol`).
pub fn string(line: &StatusLine, key: &str) -> Option<String> {
    line.attr(key).map(str::to_string)
}

/// Parse a comma-separated list of integers (e.g. a slice's `step_list`).
pub fn integer_csv(line: &StatusLine, key: &str) -> Option<Vec<i64>> {
    let raw = line.attr(key)?;
    Some(
        raw.split(',')
            .filter_map(|s| s.trim().parse::<i64>().ok())
            .collect(),
    )
}

/// Clamp a signed value into `[lo, hi]`, logging if it had to move.
pub fn clamp_i32(source: &'static str, field: &'static str, value: i32, lo: i32, hi: i32) -> i32 {
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        tracing::warn!(source, field, value, clamped, "clamped out-of-range value");
    }
    clamped
}

/// Clamp a value into `[0, 100]`, the universal range for this
/// protocol's percentage-style attributes (audio/lineout levels, pan).
pub fn clamp_percent(source: &'static str, field: &'static str, value: i32) -> u8 {
    clamp_i32(source, field, value, 0, 100) as u8
}
