//! Status-line tokenizer: splits a status broadcast's payload into its
//! source, positional tokens, and `key=value` attributes.

/// A tokenized status line payload: `<source> <identifier?> <positional…>
/// <key=value…>`.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct StatusLine {
    /// The first token: which entity kind this status describes
    /// (`slice`, `radio`, `panadapter`, `license`, ...).
    pub source: String,
    /// Every whitespace-separated token after `source` that is not a
    /// `key=value` pair, in wire order (typically an id followed by
    /// context-dispatch tokens like `gps` or `interlock`).
    pub positional: Vec<String>,
    /// Every `key=value` token, in wire order.
    pub attrs: Vec<(String, String)>,
}

impl StatusLine {
    /// Look up an attribute's raw string value by key.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether this status line signals entity removal: a bare `removed`
    /// positional token, or a `removed` attribute.
    pub fn is_removed(&self) -> bool {
        self.positional.iter().any(|t| t == "removed") || self.attr("removed").is_some()
    }
}

/// Tokenize a status payload (the part of an `S<handle>|...` line after
/// the handle) into source, positional tokens, and attributes.
pub fn tokenize(payload: &str) -> StatusLine {
    let mut tokens = payload.split_whitespace();
    let source = tokens.next().unwrap_or("").to_string();
    let mut positional = Vec::new();
    let mut attrs = Vec::new();
    for tok in tokens {
        match tok.split_once('=') {
            Some((k, v)) => attrs.push((k.to_string(), v.to_string())),
            None => positional.push(tok.to_string()),
        }
    }
    StatusLine {
        source,
        positional,
        attrs,
    }
}

/// Parse a value permissively as a float, the way the radio's own
/// numeric fields are parsed: trims whitespace, accepts a leading sign.
pub fn parse_float_safe(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

/// Parse a value permissively as a hex or decimal integer. A `0x`/`0X`
/// prefix selects hex; otherwise decimal.
pub fn parse_integer_hex(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        raw.parse::<i64>().ok()
    }
}

/// Parse a value as a truthy boolean: `1`, `true`, `on` (case-insensitive)
/// are true; `0`, `false`, `off` are false; anything else is unparsable.
pub fn parse_truthy(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_source_positional_and_attrs() {
        let line = tokenize("slice 0 RF_frequency=14.075000 in_use=1");
        assert_eq!(line.source, "slice");
        assert_eq!(line.positional, vec!["0".to_string()]);
        assert_eq!(line.attr("RF_frequency"), Some("14.075000"));
        assert_eq!(line.attr("in_use"), Some("1"));
    }

    #[test]
    fn detects_removed_positional_token() {
        let line = tokenize("slice 0 removed");
        assert!(line.is_removed());
    }

    #[test]
    fn detects_removed_attribute() {
        let line = tokenize("slice 0 removed=1");
        assert!(line.is_removed());
    }

    #[test]
    fn context_sensitive_radio_source_keeps_sub_entity_tokens_positional() {
        let line = tokenize("radio gps lat=12.34 lon=-98.7");
        assert_eq!(line.source, "radio");
        assert_eq!(line.positional, vec!["gps".to_string()]);
    }

    #[test]
    fn truthy_values() {
        assert_eq!(parse_truthy("1"), Some(true));
        assert_eq!(parse_truthy("ON"), Some(true));
        assert_eq!(parse_truthy("off"), Some(false));
        assert_eq!(parse_truthy("maybe"), None);
    }

    #[test]
    fn integer_hex_and_decimal() {
        assert_eq!(parse_integer_hex("0x1F"), Some(31));
        assert_eq!(parse_integer_hex("31"), Some(31));
        assert_eq!(parse_integer_hex("-5"), Some(-5));
    }
}
