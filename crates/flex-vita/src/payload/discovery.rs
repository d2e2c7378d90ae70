//! Discovery payload: a space-separated `key=value` token string.

use crate::error::{VitaError, VitaResult};

/// Decode a discovery payload into its key/value pairs, in wire order.
///
/// The payload is UTF-8, tokens separated by ASCII spaces, and space-padded
/// to a 32-bit boundary; trailing padding is trimmed before tokenizing.
/// A token with no `=` is skipped. This mirrors the permissive tokenizer
/// `flex-state` uses for status lines, since discovery beacons and status
/// broadcasts share the same `key=value` grammar.
pub fn decode(payload: &[u8]) -> VitaResult<Vec<(String, String)>> {
    let text = std::str::from_utf8(payload).map_err(|e| VitaError::MalformedPayload {
        class: "discovery",
        reason: e.to_string(),
    })?;
    let mut pairs = Vec::new();
    for token in text.trim_end_matches(['\0', ' ']).split(' ') {
        if token.is_empty() {
            continue;
        }
        if let Some((key, value)) = token.split_once('=') {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    Ok(pairs)
}

/// Encode key/value pairs into a space-separated, 32-bit-padded payload.
pub fn encode(pairs: &[(String, String)]) -> Vec<u8> {
    let joined = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ");
    let mut buf = joined.into_bytes();
    while buf.len() % 4 != 0 {
        buf.push(b' ');
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let pairs = vec![
            ("serial".to_string(), "1234-5678".to_string()),
            ("model".to_string(), "FLEX-6600".to_string()),
        ];
        let bytes = encode(&pairs);
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(decode(&bytes).unwrap(), pairs);
    }

    #[test]
    fn skips_tokens_without_equals() {
        let bytes = b"serial=1234 garbage model=FLEX-6600".to_vec();
        let pairs = decode(&bytes).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("serial".to_string(), "1234".to_string()),
                ("model".to_string(), "FLEX-6600".to_string()),
            ]
        );
    }

    #[test]
    fn trims_space_padding() {
        let mut bytes = b"serial=1234".to_vec();
        bytes.push(b' ');
        bytes.push(b' ');
        bytes.push(b' ');
        let pairs = decode(&bytes).unwrap();
        assert_eq!(pairs, vec![("serial".to_string(), "1234".to_string())]);
    }
}
